use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;

use crate::auth::Identity;
use crate::error::AppError;
use crate::models::{Product, ProductInput, ProductUpdate};
use crate::store::{RecordStore, PRODUCT_SEQUENCE};
use crate::validation;

fn not_found() -> AppError {
    AppError::NotFound("Product not found".into())
}

pub async fn list_products(store: web::Data<dyn RecordStore>) -> Result<HttpResponse, AppError> {
    let products = store.list_products().await?;
    Ok(HttpResponse::Ok().json(json!({
        "count": products.len(),
        "products": products,
    })))
}

pub async fn create_product(
    store: web::Data<dyn RecordStore>,
    identity: Identity,
    input: web::Json<ProductInput>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();
    validation::validate_product(&input)?;

    let now = Utc::now();
    let product = Product {
        id: store.next_id(PRODUCT_SEQUENCE).await?,
        name: input.name,
        description: input.description,
        price: input.price,
        stock: input.stock,
        admin_id: identity.id,
        created_at: now,
        updated_at: now,
    };
    store.insert_product(&product).await?;

    log::info!("admin {} created product {}", identity.id, product.id);
    Ok(HttpResponse::Created().json(product))
}

/// Any admin may edit any product; only the fields present are changed.
pub async fn update_product(
    store: web::Data<dyn RecordStore>,
    product_id: web::Path<i64>,
    input: web::Json<ProductUpdate>,
) -> Result<HttpResponse, AppError> {
    let update = input.into_inner();
    validation::validate_product_update(&update)?;

    let mut product = store
        .find_product(product_id.into_inner())
        .await?
        .ok_or_else(not_found)?;

    if let Some(name) = update.name {
        product.name = name;
    }
    if let Some(description) = update.description {
        product.description = Some(description);
    }
    if let Some(price) = update.price {
        product.price = price;
    }
    if let Some(stock) = update.stock {
        product.stock = stock;
    }
    product.updated_at = Utc::now();

    if !store.replace_product(&product).await? {
        return Err(not_found());
    }
    Ok(HttpResponse::Ok().json(product))
}

pub async fn delete_product(
    store: web::Data<dyn RecordStore>,
    product_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    if !store.delete_product(product_id.into_inner()).await? {
        return Err(not_found());
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "Product deleted successfully" })))
}
