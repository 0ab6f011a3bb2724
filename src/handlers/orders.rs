use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::auth::Identity;
use crate::error::AppError;
use crate::models::{Decision, OrderInput, Role};
use crate::orders;
use crate::store::RecordStore;
use crate::validation;

pub async fn create_order(
    store: web::Data<dyn RecordStore>,
    identity: Identity,
    input: web::Json<OrderInput>,
) -> Result<HttpResponse, AppError> {
    let request = input.into_inner();
    validation::validate_order(&request)?;

    let order = orders::create_order(store.get_ref(), identity.id, request).await?;
    Ok(HttpResponse::Created().json(order))
}

/// Sellers see the orders matched to them, everyone else the orders they placed.
pub async fn my_orders(
    store: web::Data<dyn RecordStore>,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    let orders = match identity.role {
        Role::Seller => store.orders_for_seller(identity.id).await?,
        Role::Buyer | Role::Admin => store.orders_for_buyer(identity.id).await?,
    };
    Ok(HttpResponse::Ok().json(orders))
}

pub async fn seller_orders(
    store: web::Data<dyn RecordStore>,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    let orders = store.orders_for_seller(identity.id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

pub async fn respond_to_order(
    store: web::Data<dyn RecordStore>,
    identity: Identity,
    order_id: web::Path<i64>,
    decision: web::Json<Decision>,
) -> Result<HttpResponse, AppError> {
    let order = orders::respond_to_order(
        store.get_ref(),
        identity.id,
        order_id.into_inner(),
        decision.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Order updated successfully",
        "order": order,
    })))
}

pub async fn all_orders(store: web::Data<dyn RecordStore>) -> Result<HttpResponse, AppError> {
    let orders = store.list_orders().await?;
    Ok(HttpResponse::Ok().json(json!({
        "count": orders.len(),
        "orders": orders,
    })))
}
