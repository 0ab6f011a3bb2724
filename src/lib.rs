//! Multi-role e-commerce backend: buyers place orders that are matched to a
//! seller by pincode, sellers accept or reject them, admins manage the
//! catalogue and seller accounts.

use actix_web::web;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod orders;
pub mod store;
pub mod validation;

use auth::CredentialService;
use error::AppError;
use handlers::{orders as order_handlers, products, users};
use middleware::AuthMiddleware;
use models::Role;
use store::RecordStore;

/// Register shared state and every route under `/api/v1`.
pub fn configure(
    cfg: &mut web::ServiceConfig,
    store: web::Data<dyn RecordStore>,
    credentials: CredentialService,
) {
    let authenticated = || AuthMiddleware::new(credentials.clone());

    cfg.app_data(store)
        .app_data(web::Data::new(credentials.clone()))
        .app_data(
            web::JsonConfig::default()
                .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
        )
        .app_data(
            web::PathConfig::default()
                .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
        )
        .service(
            web::scope("/api/v1")
                // Public routes
                .route("/register", web::post().to(users::register))
                .route("/login", web::post().to(users::login))
                .route("/products", web::get().to(products::list_products))
                .service(
                    web::scope("/user")
                        .wrap(authenticated())
                        .route("/profile", web::get().to(users::get_profile))
                        .route("/profile", web::put().to(users::update_profile)),
                )
                .service(
                    web::scope("/orders")
                        .wrap(authenticated())
                        .route("", web::post().to(order_handlers::create_order))
                        .route("", web::get().to(order_handlers::my_orders)),
                )
                .service(
                    web::scope("/seller")
                        .wrap(authenticated().allow(&[Role::Seller]))
                        .route("/orders", web::get().to(order_handlers::seller_orders))
                        .route(
                            "/orders/{id}/respond",
                            web::post().to(order_handlers::respond_to_order),
                        ),
                )
                .service(
                    web::scope("/admin")
                        .wrap(authenticated().allow(&[Role::Admin]))
                        .route("/products", web::post().to(products::create_product))
                        .route("/products/{id}", web::put().to(products::update_product))
                        .route("/products/{id}", web::delete().to(products::delete_product))
                        .route("/productlist", web::get().to(products::list_products))
                        .route("/sellers", web::post().to(users::create_seller))
                        .route("/getallorders", web::get().to(order_handlers::all_orders)),
                ),
        );
}
