//! Record store abstraction over users, products and orders.
//!
//! Relationships are plain foreign-key fields; every cross-entity lookup is an
//! equality filter on one of them. [`crate::db::MongoStore`] is the production
//! backend, [`MemoryStore`] serves local runs without a database and tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Order, Product, User};

mod memory;

pub use memory::MemoryStore;

pub const USER_SEQUENCE: &str = "users";
pub const PRODUCT_SEQUENCE: &str = "products";
pub const ORDER_SEQUENCE: &str = "orders";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Failed to generate sequence value for {0}")]
    Sequence(String),

    #[error("Duplicate {field}: {value}")]
    Duplicate { field: &'static str, value: String },

    #[error("Record store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Allocate the next primary key of a named sequence, starting at 1.
    async fn next_id(&self, sequence: &str) -> Result<i64, StoreError>;

    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// The seller registered at exactly `pincode`. When several match, the
    /// one with the lowest id wins.
    async fn find_seller_by_pincode(&self, pincode: &str) -> Result<Option<User>, StoreError>;

    /// Overwrite the user with the same id. Returns false if none exists.
    async fn replace_user(&self, user: &User) -> Result<bool, StoreError>;

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError>;

    async fn find_product(&self, id: i64) -> Result<Option<Product>, StoreError>;

    async fn replace_product(&self, product: &Product) -> Result<bool, StoreError>;

    async fn delete_product(&self, id: i64) -> Result<bool, StoreError>;

    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    async fn insert_order(&self, order: &Order) -> Result<(), StoreError>;

    /// An order by id, only if it was matched to `seller_id`.
    async fn find_seller_order(
        &self,
        order_id: i64,
        seller_id: i64,
    ) -> Result<Option<Order>, StoreError>;

    async fn replace_order(&self, order: &Order) -> Result<bool, StoreError>;

    async fn orders_for_buyer(&self, buyer_id: i64) -> Result<Vec<Order>, StoreError>;

    async fn orders_for_seller(&self, seller_id: i64) -> Result<Vec<Order>, StoreError>;

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;
}
