use async_trait::async_trait;
use futures::stream::StreamExt;
use mongodb::bson::{doc, Document};
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::{
    ClientOptions, FindOneAndUpdateOptions, FindOneOptions, FindOptions, IndexOptions,
    ReturnDocument,
};
use mongodb::{Client, Collection, Cursor, Database, IndexModel};
use serde::de::DeserializeOwned;

use crate::models::{Counter, Order, Product, Role, User};
use crate::store::{RecordStore, StoreError};

pub async fn connect(database_url: &str, database_name: &str) -> Result<MongoStore, StoreError> {
    let client_options = ClientOptions::parse(database_url).await?;
    let client = Client::with_options(client_options)?;

    let store = MongoStore::new(&client.database(database_name));
    store.ensure_indexes().await?;
    log::info!("connected to MongoDB database {}", database_name);
    Ok(store)
}

pub struct MongoStore {
    users: Collection<User>,
    products: Collection<Product>,
    orders: Collection<Order>,
    counters: Collection<Counter>,
}

impl MongoStore {
    pub fn new(db: &Database) -> Self {
        MongoStore {
            users: db.collection("users"),
            products: db.collection("products"),
            orders: db.collection("orders"),
            counters: db.collection("counters"),
        }
    }

    async fn ensure_indexes(&self) -> Result<(), StoreError> {
        self.users.create_index(unique(doc! {"id": 1}), None).await?;
        self.users
            .create_index(unique(doc! {"email": 1}), None)
            .await?;
        self.products
            .create_index(unique(doc! {"id": 1}), None)
            .await?;
        self.orders.create_index(unique(doc! {"id": 1}), None).await?;
        self.orders
            .create_index(IndexModel::builder().keys(doc! {"seller_id": 1}).build(), None)
            .await?;
        self.orders
            .create_index(IndexModel::builder().keys(doc! {"user_id": 1}).build(), None)
            .await?;
        Ok(())
    }
}

const DUPLICATE_KEY: i32 = 11000;

fn id_filter(id: i64) -> Document {
    doc! {"id": id}
}

fn email_filter(email: &str) -> Document {
    doc! {"email": email}
}

fn seller_at_pincode(pincode: &str) -> Document {
    doc! {"user_type": Role::Seller.as_str(), "pincode": pincode}
}

fn seller_order(order_id: i64, seller_id: i64) -> Document {
    doc! {"id": order_id, "seller_id": seller_id}
}

fn buyer_orders(buyer_id: i64) -> Document {
    doc! {"user_id": buyer_id}
}

fn seller_orders(seller_id: i64) -> Document {
    doc! {"seller_id": seller_id}
}

/// A unique index on `users` rejected the write; only email is unique
/// besides the allocated id.
fn user_write_error(e: MongoError, user: &User) -> StoreError {
    match e.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY => {
            StoreError::Duplicate {
                field: "email",
                value: user.email.clone(),
            }
        }
        _ => StoreError::Database(e),
    }
}

fn unique(keys: Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

fn by_id() -> FindOptions {
    FindOptions::builder().sort(doc! {"id": 1}).build()
}

async fn collect<T>(mut cursor: Cursor<T>) -> Result<Vec<T>, StoreError>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let mut rows = vec![];
    while let Some(result) = cursor.next().await {
        rows.push(result?);
    }
    Ok(rows)
}

#[async_trait]
impl RecordStore for MongoStore {
    async fn next_id(&self, sequence: &str) -> Result<i64, StoreError> {
        let filter = doc! {"_id": sequence};
        let update = doc! {"$inc": {"seq": 1_i64}};

        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        match self.counters.find_one_and_update(filter, update, options).await? {
            Some(counter) => Ok(counter.seq),
            None => Err(StoreError::Sequence(sequence.to_string())),
        }
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        self.users
            .insert_one(user, None)
            .await
            .map_err(|e| user_write_error(e, user))?;
        Ok(())
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.users.find_one(id_filter(id), None).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.find_one(email_filter(email), None).await?)
    }

    async fn find_seller_by_pincode(&self, pincode: &str) -> Result<Option<User>, StoreError> {
        let options = FindOneOptions::builder().sort(doc! {"id": 1}).build();
        Ok(self.users.find_one(seller_at_pincode(pincode), options).await?)
    }

    async fn replace_user(&self, user: &User) -> Result<bool, StoreError> {
        let result = self
            .users
            .replace_one(id_filter(user.id), user, None)
            .await
            .map_err(|e| user_write_error(e, user))?;
        Ok(result.matched_count == 1)
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        self.products.insert_one(product, None).await?;
        Ok(())
    }

    async fn find_product(&self, id: i64) -> Result<Option<Product>, StoreError> {
        Ok(self.products.find_one(id_filter(id), None).await?)
    }

    async fn replace_product(&self, product: &Product) -> Result<bool, StoreError> {
        let result = self
            .products
            .replace_one(id_filter(product.id), product, None)
            .await?;
        Ok(result.matched_count == 1)
    }

    async fn delete_product(&self, id: i64) -> Result<bool, StoreError> {
        let result = self.products.delete_one(id_filter(id), None).await?;
        Ok(result.deleted_count == 1)
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        collect(self.products.find(doc! {}, by_id()).await?).await
    }

    async fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        self.orders.insert_one(order, None).await?;
        Ok(())
    }

    async fn find_seller_order(
        &self,
        order_id: i64,
        seller_id: i64,
    ) -> Result<Option<Order>, StoreError> {
        let filter = seller_order(order_id, seller_id);
        Ok(self.orders.find_one(filter, None).await?)
    }

    async fn replace_order(&self, order: &Order) -> Result<bool, StoreError> {
        let result = self
            .orders
            .replace_one(id_filter(order.id), order, None)
            .await?;
        Ok(result.matched_count == 1)
    }

    async fn orders_for_buyer(&self, buyer_id: i64) -> Result<Vec<Order>, StoreError> {
        collect(self.orders.find(buyer_orders(buyer_id), by_id()).await?).await
    }

    async fn orders_for_seller(&self, seller_id: i64) -> Result<Vec<Order>, StoreError> {
        collect(self.orders.find(seller_orders(seller_id), by_id()).await?).await
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        collect(self.orders.find(doc! {}, by_id()).await?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mongodb::bson::{to_document, Bson};

    use crate::models::OrderStatus;

    fn seller() -> User {
        let now = Utc::now();
        User {
            id: 3,
            name: "Asha".into(),
            email: "asha@example.com".into(),
            password: "digest".into(),
            phone: "9999999999".into(),
            address: "MG Road".into(),
            pincode: "560001".into(),
            user_type: Role::Seller,
            created_at: now,
            updated_at: now,
        }
    }

    fn order() -> Order {
        let now = Utc::now();
        Order {
            id: 11,
            buyer_id: 5,
            seller_id: 3,
            product_id: 1,
            product_name: "Pen".into(),
            quantity: 2,
            price: 10.0,
            total_amount: 20.0,
            pincode: "560001".into(),
            status: OrderStatus::Pending,
            reject_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Every key of `filter` holds the same value in the stored document.
    fn assert_matches(filter: &Document, stored: &Document) {
        for (key, value) in filter {
            assert_eq!(stored.get(key), Some(value), "field {key}");
        }
    }

    #[test]
    fn user_filters_match_stored_user() {
        let stored = to_document(&seller()).unwrap();

        assert_matches(&id_filter(3), &stored);
        assert_matches(&email_filter("asha@example.com"), &stored);
        assert_matches(&seller_at_pincode("560001"), &stored);
        assert_eq!(stored.get("user_type"), Some(&Bson::String("seller".into())));
    }

    #[test]
    fn order_filters_match_stored_order() {
        let stored = to_document(&order()).unwrap();

        assert_matches(&seller_order(11, 3), &stored);
        assert_matches(&buyer_orders(5), &stored);
        assert_matches(&seller_orders(3), &stored);
        assert!(stored.contains_key("rejectReason"));
        assert!(!stored.contains_key("buyer_id"));
    }

    #[test]
    fn filters_name_the_expected_fields() {
        assert_eq!(
            seller_at_pincode("560001"),
            doc! {"user_type": "seller", "pincode": "560001"}
        );
        assert_eq!(seller_order(11, 3), doc! {"id": 11_i64, "seller_id": 3_i64});
        assert_eq!(buyer_orders(5), doc! {"user_id": 5_i64});
    }
}
