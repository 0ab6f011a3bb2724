use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use super::{RecordStore, StoreError};
use crate::models::{Order, Product, Role, User};

#[derive(Default)]
struct Tables {
    counters: HashMap<String, i64>,
    users: BTreeMap<i64, User>,
    products: BTreeMap<i64, Product>,
    orders: BTreeMap<i64, Order>,
}

/// Process-local store. Rows are keyed by id so iteration is in id order.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn next_id(&self, sequence: &str) -> Result<i64, StoreError> {
        let mut tables = self.lock()?;
        let seq = tables.counters.entry(sequence.to_string()).or_insert(0);
        *seq += 1;
        Ok(*seq)
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate {
                field: "email",
                value: user.email.clone(),
            });
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_seller_by_pincode(&self, pincode: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|u| u.user_type == Role::Seller && u.pincode == pincode)
            .cloned())
    }

    async fn replace_user(&self, user: &User) -> Result<bool, StoreError> {
        let mut tables = self.lock()?;
        if tables
            .users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(StoreError::Duplicate {
                field: "email",
                value: user.email.clone(),
            });
        }
        match tables.users.get_mut(&user.id) {
            Some(row) => {
                *row = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        self.lock()?.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn find_product(&self, id: i64) -> Result<Option<Product>, StoreError> {
        Ok(self.lock()?.products.get(&id).cloned())
    }

    async fn replace_product(&self, product: &Product) -> Result<bool, StoreError> {
        match self.lock()?.products.get_mut(&product.id) {
            Some(row) => {
                *row = product.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_product(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.lock()?.products.remove(&id).is_some())
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.lock()?.products.values().cloned().collect())
    }

    async fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        self.lock()?.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn find_seller_order(
        &self,
        order_id: i64,
        seller_id: i64,
    ) -> Result<Option<Order>, StoreError> {
        Ok(self
            .lock()?
            .orders
            .get(&order_id)
            .filter(|o| o.seller_id == seller_id)
            .cloned())
    }

    async fn replace_order(&self, order: &Order) -> Result<bool, StoreError> {
        match self.lock()?.orders.get_mut(&order.id) {
            Some(row) => {
                *row = order.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn orders_for_buyer(&self, buyer_id: i64) -> Result<Vec<Order>, StoreError> {
        Ok(self
            .lock()?
            .orders
            .values()
            .filter(|o| o.buyer_id == buyer_id)
            .cloned()
            .collect())
    }

    async fn orders_for_seller(&self, seller_id: i64) -> Result<Vec<Order>, StoreError> {
        Ok(self
            .lock()?
            .orders
            .values()
            .filter(|o| o.seller_id == seller_id)
            .cloned()
            .collect())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.lock()?.orders.values().cloned().collect())
    }
}
