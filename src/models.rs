use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Seller,
    Buyer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Seller, Role::Buyer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Seller => "seller",
            Role::Buyer => "buyer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String, // argon2 encoded digest, never the plaintext
    pub phone: String,
    pub address: String,
    pub pincode: String,
    pub user_type: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user as returned by the API: everything except the password digest.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub pincode: String,
    pub user_type: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        PublicUser {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            address: user.address.clone(),
            pincode: user.pincode.clone(),
            user_type: user.user_type,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Account fields shared by self-registration and admin-created sellers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub address: String,
    pub pincode: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    #[serde(flatten)]
    pub account: AccountInput,
    pub user_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user_type: Role,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub pincode: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Counter {
    pub _id: String,
    pub seq: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i64,
    pub admin_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i64,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    #[serde(rename = "user_id")]
    pub buyer_id: i64,
    pub seller_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    /// Unit price as submitted with the order, not the live product price.
    pub price: f64,
    pub total_amount: f64,
    pub pincode: String,
    pub status: OrderStatus,
    /// Set only when `status` is `Rejected`.
    #[serde(rename = "rejectReason")]
    pub reject_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OrderInput {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub price: f64,
    pub pincode: String,
}

/// A seller's answer to a pending order.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Decision {
    #[serde(rename = "Accept", default)]
    pub accept: bool,
    #[serde(rename = "RejectReason", default)]
    pub reject_reason: Option<String>,
}
