//! Request body rules checked before any business logic runs.

use thiserror::Error;

use crate::models::{
    AccountInput, OrderInput, ProductInput, ProductUpdate, ProfileUpdate, RegisterInput, Role,
};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error, PartialEq)]
#[error("{0}")]
pub struct ValidationError(pub String);

type Result<T = ()> = std::result::Result<T, ValidationError>;

fn required(field: &str, value: &str) -> Result {
    if value.trim().is_empty() {
        return Err(ValidationError(format!(
            "\"{field}\" is not allowed to be empty"
        )));
    }
    Ok(())
}

fn email(value: &str) -> Result {
    required("email", value)?;
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(ValidationError("\"email\" must be a valid email".into()));
    }
    Ok(())
}

fn password(value: &str) -> Result {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError(format!(
            "\"password\" length must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

fn positive(field: &str, value: f64) -> Result {
    if !(value.is_finite() && value > 0.0) {
        return Err(ValidationError(format!(
            "\"{field}\" must be a positive number"
        )));
    }
    Ok(())
}

fn non_negative(field: &str, value: i64) -> Result {
    if value < 0 {
        return Err(ValidationError(format!(
            "\"{field}\" must be greater than or equal to 0"
        )));
    }
    Ok(())
}

pub fn validate_account(input: &AccountInput) -> Result {
    required("name", &input.name)?;
    email(&input.email)?;
    password(&input.password)?;
    required("phone", &input.phone)?;
    required("address", &input.address)?;
    required("pincode", &input.pincode)?;
    Ok(())
}

/// Returns the requested role once the whole body is valid.
pub fn validate_registration(input: &RegisterInput) -> Result<Role> {
    validate_account(&input.account)?;
    input.user_type.parse().map_err(|_| {
        ValidationError("\"user_type\" must be one of [admin, seller, buyer]".into())
    })
}

pub fn validate_profile_update(input: &ProfileUpdate) -> Result {
    if let Some(name) = &input.name {
        required("name", name)?;
    }
    if let Some(value) = &input.email {
        email(value)?;
    }
    if let Some(value) = &input.password {
        password(value)?;
    }
    if let Some(phone) = &input.phone {
        required("phone", phone)?;
    }
    if let Some(address) = &input.address {
        required("address", address)?;
    }
    if let Some(pincode) = &input.pincode {
        required("pincode", pincode)?;
    }
    Ok(())
}

pub fn validate_product(input: &ProductInput) -> Result {
    required("name", &input.name)?;
    positive("price", input.price)?;
    non_negative("stock", input.stock)
}

pub fn validate_product_update(input: &ProductUpdate) -> Result {
    if let Some(name) = &input.name {
        required("name", name)?;
    }
    if let Some(price) = input.price {
        positive("price", price)?;
    }
    if let Some(stock) = input.stock {
        non_negative("stock", stock)?;
    }
    Ok(())
}

pub fn validate_order(input: &OrderInput) -> Result {
    required("product_name", &input.product_name)?;
    if input.quantity <= 0 {
        return Err(ValidationError(
            "\"quantity\" must be a positive number".into(),
        ));
    }
    positive("price", input.price)?;
    if !(input.price * input.quantity as f64).is_finite() {
        return Err(ValidationError(
            "\"total_amount\" must be a finite number".into(),
        ));
    }
    required("pincode", &input.pincode)
}
