use std::env;
use thiserror::Error;

use crate::auth::credentials::DEFAULT_TOKEN_TTL_HOURS;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is not valid: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// MongoDB connection string. Without one the in-memory store is used.
    pub database_url: Option<String>,
    pub database_name: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let jwt_secret = var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let port: u16 = match var("PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value })?,
            None => 8080,
        };

        let token_ttl_hours = match var("TOKEN_TTL_HOURS") {
            Some(value) => match value.parse::<i64>() {
                Ok(hours) if hours > 0 => hours,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "TOKEN_TTL_HOURS",
                        value,
                    })
                }
            },
            None => DEFAULT_TOKEN_TTL_HOURS,
        };

        Ok(Config {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            database_url: var("DATABASE_URL"),
            database_name: var("DATABASE_NAME").unwrap_or_else(|| "ecom_db".to_string()),
            jwt_secret,
            token_ttl_hours,
        })
    }
}
