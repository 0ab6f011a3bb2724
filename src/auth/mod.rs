//! Credentials and the request authentication gate.

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, Ready};
use thiserror::Error;

use crate::error::AppError;
use crate::models::Role;

pub mod credentials;
pub mod gate;

pub use credentials::{Claims, CredentialService};
pub use gate::{authenticate, authorize};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization header missing")]
    MissingHeader,

    #[error("Invalid authorization header")]
    MalformedHeader,

    #[error("Invalid authorization scheme")]
    InvalidScheme,

    #[error("Invalid or expired token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("Invalid token subject")]
    InvalidSubject,

    #[error("Access denied for role {0}")]
    Forbidden(Role),

    #[error("Password hashing failed: {0}")]
    Hashing(#[from] argon2::Error),

    #[error("Failed to encode token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// The authenticated caller, as asserted by a verified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub role: Role,
}

impl TryFrom<Claims> for Identity {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id: i64 = claims.sub.parse().map_err(|_| AuthError::InvalidSubject)?;
        Ok(Identity {
            id,
            role: claims.user_type,
        })
    }
}

/// Available only behind [`crate::middleware::AuthMiddleware`].
impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Identity>()
                .copied()
                .ok_or_else(|| AppError::Unauthenticated("Login required".into())),
        )
    }
}
