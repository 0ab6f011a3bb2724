use actix_web::http::header::HeaderValue;

use super::{AuthError, CredentialService, Identity};
use crate::models::Role;

const BEARER: &str = "Bearer ";

/// Resolve the `Authorization` header to the caller's identity. The role is
/// the one embedded at login; the store is not consulted.
pub fn authenticate(
    header: Option<&HeaderValue>,
    credentials: &CredentialService,
) -> Result<Identity, AuthError> {
    let header = header.ok_or(AuthError::MissingHeader)?;
    let value = header.to_str().map_err(|_| AuthError::MalformedHeader)?;
    let token = value.strip_prefix(BEARER).ok_or(AuthError::InvalidScheme)?;

    credentials.verify_token(token.trim())?.try_into()
}

pub fn authorize(identity: &Identity, allowed: &[Role]) -> Result<(), AuthError> {
    if allowed.contains(&identity.role) {
        Ok(())
    } else {
        Err(AuthError::Forbidden(identity.role))
    }
}
