use actix_service::{forward_ready, Service};
use actix_web::body::EitherBody;
use actix_web::dev::{ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{Error, HttpMessage};
use futures::future::{ok, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::auth::{self, AuthError, CredentialService, Identity};
use crate::error::AppError;
use crate::models::Role;

/// Authenticates every request of the wrapped scope and, when built with
/// [`AuthMiddleware::allow`], authorizes the caller's role as well. The
/// resulting [`Identity`] is stored in the request extensions.
pub struct AuthMiddleware {
    credentials: CredentialService,
    allowed: Option<Rc<[Role]>>,
}

impl AuthMiddleware {
    pub fn new(credentials: CredentialService) -> Self {
        AuthMiddleware {
            credentials,
            allowed: None,
        }
    }

    /// Restrict the scope to callers holding one of `roles`.
    pub fn allow(mut self, roles: &[Role]) -> Self {
        self.allowed = Some(roles.into());
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();

    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
            credentials: self.credentials.clone(),
            allowed: self.allowed.clone(),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    credentials: CredentialService,
    allowed: Option<Rc<[Role]>>,
}

impl<S> AuthMiddlewareService<S> {
    fn check(&self, req: &ServiceRequest) -> Result<Identity, AuthError> {
        let identity =
            auth::authenticate(req.headers().get(header::AUTHORIZATION), &self.credentials)?;
        if let Some(allowed) = &self.allowed {
            auth::authorize(&identity, allowed)?;
        }
        Ok(identity)
    }
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let checked = self.check(&req);
        let service = self.service.clone();

        Box::pin(async move {
            match checked {
                Ok(identity) => {
                    req.extensions_mut().insert(identity);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(e) => {
                    log::warn!("rejected {} {}: {}", req.method(), req.path(), e);
                    let error = AppError::from(e);
                    Ok(req.error_response(error).map_into_right_body())
                }
            }
        })
    }
}
