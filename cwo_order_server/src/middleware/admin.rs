//! Shared-token guard for the admin endpoints.
//!
//! The admin panel sends its token in the `x-cwo-admin-token` header; the middleware
//! compares it against the configured [`AdminToken`] registered as app data. When no token
//! is configured the guard lets everything through (development mode) - the configuration
//! loader has already logged a loud warning about that.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
};
use cwo_common::Secret;
use futures::future::LocalBoxFuture;
use log::{trace, warn};

use crate::errors::ServerError;

pub const ADMIN_TOKEN_HEADER: &str = "x-cwo-admin-token";

/// The configured admin token, registered as `web::Data<AdminToken>` on the app.
#[derive(Clone, Default)]
pub struct AdminToken(pub Option<Secret<String>>);

pub struct AdminAuthMiddlewareFactory;

impl AdminAuthMiddlewareFactory {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminAuthMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = AdminAuthMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminAuthMiddlewareService { service: Rc::new(service) }))
    }
}

pub struct AdminAuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AdminAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            trace!("🔐️ Checking admin token for request");
            let configured = req.app_data::<web::Data<AdminToken>>().and_then(|t| t.0.clone());
            let Some(expected) = configured else {
                trace!("🔐️ No admin token configured. Allowing request.");
                return service.call(req).await;
            };
            let supplied = req.headers().get(ADMIN_TOKEN_HEADER).and_then(|v| v.to_str().ok());
            match supplied {
                None => {
                    warn!("🔐️ No admin token supplied for {}. Denying access.", req.path());
                    Err(ServerError::Unauthorized.into())
                },
                Some(token) if token == expected.reveal() => {
                    trace!("🔐️ Admin token check ✅️");
                    service.call(req).await
                },
                Some(_) => {
                    warn!("🔐️ Invalid admin token supplied for {}. Denying access.", req.path());
                    Err(ServerError::InsufficientPermissions("Invalid admin token".to_string()).into())
                },
            }
        })
    }
}
