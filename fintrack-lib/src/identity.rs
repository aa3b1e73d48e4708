use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::ErrorUnauthorized;
use actix_web::HttpMessage;
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing_actix_web::RootSpan;

/// Opaque identifier of the acting user, as resolved by the upstream
/// authentication gate. The core only ever authorizes by ownership against
/// this value.
pub type UserId = String;

/// Header the gate uses to hand the identity down. Requests reaching the
/// service without it are rejected; the core never authenticates on its own.
pub const IDENTITY_HEADER: &str = "x-user-id";

pub struct IdentityGate;

impl<S, B> Transform<S, ServiceRequest> for IdentityGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Transform = IdentityGateMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(IdentityGateMiddleware { service }))
    }
}

pub struct IdentityGateMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for IdentityGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let user_id = req
            .headers()
            .get(IDENTITY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned);

        match user_id {
            Some(user_id) => {
                if let Some(root_span) = req.extensions().get::<RootSpan>() {
                    root_span.record("user_id", user_id.as_str());
                }
                req.extensions_mut().insert::<UserId>(user_id);
                Box::pin(self.service.call(req))
            }
            None => Box::pin(ready(Err(ErrorUnauthorized("missing identity header")))),
        }
    }
}
