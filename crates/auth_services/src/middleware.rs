use actix_web::{
    Error, HttpResponse, Result,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::Method,
};
use checkin_core::wire::{API_TOKEN_HEADER, ApiResponse};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{Ready, ready},
    rc::Rc,
};

use crate::token::ServerSecret;

/// Middleware that authenticates every request by its `X-API-Token` header.
///
/// Runs before routing to handlers, so a bad credential yields 401 even for
/// unknown actions. `OPTIONS` preflight requests are answered directly. When
/// the server has no secret configured every request gets a 500.
#[derive(Clone)]
pub struct ApiTokenGuard {
    secret: Option<ServerSecret>,
}

impl ApiTokenGuard {
    /// Creates the guard. `None` means the server is misconfigured.
    pub fn new(secret: Option<ServerSecret>) -> Self {
        Self { secret }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiTokenGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ApiTokenGuardService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiTokenGuardService {
            service: Rc::new(service),
            secret: self.secret.clone(),
        }))
    }
}

/// Service that implements the token check
pub struct ApiTokenGuardService<S> {
    service: Rc<S>,
    secret: Option<ServerSecret>,
}

impl<S, B> Service<ServiceRequest> for ApiTokenGuardService<S>
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
        let service = self.service.clone();
        let secret = self.secret.clone();

        Box::pin(async move {
            if req.method() == Method::OPTIONS {
                let response = HttpResponse::Ok().finish();
                return Ok(req.into_response(response).map_into_right_body());
            }

            let secret = match secret {
                Some(secret) => secret,
                None => {
                    log::error!("SECURITY ALERT: no API token configured, refusing request");
                    let response = HttpResponse::InternalServerError()
                        .json(ApiResponse::error("API not configured correctly."));
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            let presented = req
                .headers()
                .get(API_TOKEN_HEADER)
                .and_then(|h| h.to_str().ok())
                .unwrap_or("");

            if !secret.verify(presented) {
                log::warn!(
                    "🔒 Unauthorized request to {} from {}",
                    req.path(),
                    req.connection_info()
                        .realip_remote_addr()
                        .unwrap_or("unknown")
                );
                let response = HttpResponse::Unauthorized().json(ApiResponse::error(
                    "Unauthorized: Invalid or missing API token.",
                ));
                return Ok(req.into_response(response).map_into_right_body());
            }

            // Continue with the request
            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}
