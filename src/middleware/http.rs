//! HTTP-level middleware (cross-cutting concerns).
//!
//! Responsibility:
//! - Request-Id generation + propagation (X-Request-Id)
//! - Access logging / request tracing (TraceLayer)
//! - TxContext creation from the request id
//! - Body size limits
//! - Global timeouts
//!
//! Limits come from `Config` (`HTTP_BODY_LIMIT_BYTES`, `HTTP_TIMEOUT_SECONDS`).

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::http::{StatusCode, header::HeaderName};
use axum::middleware::from_fn;
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::HttpLimits;

use super::tx_context;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Wrap `router` in the transport stack. Request ids use `x-request-id`.
pub fn apply(router: Router, limits: &HttpLimits) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    let layers = ServiceBuilder::new()
        // Make the service error `Infallible` by converting errors into responses.
        .layer(HandleErrorLayer::new(|err: BoxError| async move {
            if err.is::<tower::timeout::error::Elapsed>() {
                StatusCode::REQUEST_TIMEOUT
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }))
        // Generate a request id if missing, then propagate it to the response.
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(RequestBodyLimitLayer::new(limits.body_limit_bytes))
        .layer(TimeoutLayer::new(limits.request_timeout))
        // Access log / tracing for all requests.
        .layer(TraceLayer::new_for_http());

    // from_fn needs an infallible inner service, so it wraps the router
    // directly and sits inside everything above.
    router
        .layer(from_fn(tx_context::attach))
        .layer(layers)
}
