//! Per-request `TxContext` creation.
//!
//! Must sit inside `SetRequestIdLayer` so the request id is already present.
//! The id is reused as the transaction id; if it is missing or unreadable a
//! fresh one is generated so downstream code can rely on `TxContext` existing.

use axum::{body::Body, http::Request, middleware::Next, response::Response};

use crate::context::TxContext;

use super::http::REQUEST_ID_HEADER;

pub async fn attach(mut req: Request<Body>, next: Next) -> Response {
    let tx = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(TxContext::new)
        .unwrap_or_else(TxContext::generate);

    req.extensions_mut().insert(tx);
    next.run(req).await
}
