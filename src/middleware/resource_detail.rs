//! Attaches `ResourceDetail` (method + matched route) to routed requests.
//!
//! `MatchedPath` only exists once routing has happened, so this must be
//! applied with `route_layer`, never `layer`.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::context::ResourceDetail;

pub async fn attach(matched: MatchedPath, mut req: Request<Body>, next: Next) -> Response {
    let detail = ResourceDetail::new(req.method().clone(), matched.as_str());
    req.extensions_mut().insert(detail);
    next.run(req).await
}
