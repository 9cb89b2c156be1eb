/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health は公開、それ以外は AuthGate を通す
 */
use axum::{Router, middleware::from_fn, routing::get};

use crate::api::v1::handlers::{greetings::greetings, health::health};
use crate::middleware::{auth, resource_detail};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new().route("/greetings", get(greetings));
    let protected = auth::gate::apply(protected, state);
    // added last => runs first, so the gate sees ResourceDetail
    let protected = protected.route_layer(from_fn(resource_detail::attach));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
}
