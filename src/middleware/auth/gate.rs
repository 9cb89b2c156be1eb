//! AuthGate を axum middleware として掛けるためのアダプタ
//!
//! - `TxContext` は request extensions から取り出し、gate には引数で明示的に渡す
//! - gate の失敗 (`AuthError`) は `AppError` に変換してレスポンスにする
//! - `TxContext` が無い場合は axum の `Extension` rejection (500) になる。
//!   `middleware::http::apply` が外側に掛かっていない構成ミス

use axum::{
    Extension, Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::context::TxContext;
use crate::error::AppError;
use crate::state::AppState;

/// Gate every route of `router`.
///
/// `route_layer` so that unmatched paths still 404 instead of 401, and so
/// that `MatchedPath` based layers applied afterwards run first.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(state, gate_middleware))
}

async fn gate_middleware(
    State(state): State<AppState>,
    Extension(tx): Extension<TxContext>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    state
        .gate
        .filter(&tx, req, |req| next.run(req))
        .await
        .map_err(AppError::from)
}
