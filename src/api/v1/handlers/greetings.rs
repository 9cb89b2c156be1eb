/*
 * Responsibility
 * - GET /greetings (認証ゲートの内側)
 * - gate を通過したリクエストだけがここに届く
 */
use axum::{Extension, Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::context::ResourceDetail;

#[derive(Debug, Serialize)]
pub struct GreetingResponse {
    pub message: &'static str,
    pub resource: String,
}

pub async fn greetings(Extension(resource): Extension<ResourceDetail>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(GreetingResponse {
            message: "hello",
            resource: resource.to_string(),
        }),
    )
}
