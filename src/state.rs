/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - ex: gate: AuthGate
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::auth::AuthGate;

#[derive(Clone, Debug)]
pub struct AppState {
    pub gate: Arc<AuthGate>,
}

impl AppState {
    pub fn new(gate: Arc<AuthGate>) -> Self {
        Self { gate }
    }
}
