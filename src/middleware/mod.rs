/*
 * Responsibility
 * - middleware の公開インターフェース (re-export)
 */
pub mod auth;
pub mod http;
pub mod resource_detail;
pub mod tx_context;
