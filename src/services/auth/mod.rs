/*
 * Responsibility
 * - 認証ゲートの公開インターフェース (re-export)
 */
pub mod error;
pub mod gate;
pub mod scheme;

pub use error::AuthError;
pub use gate::AuthGate;
pub use scheme::{OTT_PREFIX, PRIMARY_PREFIX};
