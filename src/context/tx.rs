use std::fmt;

use uuid::Uuid;

/// Per-request correlation id.
///
/// Built once per request by `middleware::tx_context` and passed explicitly
/// to whoever needs to correlate logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxContext {
    tx_id: String,
}

impl TxContext {
    pub fn new(tx_id: impl Into<String>) -> Self {
        Self {
            tx_id: tx_id.into(),
        }
    }

    pub fn generate() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }
}

impl fmt::Display for TxContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxContext(tx_id={})", self.tx_id)
    }
}
