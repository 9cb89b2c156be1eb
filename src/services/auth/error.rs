use thiserror::Error;

pub const REST_400002: &str = "REST_400002";
pub const REST_401001: &str = "REST_401001";

/// Header name as it appears in client-facing messages.
pub const AUTHORIZATION: &str = "Authorization";

/// Attribute key under which the upstream router attaches `ResourceDetail`.
pub const RESOURCE_DETAIL: &str = "RESOURCE_DETAIL";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Client sent no credential, or a blank one.
    #[error("Required header '{header}' is missing or blank.")]
    MissingHeader { header: &'static str },

    /// Credential present but no scheme recognized it. Deliberately says nothing about why.
    #[error("Unauthorized access.")]
    Unauthorized,

    /// Upstream collaborator did not attach a request attribute the gate relies on.
    #[error("missing request attribute: {name}")]
    MissingAttribute { name: &'static str },
}

impl AuthError {
    pub fn missing_authorization() -> Self {
        Self::MissingHeader {
            header: AUTHORIZATION,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader { .. } => REST_400002,
            AuthError::Unauthorized => REST_401001,
            AuthError::MissingAttribute { .. } => "INTERNAL_SERVER_ERROR",
        }
    }
}
