use std::fmt;

use axum::http::Method;

/// What the request is about to touch: method + matched route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDetail {
    pub method: Method,
    pub route: String,
}

impl ResourceDetail {
    pub fn new(method: Method, route: impl Into<String>) -> Self {
        Self {
            method,
            route: route.into(),
        }
    }
}

impl fmt::Display for ResourceDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.route)
    }
}
