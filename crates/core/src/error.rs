//! Domain error model.

use thiserror::Error;

/// Client-side validation failure.
///
/// These are raised before a request is ever built, so the backing service
/// never sees an obviously invalid payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. an inverted date range).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (empty, or not parseable).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
