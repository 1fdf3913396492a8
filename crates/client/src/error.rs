use thiserror::Error;

use eligo_core::DomainError;

use crate::transport::TransportError;

/// Authentication/authorization failures reported by the service.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// 401: credential missing, expired or rejected. The session has been
    /// cleared by the time the caller sees this.
    #[error("not authenticated")]
    Unauthenticated,

    /// 403: credential valid, action not allowed for its role.
    #[error("forbidden")]
    Forbidden,
}

impl AuthError {
    pub fn status(&self) -> u16 {
        match self {
            AuthError::Unauthenticated => 401,
            AuthError::Forbidden => 403,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Any other non-2xx status, passed through untouched.
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("invalid request: {0}")]
    Validation(#[from] DomainError),

    #[error("could not encode request body: {0}")]
    Encode(String),

    #[error("unexpected response body: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// HTTP status behind the error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Auth(e) => Some(e.status()),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ApiError::Auth(AuthError::Unauthenticated))
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, ApiError::Auth(AuthError::Forbidden))
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}
