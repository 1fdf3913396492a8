use eligo_auth::DecodeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("credential storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    /// Another login/logout/restore is still writing to storage.
    #[error("a session change is already in progress")]
    SessionBusy,

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SessionError {
    pub fn as_decode(&self) -> Option<&DecodeError> {
        match self {
            SessionError::Decode(e) => Some(e),
            _ => None,
        }
    }
}
