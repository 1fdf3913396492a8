//! Tracing/logging setup shared by the eligo binaries.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::{ENV_LOG_FORMAT, LogFormat};

/// Initialize process-wide logging with the format taken from the environment.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}

/// Like [`init`], with an explicit output format.
pub fn init_with(format: LogFormat) {
    tracing::init(format);
}
