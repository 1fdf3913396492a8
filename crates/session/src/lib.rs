//! `eligo-session` — the client's authenticated session.
//!
//! **Responsibility:** hold at most one credential and the identity decoded
//! from it, keep durable storage in step, and tell observers when either
//! changes.
//!
//! The store is an explicit value owned by the composition root and shared by
//! `Arc`; there is no process-global session.

pub mod error;
pub mod storage;
pub mod store;

pub use error::{SessionError, StorageError};
pub use storage::{CredentialStorage, FileStorage, MemoryStorage};
pub use store::{ActiveSession, SessionStore, SessionWatch};
