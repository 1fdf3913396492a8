//! `eligo-auth` — credential decoding and role-based view resolution.
//!
//! This crate is intentionally decoupled from HTTP, storage and session state:
//! everything here is a pure function of its input.

pub mod claims;
pub mod credential;
pub mod identity;
pub mod roles;
pub mod router;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use claims::{DecodeError, decode, decode_credential};
pub use credential::Credential;
pub use identity::Identity;
pub use roles::Role;
pub use router::{AuthzError, Capability, ViewSelector, authorize, resolve_view};
