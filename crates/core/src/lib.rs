//! `eligo-core` — shared value types for the eligibility client.
//!
//! Pure data only: no IO, no HTTP, no session state.

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::{MemberExternalId, OrganizationId, PlanCode, ServiceCode};
