//! Typed surfaces per view, all routed through [`crate::ApiGateway`].

pub mod admin;
pub mod auth;
pub mod payer;
pub mod provider;

pub use admin::{AdminApi, AssignableRole, CreateOrganization, CreateUser, OrganizationType};
pub use auth::{AuthApi, LoginError, LoginRequest};
pub use payer::{CoverageRule, CoverageTerms, CreatePlan, EnrollMember, PayerApi, covered_services};
pub use provider::{EligibilityCheck, EligibilityResult, ProviderApi, eligibility_error_message};
