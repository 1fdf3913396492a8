use serde::Serialize;
use thiserror::Error;

use crate::{Identity, Role};

/// UI surface selected for the current session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewSelector {
    /// No session: render login.
    Unauthenticated,
    AdminView,
    PayerView,
    ProviderView,
    /// Authenticated, but the role grants no view.
    Unauthorized,
}

/// A named operation a view may issue against the backing service.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Capability {
    Login,
    CreateOrganization,
    CreateUser,
    CreatePlan,
    ReadCoverageRules,
    CreateCoverageRules,
    UpdateCoverageRule,
    EnrollMember,
    CheckEligibility,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Login => "auth.login",
            Capability::CreateOrganization => "admin.organizations.create",
            Capability::CreateUser => "admin.users.create",
            Capability::CreatePlan => "payer.plans.create",
            Capability::ReadCoverageRules => "payer.rules.read",
            Capability::CreateCoverageRules => "payer.rules.create",
            Capability::UpdateCoverageRule => "payer.rules.update",
            Capability::EnrollMember => "payer.members.enroll",
            Capability::CheckEligibility => "provider.eligibility.check",
        }
    }
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

const UNAUTHENTICATED_CAPS: &[Capability] = &[Capability::Login];
const ADMIN_CAPS: &[Capability] = &[Capability::CreateOrganization, Capability::CreateUser];
const PAYER_CAPS: &[Capability] = &[
    Capability::CreatePlan,
    Capability::ReadCoverageRules,
    Capability::CreateCoverageRules,
    Capability::UpdateCoverageRule,
    Capability::EnrollMember,
];
const PROVIDER_CAPS: &[Capability] = &[Capability::CheckEligibility];

impl ViewSelector {
    /// View granted to a role. Exhaustive on purpose: a new `Role` variant
    /// will not compile until it is routed here.
    pub fn for_role(role: &Role) -> Self {
        match role {
            Role::SystemAdmin => ViewSelector::AdminView,
            Role::PayerUser => ViewSelector::PayerView,
            Role::ProviderUser => ViewSelector::ProviderView,
            Role::Unrecognized(_) => ViewSelector::Unauthorized,
        }
    }

    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            ViewSelector::Unauthenticated => UNAUTHENTICATED_CAPS,
            ViewSelector::AdminView => ADMIN_CAPS,
            ViewSelector::PayerView => PAYER_CAPS,
            ViewSelector::ProviderView => PROVIDER_CAPS,
            ViewSelector::Unauthorized => &[],
        }
    }

    pub fn permits(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewSelector::Unauthenticated => "unauthenticated",
            ViewSelector::AdminView => "admin",
            ViewSelector::PayerView => "payer",
            ViewSelector::ProviderView => "provider",
            ViewSelector::Unauthorized => "unauthorized",
        }
    }
}

impl core::fmt::Display for ViewSelector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the view for the current identity (or lack of one).
///
/// Total and side-effect free; call it again on every session change.
pub fn resolve_view(identity: Option<&Identity>) -> ViewSelector {
    match identity {
        None => ViewSelector::Unauthenticated,
        Some(identity) => ViewSelector::for_role(&identity.role),
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("login required")]
    LoginRequired,

    #[error("role does not grant any view")]
    UnrecognizedRole,

    #[error("forbidden: {view} view cannot perform '{capability}'")]
    Forbidden {
        view: ViewSelector,
        capability: Capability,
    },
}

/// Check that a resolved view may issue `capability`.
///
/// Client-side gate only; the service stays authoritative.
pub fn authorize(view: ViewSelector, capability: Capability) -> Result<(), AuthzError> {
    if view.permits(capability) {
        return Ok(());
    }
    match view {
        ViewSelector::Unauthenticated => Err(AuthzError::LoginRequired),
        ViewSelector::Unauthorized => Err(AuthzError::UnrecognizedRole),
        _ => Err(AuthzError::Forbidden { view, capability }),
    }
}
