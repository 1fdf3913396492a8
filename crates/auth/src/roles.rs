use core::convert::Infallible;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role claim carried by a credential.
///
/// The three known roles are matched exactly (case-sensitive). Anything else
/// the service hands out is kept verbatim in `Unrecognized` so callers can
/// report it, but it never grants a view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    SystemAdmin,
    PayerUser,
    ProviderUser,
    Unrecognized(String),
}

impl Role {
    pub const SYSTEM_ADMIN: &'static str = "SYSTEM_ADMIN";
    pub const PAYER_USER: &'static str = "PAYER_USER";
    pub const PROVIDER_USER: &'static str = "PROVIDER_USER";

    pub fn parse(name: &str) -> Self {
        match name {
            Self::SYSTEM_ADMIN => Role::SystemAdmin,
            Self::PAYER_USER => Role::PayerUser,
            Self::PROVIDER_USER => Role::ProviderUser,
            other => Role::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::SystemAdmin => Self::SYSTEM_ADMIN,
            Role::PayerUser => Self::PAYER_USER,
            Role::ProviderUser => Self::PROVIDER_USER,
            Role::Unrecognized(name) => name,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Role::Unrecognized(_))
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Role::parse(s))
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Role::parse(&value)
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        match value {
            Role::Unrecognized(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles_parse_exactly() {
        assert_eq!(Role::parse("SYSTEM_ADMIN"), Role::SystemAdmin);
        assert_eq!(Role::parse("PAYER_USER"), Role::PayerUser);
        assert_eq!(Role::parse("PROVIDER_USER"), Role::ProviderUser);
    }

    #[test]
    fn near_misses_stay_unrecognized() {
        for name in ["system_admin", "PAYER", " PROVIDER_USER", ""] {
            let role = Role::parse(name);
            assert_eq!(role, Role::Unrecognized(name.to_string()));
            assert!(!role.is_recognized());
            assert_eq!(role.as_str(), name);
        }
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&Role::PayerUser).unwrap();
        assert_eq!(json, "\"PAYER_USER\"");

        let role: Role = serde_json::from_str("\"AUDITOR\"").unwrap();
        assert_eq!(role, Role::Unrecognized("AUDITOR".into()));
    }
}
