//! Strongly-typed identifiers exchanged with the eligibility service.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Numeric identifier of an organization (payer or provider).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationId(i64);

impl OrganizationId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for OrganizationId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|e| DomainError::invalid_id(format!("OrganizationId: {e}")))
    }
}

/// Payer plan code (e.g. "GOLD-2025").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlanCode(String);

/// Service code a coverage rule applies to.
///
/// Kept opaque: the service catalogue belongs to the backing service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceCode(String);

/// Payer-assigned member identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemberExternalId(String);

macro_rules! impl_code_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Build from user input. Surrounding whitespace is dropped; an
            /// empty result is rejected.
            pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
                let value = value.into();
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::invalid_id(concat!($name, " must not be empty")));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }
    };
}

impl_code_newtype!(PlanCode, "PlanCode");
impl_code_newtype!(ServiceCode, "ServiceCode");
impl_code_newtype!(MemberExternalId, "MemberExternalId");

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn codes_are_trimmed() {
        let code = PlanCode::new("  GOLD-2025 \n").unwrap();
        assert_eq!(code.as_str(), "GOLD-2025");
    }

    #[test]
    fn blank_codes_are_rejected() {
        assert!(matches!(PlanCode::new("   "), Err(DomainError::InvalidId(_))));
        assert!(ServiceCode::new("").is_err());
        assert!(MemberExternalId::new("\t").is_err());
    }

    #[test]
    fn deserialization_goes_through_validation() {
        let ok: ServiceCode = serde_json::from_str("\"PHYSIOTHERAPY\"").unwrap();
        assert_eq!(ok.as_str(), "PHYSIOTHERAPY");

        let err = serde_json::from_str::<ServiceCode>("\"  \"");
        assert!(err.is_err());
    }

    #[test]
    fn organization_id_parses_from_form_input() {
        assert_eq!(" 42 ".parse::<OrganizationId>().unwrap(), OrganizationId::new(42));
        assert!("forty-two".parse::<OrganizationId>().is_err());
        assert_eq!(serde_json::to_string(&OrganizationId::new(7)).unwrap(), "7");
    }

    proptest! {
        /// Property: any code with at least one visible character survives
        /// construction and displays as its trimmed form.
        #[test]
        fn non_blank_codes_display_trimmed(s in "[A-Za-z0-9_-]{1,16}", pad in " {0,3}") {
            let input = format!("{pad}{s}{pad}");
            let code = MemberExternalId::new(input).unwrap();
            prop_assert_eq!(code.to_string(), s);
        }
    }
}
