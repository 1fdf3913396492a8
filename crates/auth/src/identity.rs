use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::Role;

/// In-memory projection of a decoded credential.
///
/// Only ever produced by [`crate::decode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub role: Role,

    /// `sub` claim, when the service includes one.
    pub subject: Option<String>,

    /// `exp` claim. Informational: nothing in the client enforces it.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Identity {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn expiry_is_only_reported_when_known() {
        let now = Utc::now();
        let mut identity = Identity {
            role: Role::PayerUser,
            subject: None,
            expires_at: None,
        };
        assert!(!identity.is_expired_at(now));

        identity.expires_at = Some(now - Duration::seconds(1));
        assert!(identity.is_expired_at(now));

        identity.expires_at = Some(now + Duration::minutes(5));
        assert!(!identity.is_expired_at(now));
    }
}
