use crate::claims::DecodeError;

/// Raw bearer credential as issued by `POST /auth/login`.
///
/// Opaque to this crate apart from claims decoding. The token text is never
/// printed by `Debug`; use [`Credential::expose`] where the raw value is
/// genuinely needed (the `Authorization` header, durable storage).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw credential.
    ///
    /// Rejects empty and whitespace-only input with `InvalidInput`; nothing
    /// else is checked here (see [`crate::decode`]).
    pub fn new(raw: impl Into<String>) -> Result<Self, DecodeError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(DecodeError::InvalidInput);
        }
        Ok(Self(raw))
    }

    /// Extract a credential from a login response body.
    ///
    /// The service answers with the token as plain text, but a JSON string
    /// literal is accepted too. An empty body or a JSON `null` is the
    /// "no credential" case and yields `InvalidInput`.
    pub fn from_response_body(body: &str) -> Result<Self, DecodeError> {
        let body = body.trim();
        if body.is_empty() || body == "null" {
            return Err(DecodeError::InvalidInput);
        }
        if body.starts_with('"') {
            let raw: String = serde_json::from_str(body).map_err(|_| DecodeError::InvalidInput)?;
            return Self::new(raw);
        }
        Self::new(body)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// `Bearer <credential>` header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl core::fmt::Debug for Credential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_blank_are_invalid_input() {
        assert_eq!(Credential::new(""), Err(DecodeError::InvalidInput));
        assert_eq!(Credential::new("  \n"), Err(DecodeError::InvalidInput));
    }

    #[test]
    fn raw_value_is_kept_verbatim() {
        let cred = Credential::new("a.b.c").unwrap();
        assert_eq!(cred.expose(), "a.b.c");
        assert_eq!(cred.bearer(), "Bearer a.b.c");
    }

    #[test]
    fn debug_never_leaks_the_token() {
        let cred = Credential::new("secret.token.value").unwrap();
        let shown = format!("{cred:?}");
        assert!(!shown.contains("secret"));
    }

    #[test]
    fn response_body_forms() {
        assert_eq!(Credential::from_response_body("a.b.c\n").unwrap().expose(), "a.b.c");
        assert_eq!(Credential::from_response_body("\"a.b.c\"").unwrap().expose(), "a.b.c");
        assert_eq!(Credential::from_response_body(""), Err(DecodeError::InvalidInput));
        assert_eq!(Credential::from_response_body("null"), Err(DecodeError::InvalidInput));
        assert_eq!(Credential::from_response_body("\"\""), Err(DecodeError::InvalidInput));
    }
}
