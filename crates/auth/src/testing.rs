//! Unsigned token minting for tests.
//!
//! Tokens produced here carry a fixed header and a dummy signature; they are
//! only good for exercising claims decoding.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value;

const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

pub fn unsigned_token(claims: &Value) -> String {
    unsigned_token_with_payload(claims.to_string().as_bytes())
}

pub fn unsigned_token_with_payload(payload: &[u8]) -> String {
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(HEADER),
        URL_SAFE_NO_PAD.encode(payload),
        URL_SAFE_NO_PAD.encode("signature"),
    )
}

/// Token carrying only a `role` claim.
pub fn token_for_role(role: &str) -> String {
    unsigned_token(&serde_json::json!({ "role": role }))
}
