use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{Credential, Identity, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Precondition failure: nothing to decode.
    #[error("credential is empty")]
    InvalidInput,

    #[error("malformed credential: {0}")]
    Malformed(String),

    #[error("credential has no string 'role' claim")]
    MissingRole,
}

impl DecodeError {
    fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

/// Decode a raw credential into the identity it describes.
///
/// Only the claims payload is read. The signature and `exp` are **not**
/// verified: the credential is trusted because it came straight from the
/// login response, and the service re-checks it on every request.
pub fn decode(raw: &str) -> Result<Identity, DecodeError> {
    if raw.trim().is_empty() {
        return Err(DecodeError::InvalidInput);
    }

    let claims = payload_claims(raw)?;

    let role = match claims.get("role") {
        Some(Value::String(name)) => Role::parse(name),
        _ => return Err(DecodeError::MissingRole),
    };

    let subject = claims
        .get("sub")
        .and_then(Value::as_str)
        .map(str::to_string);

    let expires_at = claims.get("exp").and_then(epoch_seconds);

    Ok(Identity {
        role,
        subject,
        expires_at,
    })
}

pub fn decode_credential(credential: &Credential) -> Result<Identity, DecodeError> {
    decode(credential.expose())
}

fn payload_claims(raw: &str) -> Result<Map<String, Value>, DecodeError> {
    let segments: Vec<&str> = raw.split('.').collect();
    if segments.len() != 3 {
        return Err(DecodeError::malformed(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }

    // Standard-alphabet payloads are accepted too.
    let payload: String = segments[1]
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| DecodeError::malformed(format!("payload is not base64: {e}")))?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(claims)) => Ok(claims),
        Ok(_) => Err(DecodeError::malformed("payload is not a JSON object")),
        Err(e) => Err(DecodeError::malformed(format!("payload is not JSON: {e}"))),
    }
}

fn epoch_seconds(value: &Value) -> Option<DateTime<Utc>> {
    let secs = value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))?;
    DateTime::<Utc>::from_timestamp(secs, 0)
}
