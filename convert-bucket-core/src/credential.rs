use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::contract::SecretValue;
use crate::error::DispatchError;

/// JSON field of the secret document that holds the API key.
pub const CREDENTIAL_FIELD: &str = "CONVERTAPI";

/// Conversion service API key. Held in memory for one record only.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Credential(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Extracts the API key from a stored secret.
    ///
    /// Text secrets are used as-is. Binary secrets are read as ASCII JSON when they are
    /// one, otherwise as base64 text that decodes to ASCII.
    /// Either way the text must be a JSON object with a string [`CREDENTIAL_FIELD`].
    pub fn from_secret(secret: &SecretValue) -> Result<Self, DispatchError> {
        let text = match secret {
            SecretValue::Text(text) => text.clone(),
            SecretValue::Binary(bytes) => decode_binary(bytes)?,
        };

        let document: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| DispatchError::Credential(format!("secret is not valid JSON: {e}")))?;

        match document.get(CREDENTIAL_FIELD).and_then(|v| v.as_str()) {
            Some(key) if !key.is_empty() => Ok(Credential::new(key)),
            Some(_) => Err(DispatchError::Credential(format!(
                "{CREDENTIAL_FIELD} is empty"
            ))),
            None => Err(DispatchError::Credential(format!(
                "secret has no string field {CREDENTIAL_FIELD}"
            ))),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

fn decode_binary(bytes: &[u8]) -> Result<String, DispatchError> {
    if let Some(raw) = raw_json(bytes) {
        return Ok(raw);
    }
    let encoded = String::from_utf8_lossy(bytes);
    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|e| DispatchError::Credential(format!("secret binary is not base64: {e}")))?;
    if !decoded.is_ascii() {
        return Err(DispatchError::Credential(
            "secret binary does not decode to ASCII".to_string(),
        ));
    }
    String::from_utf8(decoded)
        .map_err(|e| DispatchError::Credential(format!("secret binary is not text: {e}")))
}

/// The binary payload itself, if it already is an ASCII JSON document.
fn raw_json(bytes: &[u8]) -> Option<String> {
    if !bytes.is_ascii() {
        return None;
    }
    let text = std::str::from_utf8(bytes).ok()?;
    serde_json::from_str::<serde_json::Value>(text).ok()?;
    Some(text.to_string())
}
