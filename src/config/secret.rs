//! Secure credential handling using the secrecy crate
//!
//! This module provides type aliases and utilities for handling sensitive
//! credentials in memory. It uses the `secrecy` crate which automatically
//! zeros memory when secrets are dropped, preventing exposure in memory dumps
//! or crash reports.
//!
//! Secrets are write-only from the API's perspective: deserialization accepts
//! a plaintext value, but serialization always emits a redaction placeholder.
//! The core never logs or echoes credential values.
//!
//! # Example
//!
//! ```rust
//! use trellis::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let password = secret_string("my-password".to_string());
//!
//! // Access the secret only when needed
//! assert_eq!(password.expose_secret().as_ref(), "my-password");
//!
//! // Debug output is redacted
//! let debug = format!("{:?}", password);
//! assert!(!debug.contains("my-password"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret};
use serde::{Deserialize, Deserializer, Serializer};
use zeroize::Zeroize;

/// Placeholder emitted wherever a secret would otherwise appear in output
pub const REDACTED: &str = "********";

/// Newtype wrapper for String that implements the required traits for Secret
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Check if the secret value is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Type alias for a secret string
///
/// This wraps a `SecretValue` in a `Secret` container that:
/// - Zeros the memory when dropped
/// - Prevents accidental logging via Debug
/// - Requires explicit `expose_secret()` to access
pub type SecretString = Secret<SecretValue>;

/// Helper function to create a SecretString from a String
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// Serde helper that serializes any secret field as [`REDACTED`]
///
/// Attach with `#[serde(serialize_with = "serialize_redacted")]`. Read
/// responses must never echo credentials, so the real value is unreachable
/// through serialization by construction.
pub fn serialize_redacted<S>(_secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(REDACTED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_string_creation() {
        let secret = secret_string("test-password".to_string());
        assert_eq!(secret.expose_secret().as_ref(), "test-password");
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("sensitive-data".to_string());
        let debug_output = format!("{secret:?}");

        assert!(!debug_output.contains("sensitive-data"));
        assert!(debug_output.contains("REDACTED") || debug_output.contains("Secret"));
    }

    #[test]
    fn test_secret_deserializes_plaintext() {
        #[derive(serde::Deserialize)]
        struct Creds {
            password: SecretString,
        }

        let creds: Creds = serde_json::from_str(r#"{"password": "hunter2"}"#).unwrap();
        assert_eq!(creds.password.expose_secret().as_ref(), "hunter2");
    }

    #[test]
    fn test_secret_serializes_redacted() {
        #[derive(serde::Serialize)]
        struct Creds {
            #[serde(serialize_with = "serialize_redacted")]
            password: SecretString,
        }

        let creds = Creds {
            password: secret_string("hunter2".to_string()),
        };
        let json = serde_json::to_string(&creds).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(json.contains(REDACTED));
    }

    #[test]
    fn test_secret_value_is_empty() {
        assert!(SecretValue::from(String::new()).is_empty());
        assert!(!SecretValue::from("x".to_string()).is_empty());
    }
}
