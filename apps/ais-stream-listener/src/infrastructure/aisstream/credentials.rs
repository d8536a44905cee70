//! AIS Stream Credentials
//!
//! The feed authenticates a subscription by the `Apikey` field of the
//! subscription request. There is no separate handshake: a bad key is
//! answered with an error object and the server closes the connection.
//!
//! The key is a secret. It must come from configuration, never from source.

use thiserror::Error;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "AISSTREAM_API_KEY";

/// Errors that can occur when building credentials.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialsError {
    /// Key was empty or whitespace.
    #[error("API key cannot be empty")]
    EmptyKey,
}

/// AIS stream API key.
///
/// `Debug` and `Display` redact the value for safe logging.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Create a new API key.
    ///
    /// Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty after trimming.
    pub fn new(key: impl Into<String>) -> Result<Self, CredentialsError> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err(CredentialsError::EmptyKey);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Expose the raw key for the subscription request.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiKey").field(&"[REDACTED]").finish()
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}
