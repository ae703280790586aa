//! Search API token.
//!
//! The token stays inside a `secrecy` box and only comes out when the
//! `Authorization` header is built.

use secrecy::ExposeSecret;
use std::fmt;

/// API token that prints as `[REDACTED]` in logs and debug output.
pub struct SecretString(secrecy::SecretString);

impl SecretString {
    pub fn new(token: impl Into<String>) -> Self {
        Self(secrecy::SecretString::from(token.into()))
    }

    /// The raw token.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// True when the token is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.expose().trim().is_empty()
    }

    /// `Authorization` header value for token authentication.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.expose())
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
