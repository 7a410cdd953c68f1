//! Access token handling.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

/// A GitHub OAuth access token.
///
/// The secret never shows up in `Debug` output or logs.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    /// Wrap a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Borrow the raw token, for building request headers and persisting it.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Whether the token is blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expose().trim().is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([redacted])")
    }
}

impl PartialEq for AccessToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for AccessToken {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let token = AccessToken::new("gho_secret");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("gho_secret"));
        assert_eq!(token.expose(), "gho_secret");
    }

    #[test]
    fn test_is_empty() {
        assert!(AccessToken::new("  ").is_empty());
        assert!(!AccessToken::new("gho_x").is_empty());
    }
}
