//! Error types for GitHub operations.

use std::fmt;

/// Result type for GitHub operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to GitHub.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connectivity failure (DNS, TLS, connection reset, ...).
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with an empty body.
    #[error("empty response from GitHub")]
    EmptyResponse,

    /// The body did not match the expected schema.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Non-success HTTP status.
    #[error("GitHub API error ({status}): {message}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        message: String,
    },

    /// Device authorization ended without a token.
    #[error("authorization failed: {0}")]
    Authorization(DeviceFlowError),

    /// The token contains bytes that cannot go into an HTTP header.
    #[error("access token is not a valid header value")]
    InvalidHeader,
}

impl Error {
    /// Whether GitHub rejected the credentials (invalid or revoked token).
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::HttpStatus { status: 401, .. })
    }

    /// Whether the request was refused because of rate limiting.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::HttpStatus { status: 429, .. } => true,
            Self::HttpStatus {
                status: 403,
                message,
            } => message.to_ascii_lowercase().contains("rate limit"),
            _ => false,
        }
    }
}

/// Terminal outcomes of the device flow other than success.
///
/// The provider reports these as strings; they are mapped once, at the
/// boundary, and matched exhaustively from then on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceFlowError {
    /// The device code expired before the user approved it.
    ExpiredToken,
    /// The user declined the authorization request.
    AccessDenied,
    /// Any other provider error code, kept verbatim.
    Other(String),
}

impl DeviceFlowError {
    /// Map a provider error code to a variant.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "expired_token" => Self::ExpiredToken,
            "access_denied" => Self::AccessDenied,
            other => Self::Other(other.to_string()),
        }
    }

    /// The provider's error code.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::ExpiredToken => "expired_token",
            Self::AccessDenied => "access_denied",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for DeviceFlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExpiredToken => write!(f, "the device code expired ({})", self.code()),
            Self::AccessDenied => write!(f, "access was denied ({})", self.code()),
            Self::Other(code) => write!(f, "{code}"),
        }
    }
}
