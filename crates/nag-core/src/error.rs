//! Error types for nag-core.

/// Result type for nag-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// GitHub request failed.
    #[error(transparent)]
    GitHub(#[from] nag_github::Error),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Session file could not be read or written.
    #[error("invalid session data: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file is missing, unparsable or holds bad values.
    #[error("invalid config: {0}")]
    Config(String),

    /// Repository identifier is not `owner/name`.
    #[error("invalid repository '{name}': {reason}")]
    InvalidRepoName {
        /// The rejected input.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// No access token is stored.
    #[error("not logged in - run `nag login` first")]
    NotAuthenticated,
}
