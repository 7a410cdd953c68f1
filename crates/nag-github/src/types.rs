//! GitHub API types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::AccessToken;
use crate::error::DeviceFlowError;

/// A pull request awaiting review.
///
/// Identity is `id`: the same pull request fetched through two different
/// queries compares equal by id even when other fields were read at
/// different moments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// Globally unique issue id.
    pub id: u64,

    /// Repository-local PR number.
    pub number: u64,

    /// PR title.
    pub title: String,

    /// Repository as `owner/name`, or `unknown`.
    pub repository: String,

    /// Login of the PR author.
    pub author: String,

    /// PR URL.
    pub url: String,

    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl PullRequestRef {
    /// Short human reference, e.g. `octo/repo#42`.
    #[must_use]
    pub fn reference(&self) -> String {
        format!("{}#{}", self.repository, self.number)
    }
}

/// Codes issued by the device code endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceAuthorization {
    /// Secret code exchanged for a token; never shown to the user.
    pub device_code: String,

    /// Code the user types on the verification page.
    pub user_code: String,

    /// Page where the user enters the code.
    pub verification_uri: String,

    /// Minimum seconds between token polls.
    pub interval: u64,

    /// Seconds until the device code expires, when the server says.
    pub expires_in: Option<u64>,
}

impl fmt::Debug for DeviceAuthorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceAuthorization")
            .field("device_code", &"[redacted]")
            .field("user_code", &self.user_code)
            .field("verification_uri", &self.verification_uri)
            .field("interval", &self.interval)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Parsed answer from one token poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenPoll {
    /// The user approved; here is the token.
    Granted(AccessToken),
    /// `authorization_pending`: ask again after the current interval.
    Pending,
    /// `slow_down`: ask again, less often.
    SlowDown,
    /// Any other error code; the flow is over.
    Denied(DeviceFlowError),
}
