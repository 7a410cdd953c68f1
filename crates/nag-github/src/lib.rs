//! # nag-github
//!
//! GitHub API integration for Nag: the OAuth device flow endpoints and
//! the issue search used to find pull requests awaiting your review.

mod auth;
mod client;
mod device;
mod error;
mod types;

pub use auth::AccessToken;
pub use client::{GitHubClient, repository_from_url};
pub use device::DeviceFlowClient;
pub use error::{DeviceFlowError, Error, Result};
pub use types::{DeviceAuthorization, PullRequestRef, TokenPoll};
