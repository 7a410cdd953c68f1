//! # nag-core
//!
//! Core library for Nag: the device login flow, the review-request query
//! engine, change detection between polls, the poll scheduler, and the
//! persisted session.

pub mod authorize;
pub mod config;
pub mod detect;
pub mod error;
pub mod publish;
pub mod repo_name;
pub mod review;
pub mod scheduler;
pub mod state;

pub use authorize::{DeviceAuthorizer, DeviceFlowState, TokenEndpoint};
pub use config::Config;
pub use detect::{PollSnapshot, compute_newly_visible};
pub use error::{Error, Result};
pub use publish::{Notifier, Renderer, ReviewNotification, status_line};
pub use repo_name::RepoName;
pub use review::{ReviewQueryEngine, SearchIssues, review_query};
pub use scheduler::{POLL_PERIOD, PollScheduler};
pub use state::State;
