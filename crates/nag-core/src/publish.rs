//! Publishing poll results.
//!
//! The scheduler hands newly visible pull requests to a [`Notifier`] and
//! the full current list to a [`Renderer`]. How either is presented is up
//! to the implementation.

use nag_github::PullRequestRef;

/// Title used for every review-request notification.
pub const NOTIFICATION_TITLE: &str = "New PR Review Request";

/// A single notification about a newly requested review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewNotification {
    /// Short heading.
    pub title: String,

    /// `<title> (<owner/name>) by <author>`.
    pub body: String,

    /// Link opened when the notification is activated.
    pub url: String,
}

impl ReviewNotification {
    /// Build the notification announcing `pr`.
    #[must_use]
    pub fn for_pull_request(pr: &PullRequestRef) -> Self {
        Self {
            title: NOTIFICATION_TITLE.to_string(),
            body: format!("{} ({}) by {}", pr.title, pr.repository, pr.author),
            url: pr.url.clone(),
        }
    }
}

/// Delivers notifications about new review requests.
pub trait Notifier: Send + Sync {
    /// Deliver one notification. Failures are the implementation's concern.
    fn send(&self, notification: &ReviewNotification);
}

/// Presents the current review list.
pub trait Renderer: Send + Sync {
    /// Show `prs`. When `authenticated` is false the list is always empty
    /// and the signed-out view should be shown instead.
    fn render(&self, prs: &[PullRequestRef], authenticated: bool);
}

/// One-line summary of how many reviews are waiting.
///
/// ```
/// use nag_core::status_line;
///
/// assert_eq!(status_line(0), "No PRs to review");
/// assert_eq!(status_line(1), "1 PR to review");
/// assert_eq!(status_line(4), "4 PRs to review");
/// ```
#[must_use]
pub fn status_line(count: usize) -> String {
    match count {
        0 => "No PRs to review".to_string(),
        1 => "1 PR to review".to_string(),
        n => format!("{n} PRs to review"),
    }
}
