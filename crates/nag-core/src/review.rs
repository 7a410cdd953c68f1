//! Review-request query engine.
//!
//! Fetches open pull requests where the user is a requested reviewer,
//! either across everything the token can see or fanned out over a list
//! of monitored repositories, and merges the answers into one list with
//! unique ids, newest first.

use std::collections::HashSet;

use async_trait::async_trait;
use futures::future::join_all;
use nag_github::{GitHubClient, PullRequestRef};
use tracing::{debug, warn};

use crate::error::Result;
use crate::repo_name::RepoName;

/// Search qualifiers for "open PRs awaiting my review".
pub const REVIEW_QUERY: &str = "is:pr is:open review-requested:@me";

/// Build the search query, optionally scoped to one repository.
///
/// ```
/// use nag_core::{RepoName, review_query};
///
/// assert_eq!(review_query(None), "is:pr is:open review-requested:@me");
///
/// let repo = RepoName::new("octo/hello").unwrap();
/// assert_eq!(
///     review_query(Some(&repo)),
///     "repo:octo/hello is:pr is:open review-requested:@me"
/// );
/// ```
#[must_use]
pub fn review_query(repo: Option<&RepoName>) -> String {
    match repo {
        Some(repo) => format!("repo:{repo} {REVIEW_QUERY}"),
        None => REVIEW_QUERY.to_string(),
    }
}

/// Something that can run an issue search.
///
/// Implemented by [`GitHubClient`]; tests substitute scripted searches.
#[async_trait]
pub trait SearchIssues: Send + Sync {
    /// Run one search query.
    async fn search_issues(&self, query: &str) -> nag_github::Result<Vec<PullRequestRef>>;
}

#[async_trait]
impl SearchIssues for GitHubClient {
    async fn search_issues(&self, query: &str) -> nag_github::Result<Vec<PullRequestRef>> {
        Self::search_issues(self, query).await
    }
}

/// Fetches and merges review requests.
#[derive(Debug)]
pub struct ReviewQueryEngine<S> {
    search: S,
}

impl<S: SearchIssues> ReviewQueryEngine<S> {
    /// Create an engine over a search backend.
    pub const fn new(search: S) -> Self {
        Self { search }
    }

    /// Fetch open pull requests awaiting the user's review.
    ///
    /// With no repositories, one unscoped query runs. Otherwise one query
    /// per repository runs concurrently; all of them finish before the
    /// results are merged. Failed repositories are dropped as long as one
    /// succeeded.
    ///
    /// # Errors
    /// Returns the first error (in repository order) when every query failed.
    pub async fn fetch_review_requests(&self, repos: &[RepoName]) -> Result<Vec<PullRequestRef>> {
        if repos.is_empty() {
            let prs = self.search.search_issues(REVIEW_QUERY).await?;
            return merge_outcomes(vec![Ok(prs)]);
        }

        let queries: Vec<String> = repos.iter().map(|repo| review_query(Some(repo))).collect();
        let outcomes = join_all(queries.iter().map(|query| self.search.search_issues(query))).await;

        for (repo, outcome) in repos.iter().zip(&outcomes) {
            if let Err(e) = outcome {
                warn!(%repo, error = %e, "review request query failed");
            }
        }

        merge_outcomes(outcomes)
    }
}

/// Merge per-query outcomes.
///
/// Successes are concatenated in input order, duplicate ids dropped (the
/// first occurrence wins), and the result sorted by `updated_at`, newest
/// first. If nothing succeeded the first error is returned.
///
/// # Errors
/// Returns the first error when `outcomes` contains no success.
pub fn merge_outcomes(
    outcomes: Vec<nag_github::Result<Vec<PullRequestRef>>>,
) -> Result<Vec<PullRequestRef>> {
    let mut successes = Vec::new();
    let mut first_error = None;
    let mut failed = 0_usize;

    for outcome in outcomes {
        match outcome {
            Ok(prs) => successes.push(prs),
            Err(e) => {
                failed += 1;
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    if successes.is_empty() {
        if let Some(e) = first_error {
            return Err(e.into());
        }
    }

    let mut seen = HashSet::new();
    let mut merged: Vec<PullRequestRef> = successes
        .into_iter()
        .flatten()
        .filter(|pr| seen.insert(pr.id))
        .collect();

    // Stable, so equal timestamps keep merge order.
    merged.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

    debug!(count = merged.len(), failed, "merged review requests");
    Ok(merged)
}
