use anyhow::{Context, Result};
use nag_core::{Config, ReviewQueryEngine, State};
use nag_github::{GitHubClient, PullRequestRef};

/// Helper to load config and state from the config directory.
pub fn load() -> Result<(Config, State)> {
    let dir = Config::dir()?;
    let config = Config::load(&dir)
        .with_context(|| format!("Failed to load {}", Config::path(&dir).display()))?;
    Ok((config, State::new(dir)))
}

/// Helper to build an API client from the stored token.
pub fn github_client(config: &Config, state: &State) -> Result<GitHubClient> {
    let token = state.require_token()?;
    GitHubClient::with_base_url(&token, &config.github.api_url)
        .context("Failed to create GitHub client")
}

pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to start async runtime")
}

/// Run one review-request fetch for the stored repositories.
pub fn fetch_review_requests(config: &Config, state: &State) -> Result<Vec<PullRequestRef>> {
    let client = github_client(config, state)?;
    let repositories = state.repositories()?;
    let engine = ReviewQueryEngine::new(client);

    runtime()?
        .block_on(engine.fetch_review_requests(&repositories))
        .context("Failed to fetch review requests")
}
