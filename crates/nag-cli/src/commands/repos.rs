//! `nag repos` commands - Manage the watched repositories.

use anyhow::Result;
use nag_core::RepoName;

use super::utils;
use crate::output;

/// Show the watched repositories.
pub fn list(json: bool) -> Result<()> {
    let (_, state) = utils::load()?;
    let repositories = state.repositories()?;

    if json {
        return output::json(&repositories);
    }

    if repositories.is_empty() {
        output::info("Watching every repository you have access to");
        return Ok(());
    }

    for repo in &repositories {
        output::essential(repo.as_str());
    }
    Ok(())
}

/// Add repositories to the watch list.
pub fn add(json: bool, inputs: &[String]) -> Result<()> {
    let (_, state) = utils::load()?;
    let new = RepoName::parse_list(inputs)?;

    let mut repositories = state.repositories()?;
    let before = repositories.len();
    repositories.extend(new);
    state.save_repositories(&repositories)?;

    let repositories = state.repositories()?;
    let added = repositories.len().saturating_sub(before);
    finish(json, &repositories, &format!("Added {added} repository(ies)"))
}

/// Remove repositories from the watch list.
pub fn remove(json: bool, inputs: &[String]) -> Result<()> {
    let (_, state) = utils::load()?;
    let gone = RepoName::parse_list(inputs)?;

    let mut repositories = state.repositories()?;
    for repo in &gone {
        if !repositories.contains(repo) {
            output::warn(&format!("Not watching {repo}"));
        }
    }
    repositories.retain(|repo| !gone.contains(repo));
    state.save_repositories(&repositories)?;

    finish(json, &repositories, "Updated watched repositories")
}

/// Empty the watch list.
pub fn clear(json: bool) -> Result<()> {
    let (_, state) = utils::load()?;
    state.save_repositories(&[])?;
    finish(json, &[], "Cleared watched repositories")
}

fn finish(json: bool, repositories: &[RepoName], message: &str) -> Result<()> {
    if json {
        return output::json(&repositories);
    }

    output::success(message);
    output::info(&scope(repositories));
    Ok(())
}

fn scope(repositories: &[RepoName]) -> String {
    match repositories.len() {
        0 => "Watching every repository you have access to".to_string(),
        1 => "Watching 1 repository".to_string(),
        n => format!("Watching {n} repositories"),
    }
}
