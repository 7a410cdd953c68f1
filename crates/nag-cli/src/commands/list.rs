//! `nag list` command - Show pull requests waiting on your review.

use anyhow::Result;
use nag_core::status_line;
use nag_github::PullRequestRef;
use serde::Serialize;

use super::utils;
use crate::output;

#[derive(Serialize)]
struct ListOutput<'a> {
    count: usize,
    pull_requests: &'a [PullRequestRef],
}

/// Run the list command.
pub fn run(json: bool) -> Result<()> {
    let (config, state) = utils::load()?;
    let prs = utils::fetch_review_requests(&config, &state)?;

    if json {
        return output::json(&ListOutput {
            count: prs.len(),
            pull_requests: &prs,
        });
    }

    output::info(&status_line(prs.len()));
    output::pr_list(&prs);
    Ok(())
}
