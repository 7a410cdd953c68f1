//! `nag open` command - Open a pull request from the review list.

use std::str::FromStr;

use anyhow::{Result, anyhow, bail};
use nag_github::PullRequestRef;

use super::utils;
use crate::output;

/// Which pull request to open.
#[derive(Debug, PartialEq, Eq)]
enum Target {
    /// `owner/name#number`
    Reference { repository: String, number: u64 },
    /// The pull request's global id.
    Id(u64),
}

impl FromStr for Target {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some((repository, number)) = s.rsplit_once('#') {
            let number = number
                .parse::<u64>()
                .map_err(|_| anyhow!("'{number}' is not a pull request number"))?;
            if repository.is_empty() {
                bail!("Expected owner/name#number");
            }
            return Ok(Self::Reference {
                repository: repository.to_string(),
                number,
            });
        }

        s.parse::<u64>()
            .map(Self::Id)
            .map_err(|_| anyhow!("Expected owner/name#number or a pull request id, got '{s}'"))
    }
}

impl Target {
    fn matches(&self, pr: &PullRequestRef) -> bool {
        match self {
            Self::Reference { repository, number } => {
                pr.number == *number && pr.repository.eq_ignore_ascii_case(repository)
            }
            Self::Id(id) => pr.id == *id,
        }
    }
}

/// Run the open command.
pub fn run(target: &str) -> Result<()> {
    let wanted: Target = target.parse()?;
    let (config, state) = utils::load()?;
    let prs = utils::fetch_review_requests(&config, &state)?;

    let Some(pr) = prs.iter().find(|pr| wanted.matches(pr)) else {
        bail!("No pull request matching '{target}' is waiting for your review");
    };

    output::essential(&pr.url);
    if let Err(e) = open::that(&pr.url) {
        output::warn(&format!("Could not open a browser: {e}"));
    }
    Ok(())
}
