//! `nag whoami` command - Show the signed-in account.

use anyhow::{Context, Result, bail};
use serde::Serialize;

use super::utils;
use crate::output;

#[derive(Serialize)]
struct WhoamiOutput {
    username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_valid: Option<bool>,
}

/// Run the whoami command.
pub fn run(json: bool, check: bool) -> Result<()> {
    let (config, state) = utils::load()?;
    let client = utils::github_client(&config, &state)?;
    let mut username = state.username()?;

    let token_valid = if check {
        // Any non-success status from /user means the token is no good.
        match utils::runtime()?.block_on(client.current_user()) {
            Ok(login) => {
                if username.as_deref() != Some(login.as_str()) {
                    state.save_username(&login)?;
                    username = Some(login);
                }
                Some(true)
            }
            Err(nag_github::Error::HttpStatus { status, .. }) => {
                tracing::info!(status, "token rejected");
                Some(false)
            }
            Err(e) => return Err(e).context("Failed to reach GitHub"),
        }
    } else {
        None
    };

    if json {
        return output::json(&WhoamiOutput {
            username,
            token_valid,
        });
    }

    output::essential(username.as_deref().unwrap_or("(unknown user)"));

    if token_valid == Some(false) {
        bail!("The stored token is no longer valid - run `nag login` again");
    }
    if token_valid == Some(true) {
        output::success("Token is valid");
    }

    Ok(())
}
