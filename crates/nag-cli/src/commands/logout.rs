//! `nag logout` command - Forget the token and the watched repositories.

use anyhow::{Context, Result};
use inquire::Confirm;
use serde::Serialize;

use super::utils;
use crate::output;

#[derive(Serialize)]
struct LogoutOutput {
    logged_out: bool,
}

/// Run the logout command.
pub fn run(json: bool, yes: bool) -> Result<()> {
    let (_, state) = utils::load()?;

    if !state.is_authenticated() {
        if json {
            return output::json(&LogoutOutput { logged_out: false });
        }
        output::info("Not logged in");
        return Ok(());
    }

    if !yes {
        let confirmed = Confirm::new("Log out and forget your watched repositories?")
            .with_default(false)
            .prompt()
            .context("Confirmation needed - pass --yes to skip it")?;

        if !confirmed {
            output::info("Logout cancelled");
            return Ok(());
        }
    }

    state.clear()?;

    if json {
        return output::json(&LogoutOutput { logged_out: true });
    }

    output::success("Logged out");
    Ok(())
}
