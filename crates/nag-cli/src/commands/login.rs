//! `nag login` command - Sign in with the GitHub device flow.

use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use nag_core::DeviceAuthorizer;
use nag_github::{DeviceFlowClient, GitHubClient};
use serde::Serialize;

use super::utils;
use crate::output;

#[derive(Serialize)]
struct LoginOutput<'a> {
    authenticated: bool,
    username: &'a str,
}

/// Run the login command.
pub fn run(json: bool, no_browser: bool) -> Result<()> {
    let (config, state) = utils::load()?;
    let rt = utils::runtime()?;

    let client =
        DeviceFlowClient::with_base_url(config.github.client_id.as_str(), &config.github.oauth_url)
            .context("Failed to create GitHub client")?;
    let authorizer = DeviceAuthorizer::new(client);

    let authorization = rt
        .block_on(authorizer.start_device_flow())
        .context("Failed to start device login")?;

    // The code is needed even in quiet or JSON mode; keep stdout clean for JSON.
    let prompt = format!(
        "Enter code {} at {}",
        authorization.user_code, authorization.verification_uri
    );
    if json {
        eprintln!("{prompt}");
    } else {
        output::essential(&prompt);
    }

    if !no_browser {
        if let Err(e) = open::that(&authorization.verification_uri) {
            output::warn(&format!("Could not open a browser: {e}"));
        }
    }

    let spinner = if json || output::is_quiet() {
        ProgressBar::hidden()
    } else {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message("Waiting for authorization (Ctrl+C to cancel)...");
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    };

    let cancel = async {
        if tokio::signal::ctrl_c().await.is_err() {
            // No signal handling available: never cancel.
            std::future::pending::<()>().await;
        }
    };
    let outcome = rt.block_on(authorizer.poll_for_token(&authorization, cancel));
    spinner.finish_and_clear();

    let Some(token) = outcome.context("Login failed")? else {
        output::info("Login cancelled");
        return Ok(());
    };

    let username = rt
        .block_on(GitHubClient::with_base_url(&token, &config.github.api_url)?.current_user())
        .context("GitHub did not accept the new token")?;

    state.save_token(&token)?;
    state.save_username(&username)?;

    if json {
        return output::json(&LoginOutput {
            authenticated: true,
            username: &username,
        });
    }

    output::success(&format!("Logged in as {username}"));
    Ok(())
}
