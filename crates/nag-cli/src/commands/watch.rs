//! `nag watch` command - Poll for review requests until interrupted.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use colored::Colorize;
use nag_core::{
    Config, Notifier, PollScheduler, RepoName, Renderer, ReviewNotification, ReviewQueryEngine,
    State, status_line,
};
use nag_github::{AccessToken, GitHubClient, PullRequestRef};
use serde::Serialize;
use serde_json::json;

use super::utils;
use crate::output;

/// How often the session file is re-read for login and repository changes.
const SESSION_CHECK_PERIOD: Duration = Duration::from_secs(5);

/// Prints the review list every time a poll completes.
struct TerminalRenderer {
    json: bool,
}

impl Renderer for TerminalRenderer {
    fn render(&self, prs: &[PullRequestRef], authenticated: bool) {
        if self.json {
            print_event(&json!({
                "event": "update",
                "authenticated": authenticated,
                "pull_requests": prs,
            }));
            return;
        }

        if !authenticated {
            output::info("Stopped watching");
            return;
        }

        output::hr();
        output::info(&format!(
            "{} {}",
            status_line(prs.len()),
            format!("(updated {})", Local::now().format("%H:%M:%S")).dimmed()
        ));
        output::pr_list(prs);
    }
}

/// Announces new review requests on the terminal, with a bell.
struct TerminalNotifier {
    json: bool,
}

impl Notifier for TerminalNotifier {
    fn send(&self, notification: &ReviewNotification) {
        if self.json {
            print_event(&json!({
                "event": "notification",
                "title": notification.title,
                "body": notification.body,
                "url": notification.url,
            }));
            return;
        }

        println!(
            "\x07{} {}: {}",
            "★".yellow().bold(),
            notification.title.bold(),
            notification.body
        );
        println!("    {}", notification.url.dimmed());
    }
}

/// One JSON document per line, so the stream can be consumed incrementally.
fn print_event<T: Serialize>(event: &T) {
    match serde_json::to_string(event) {
        Ok(line) => output::essential(&line),
        Err(e) => tracing::warn!(error = %e, "could not encode event"),
    }
}

type TerminalScheduler = PollScheduler<GitHubClient, TerminalNotifier, TerminalRenderer>;

/// Run the watch command.
pub fn run(json: bool, no_notify: bool) -> Result<()> {
    let (config, state) = utils::load()?;
    let notify = config.notifications.enabled && !no_notify;

    if !json {
        output::info("Watching for review requests (Ctrl+C to stop)...");
    }

    utils::runtime()?.block_on(async {
        let mut token = state.require_token()?;
        let mut repositories = state.repositories()?;
        let mut scheduler = start_scheduler(&config, &token, &repositories, json, notify)?;

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut session_check = tokio::time::interval(SESSION_CHECK_PERIOD);

        loop {
            tokio::select! {
                result = &mut ctrl_c => {
                    result.context("Failed to listen for Ctrl+C")?;
                    break;
                }
                _ = session_check.tick() => {
                    match read_session(&state, &token, &repositories) {
                        SessionChange::Unchanged => {}
                        SessionChange::Repositories(current) => {
                            tracing::info!(count = current.len(), "watched repositories changed");
                            scheduler.set_repositories(current.clone());
                            repositories = current;
                            scheduler.refresh();
                        }
                        SessionChange::Reauthenticated { token: fresh, repositories: current } => {
                            tracing::info!("stored token changed; restarting the scheduler");
                            scheduler.stop();
                            if !json {
                                output::info("Signed in again - watching the new account");
                            }
                            scheduler = start_scheduler(&config, &fresh, &current, json, notify)?;
                            token = fresh;
                            repositories = current;
                        }
                        SessionChange::SignedOut => {
                            output::warn("Logged out - stopping");
                            break;
                        }
                    }
                }
            }
        }

        scheduler.stop();
        Ok::<_, anyhow::Error>(())
    })
}

/// Build a scheduler for `token` and start polling.
fn start_scheduler(
    config: &Config,
    token: &AccessToken,
    repositories: &[RepoName],
    json: bool,
    notify: bool,
) -> Result<TerminalScheduler> {
    let client = GitHubClient::with_base_url(token, &config.github.api_url)
        .context("Failed to create GitHub client")?;

    let scheduler = PollScheduler::new(
        ReviewQueryEngine::new(client),
        TerminalNotifier { json },
        TerminalRenderer { json },
    );
    scheduler.set_repositories(repositories.to_vec());
    scheduler.set_notifications_enabled(notify);
    scheduler.start();
    Ok(scheduler)
}

/// Difference between the session file and what the scheduler runs on.
#[derive(Debug, PartialEq, Eq)]
enum SessionChange {
    Unchanged,
    Repositories(Vec<RepoName>),
    /// Another `nag login` replaced the token.
    Reauthenticated {
        token: AccessToken,
        repositories: Vec<RepoName>,
    },
    SignedOut,
}

/// Pick up changes made by other `nag` invocations.
///
/// Unreadable session data keeps the scheduler as it is.
fn read_session(state: &State, token: &AccessToken, repositories: &[RepoName]) -> SessionChange {
    let stored = state
        .token()
        .and_then(|token| state.repositories().map(|repositories| (token, repositories)));

    match stored {
        Ok((stored_token, stored_repositories)) => session_change(
            token,
            repositories,
            stored_token,
            stored_repositories,
        ),
        Err(e) => {
            tracing::warn!(error = %e, "could not re-read session");
            SessionChange::Unchanged
        }
    }
}

fn session_change(
    token: &AccessToken,
    repositories: &[RepoName],
    stored_token: Option<AccessToken>,
    stored_repositories: Vec<RepoName>,
) -> SessionChange {
    match stored_token {
        None => SessionChange::SignedOut,
        Some(stored) if stored != *token => SessionChange::Reauthenticated {
            token: stored,
            repositories: stored_repositories,
        },
        Some(_) if stored_repositories != repositories => {
            SessionChange::Repositories(stored_repositories)
        }
        Some(_) => SessionChange::Unchanged,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn repos(names: &[&str]) -> Vec<RepoName> {
        RepoName::parse_list(names).unwrap()
    }

    #[test]
    fn test_same_session_is_unchanged() {
        let token = AccessToken::new("gho_a");
        let change = session_change(
            &token,
            &repos(&["a/x"]),
            Some(AccessToken::new("gho_a")),
            repos(&["a/x"]),
        );
        assert_eq!(change, SessionChange::Unchanged);
    }

    #[test]
    fn test_repository_edit_is_picked_up() {
        let token = AccessToken::new("gho_a");
        let change = session_change(
            &token,
            &repos(&["a/x"]),
            Some(AccessToken::new("gho_a")),
            repos(&["a/x", "b/y"]),
        );
        assert_eq!(change, SessionChange::Repositories(repos(&["a/x", "b/y"])));
    }

    #[test]
    fn test_missing_token_is_signed_out() {
        let token = AccessToken::new("gho_a");
        let change = session_change(&token, &[], None, Vec::new());
        assert_eq!(change, SessionChange::SignedOut);
    }

    #[test]
    fn test_new_token_is_reauthentication() {
        // logout + login as someone else between two checks
        let token = AccessToken::new("gho_a");
        let change = session_change(
            &token,
            &repos(&["a/x"]),
            Some(AccessToken::new("gho_b")),
            repos(&["a/x"]),
        );
        assert_eq!(
            change,
            SessionChange::Reauthenticated {
                token: AccessToken::new("gho_b"),
                repositories: repos(&["a/x"]),
            }
        );
    }

    #[test]
    fn test_read_session_from_disk() {
        let temp = tempfile::TempDir::new().unwrap();
        let state = State::new(temp.path());
        let token = AccessToken::new("gho_a");

        assert_eq!(read_session(&state, &token, &[]), SessionChange::SignedOut);

        state.save_token(&AccessToken::new("gho_b")).unwrap();
        assert!(matches!(
            read_session(&state, &token, &[]),
            SessionChange::Reauthenticated { .. }
        ));

        state.save_token(&token).unwrap();
        assert_eq!(read_session(&state, &token, &[]), SessionChange::Unchanged);
    }
}
