//! `nag doctor` command - Diagnose configuration, login and connectivity.

use anyhow::Result;
use colored::Colorize;
use nag_core::{Config, RepoName, State, review_query};
use nag_github::GitHubClient;
use serde::Serialize;

use super::utils;
use crate::output;

/// Diagnostic issue severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Severity {
    Error,
    Warning,
}

/// A diagnostic issue found by the doctor.
#[derive(Debug, Clone, Serialize)]
struct Issue {
    severity: Severity,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<String>,
}

/// JSON output for doctor command.
#[derive(Debug, Serialize)]
struct DoctorOutput {
    healthy: bool,
    errors: usize,
    warnings: usize,
    issues: Vec<Issue>,
}

impl Issue {
    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            suggestion: None,
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            suggestion: None,
        }
    }

    fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Collects issues and prints per-check progress in text mode.
struct Report {
    json: bool,
    issues: Vec<Issue>,
}

impl Report {
    /// Run one check, printing its name and a status mark for the issues it added.
    fn check(&mut self, label: &str, check: impl FnOnce(&mut Vec<Issue>)) {
        if !self.json {
            print!("  {label}");
        }

        let before = self.issues.len();
        check(&mut self.issues);

        if !self.json {
            print_status(&self.issues[before..]);
        }
    }

    fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }
}

/// Run the doctor command.
pub fn run(json: bool) -> Result<()> {
    let dir = Config::dir()?;
    let state = State::new(&dir);
    let mut report = Report {
        json,
        issues: Vec::new(),
    };

    if !json {
        println!();
    }

    let mut config = None;
    report.check("Checking configuration...", |issues| {
        match Config::load(&dir) {
            Ok(loaded) => config = Some(loaded),
            Err(e) => issues.push(
                Issue::error(format!("Invalid configuration: {e}")).with_suggestion(format!(
                    "Fix or remove {}",
                    Config::path(&dir).display()
                )),
            ),
        }
    });

    report.check("Checking login...", |issues| check_login(&state, issues));

    if let (Some(config), false) = (config, report.has_errors()) {
        match utils::github_client(&config, &state) {
            Ok(client) => {
                report.check("Checking GitHub...", |issues| {
                    check_github(&client, &state, issues);
                });
            }
            Err(e) => report.issues.push(Issue::error(format!("{e:#}"))),
        }
    }

    if json {
        return output_json(&report.issues);
    }

    println!();
    print_issues(&report.issues);
    print_summary(&report.issues);

    Ok(())
}

/// Output issues as JSON.
fn output_json(issues: &[Issue]) -> Result<()> {
    let (errors, warnings) = count(issues);

    output::json(&DoctorOutput {
        healthy: errors == 0 && warnings == 0,
        errors,
        warnings,
        issues: issues.to_vec(),
    })
}

fn count(issues: &[Issue]) -> (usize, usize) {
    let errors = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .count();
    (errors, issues.len() - errors)
}

fn print_status(new_issues: &[Issue]) {
    let (errors, warnings) = count(new_issues);

    if errors > 0 {
        println!(" {}", "✗".red());
    } else if warnings > 0 {
        println!(" {}", "⚠".yellow());
    } else {
        println!(" {}", "✓".green());
    }
}

fn print_issues(issues: &[Issue]) {
    if issues.is_empty() {
        return;
    }

    for issue in issues {
        let icon = match issue.severity {
            Severity::Error => "✗".red(),
            Severity::Warning => "⚠".yellow(),
        };

        println!("  {icon} {}", issue.message);

        if let Some(suggestion) = &issue.suggestion {
            println!("    {} {suggestion}", "→".dimmed());
        }
    }
    println!();
}

fn print_summary(issues: &[Issue]) {
    let (errors, warnings) = count(issues);

    if errors == 0 && warnings == 0 {
        output::success("No issues found!");
    } else {
        let summary = format!(
            "Found {} issue(s) ({} error(s), {} warning(s))",
            errors + warnings,
            errors,
            warnings
        );
        if errors > 0 {
            output::error(&summary);
        } else {
            output::warn(&summary);
        }
    }
    println!();
}

/// Check that a token is stored and the session file is readable.
fn check_login(state: &State, issues: &mut Vec<Issue>) {
    match state.token() {
        Ok(Some(_)) => {}
        Ok(None) => issues.push(Issue::error("Not logged in").with_suggestion("Run `nag login`")),
        Err(e) => issues.push(
            Issue::error(format!("Cannot read session: {e}"))
                .with_suggestion("Run `nag logout --yes` and log in again"),
        ),
    }
}

/// Check the token and every watched repository against GitHub.
fn check_github(client: &GitHubClient, state: &State, issues: &mut Vec<Issue>) {
    let Ok(rt) = utils::runtime() else {
        issues.push(Issue::error("Could not start the async runtime"));
        return;
    };

    match rt.block_on(client.current_user()) {
        Ok(login) => {
            if let Ok(Some(stored)) = state.username() {
                if stored != login {
                    issues.push(
                        Issue::warning(format!(
                            "Token belongs to '{login}' but '{stored}' is stored"
                        ))
                        .with_suggestion("Run `nag whoami --check` to update"),
                    );
                }
            }
        }
        Err(e) if e.is_rate_limited() => {
            issues.push(Issue::warning("GitHub rate limit reached").with_suggestion("Try again later"));
            return;
        }
        Err(e) if e.is_unauthorized() => {
            issues.push(
                Issue::error("GitHub rejected the stored token")
                    .with_suggestion("Run `nag login` again"),
            );
            return;
        }
        Err(nag_github::Error::HttpStatus { status, .. }) => {
            issues.push(
                Issue::error(format!("GitHub answered {status} when checking the token"))
                    .with_suggestion("Check github.api_url in config.toml"),
            );
            return;
        }
        Err(e) => {
            issues.push(Issue::error(format!("Could not reach GitHub: {e}")));
            return;
        }
    }

    let repositories = state.repositories().unwrap_or_default();
    if repositories.is_empty() {
        check_search(&rt, client, None, issues);
    }
    for repo in &repositories {
        check_search(&rt, client, Some(repo), issues);
    }
}

/// Run one review-request search and report failures.
fn check_search(
    rt: &tokio::runtime::Runtime,
    client: &GitHubClient,
    repo: Option<&RepoName>,
    issues: &mut Vec<Issue>,
) {
    let query = review_query(repo);
    if let Err(e) = rt.block_on(client.search_issues(&query)) {
        let issue = match repo {
            Some(repo) => Issue::warning(format!("Could not search {repo}: {e}"))
                .with_suggestion(format!("Check the name or run `nag repos remove {repo}`")),
            None => Issue::error(format!("Review search failed: {e}")),
        };
        issues.push(issue);
    }
}
