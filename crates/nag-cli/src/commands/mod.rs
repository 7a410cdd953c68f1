//! CLI command definitions and handlers.

use clap::{ArgAction, Parser, Subcommand};

pub mod completions;
pub mod doctor;
pub mod list;
pub mod login;
pub mod logout;
pub mod open;
pub mod repos;
pub mod watch;
pub mod whoami;
mod utils;

/// Nag - get nagged about pull requests waiting on your review.
///
/// Signs in to GitHub with the device flow, then polls for open pull
/// requests where you are a requested reviewer and tells you when new
/// ones show up.
#[derive(Parser)]
#[command(name = "nag")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output as JSON (for tooling integration).
    ///
    /// Supported by: login, logout, whoami, repos, list, watch, doctor
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress informational output.
    ///
    /// Only errors and essential results (like PR URLs) are printed.
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Log more (-v for info, -vv for debug). `RUST_LOG` overrides this.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Sign in to GitHub.
    ///
    /// Shows a one-time code and opens the GitHub device page. Enter the
    /// code there; Nag picks up the token once you approve.
    Login {
        /// Don't open the verification page in a browser.
        #[arg(long)]
        no_browser: bool,
    },

    /// Sign out and forget the monitored repositories.
    Logout {
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },

    /// Show the signed-in GitHub account.
    Whoami {
        /// Ask GitHub whether the stored token still works.
        #[arg(long)]
        check: bool,
    },

    /// Manage the repositories to watch.
    ///
    /// With no repositories configured, every repository you can access
    /// is searched.
    #[command(alias = "r")]
    Repos {
        #[command(subcommand)]
        action: ReposCommand,
    },

    /// List pull requests waiting on your review.
    #[command(alias = "ls")]
    List,

    /// Poll for review requests and announce new ones.
    ///
    /// Checks immediately, then every minute, until interrupted.
    #[command(alias = "w")]
    Watch {
        /// Show the list but don't announce new review requests.
        #[arg(long)]
        no_notify: bool,
    },

    /// Open a pull request from your review list in the browser.
    Open {
        /// `owner/name#number`, or the pull request's id.
        target: String,
    },

    /// Diagnose configuration, login and GitHub connectivity.
    #[command(alias = "doc")]
    Doctor,

    /// Generate shell completions.
    ///
    /// Outputs completion script to stdout. Redirect to a file and
    /// source it in your shell configuration.
    #[command(alias = "comp")]
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// `nag repos` subcommands.
#[derive(Subcommand)]
pub enum ReposCommand {
    /// Show the watched repositories.
    #[command(alias = "ls")]
    List,

    /// Watch more repositories.
    Add {
        /// Repositories as `owner/name`.
        #[arg(required = true)]
        repos: Vec<String>,
    },

    /// Stop watching repositories.
    #[command(alias = "rm")]
    Remove {
        /// Repositories as `owner/name`.
        #[arg(required = true)]
        repos: Vec<String>,
    },

    /// Watch every repository again.
    Clear,
}
