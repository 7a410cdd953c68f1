//! Nag CLI - get nagged about pull requests waiting on your review.

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::{Cli, Commands, ReposCommand};

fn main() {
    let cli = Cli::parse();
    output::set_quiet(cli.quiet);
    init_tracing(cli.verbose);

    let json = cli.json;
    let result = match cli.command {
        Commands::Login { no_browser } => commands::login::run(json, no_browser),
        Commands::Logout { yes } => commands::logout::run(json, yes),
        Commands::Whoami { check } => commands::whoami::run(json, check),
        Commands::Repos { action } => match action {
            ReposCommand::List => commands::repos::list(json),
            ReposCommand::Add { repos } => commands::repos::add(json, &repos),
            ReposCommand::Remove { repos } => commands::repos::remove(json, &repos),
            ReposCommand::Clear => commands::repos::clear(json),
        },
        Commands::List => commands::list::run(json),
        Commands::Watch { no_notify } => commands::watch::run(json, no_notify),
        Commands::Open { target } => commands::open::run(&target),
        Commands::Doctor => commands::doctor::run(json),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    if let Err(e) = result {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
///
/// The `nag` target prefix covers `nag_cli`, `nag_core` and `nag_github`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "nag=warn",
        1 => "nag=info",
        _ => "nag=debug",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
