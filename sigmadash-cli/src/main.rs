//! sigmadash CLI entry point
//!
//! Parses arguments, initialises logging and dispatches to the
//! subcommand handlers. Errors are printed to stderr and mapped to
//! process exit codes via [`error::CliError::exit_code`].

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.log_level.as_deref());

    if let Err(e) = run(cli).await {
        eprintln!("error: {}", e);
        std::process::exit(e.exit_code());
    }
}

/// Logging goes to stderr so that text/JSON command output on stdout
/// stays machine-parseable.
fn init_logging(log_level: Option<&str>) {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Generate(args) => commands::generate::execute(args, &cli.config, &writer).await,
        Commands::Rules(args) => commands::rules::execute(args, &cli.config, &writer).await,
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
    }
}
