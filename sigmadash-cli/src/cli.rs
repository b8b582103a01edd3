//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Sigmadash -- Sigma detection rules to Splunk dashboard converter.
///
/// Use `sigmadash <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "sigmadash", version, about, long_about = None)]
pub struct Cli {
    /// Path to the sigmadash.toml configuration file.
    #[arg(short, long, default_value = "sigmadash.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert the rule directory into a dashboard XML document.
    Generate(GenerateArgs),

    /// Inspect detection rules without generating a dashboard.
    Rules(RulesArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- generate ----

/// Generate the dashboard XML from the configured rule directory.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Override the rule directory from the config file.
    #[arg(long)]
    pub rule_dir: Option<PathBuf>,

    /// Override the output file path from the config file.
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

// ---- rules ----

/// Inspect detection rules.
#[derive(Args, Debug)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub action: RulesAction,
}

#[derive(Subcommand, Debug)]
pub enum RulesAction {
    /// Parse and classify every rule file, reporting per-file problems.
    Validate {
        /// Directory containing YAML rule files (default: rule_dir from config).
        path: Option<PathBuf>,
    },
}

// ---- config ----

/// Manage sigmadash configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, dashboard).
        #[arg(long)]
        section: Option<String>,
    },
}
