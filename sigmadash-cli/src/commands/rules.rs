//! `sigmadash rules` command handler

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use sigmadash_core::config::SigmadashConfig;
use sigmadash_dashboard::rule::RuleLoader;
use sigmadash_dashboard::{RuleCategory, classify};

use crate::cli::{RulesAction, RulesArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `rules` command.
pub async fn execute(
    args: RulesArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        RulesAction::Validate { path } => execute_validate(path, config_path, writer).await,
    }
}

/// Execute the rules validate subcommand.
///
/// Parses every YAML file in the rule directory and reports per-file
/// problems without generating a dashboard. The rule directory comes
/// from the positional argument, falling back to the config file.
///
/// # Errors
///
/// Returns `CliError::Rule` if the directory is missing or any rule
/// file fails to parse or validate.
async fn execute_validate(
    path: Option<PathBuf>,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let rule_dir = match path {
        Some(p) => p,
        None => {
            let config = SigmadashConfig::load(config_path).await?;
            PathBuf::from(config.dashboard.rule_dir)
        }
    };

    info!(path = %rule_dir.display(), "validating detection rules");

    if !rule_dir.is_dir() {
        return Err(CliError::Rule(format!(
            "no such directory: {}",
            rule_dir.display()
        )));
    }

    let paths = RuleLoader::discover(&rule_dir);
    let mut valid = 0usize;
    let mut unclassified = 0usize;
    let mut errors = Vec::new();

    for file_path in &paths {
        match RuleLoader::load_file(file_path).await {
            Ok(file) => {
                valid += 1;
                if classify(&file) == RuleCategory::Unclassified {
                    unclassified += 1;
                }
            }
            Err(e) => errors.push(RuleError {
                file: file_path.display().to_string(),
                error: e.to_string(),
            }),
        }
    }

    let report = RuleValidationReport {
        path: rule_dir.display().to_string(),
        total_files: paths.len(),
        valid,
        invalid: errors.len(),
        unclassified,
        errors,
    };
    let invalid = report.invalid;

    writer.render(&report)?;

    if invalid > 0 {
        return Err(CliError::Rule(format!("{} invalid rules", invalid)));
    }

    Ok(())
}

#[derive(Serialize)]
pub struct RuleValidationReport {
    pub path: String,
    pub total_files: usize,
    pub valid: usize,
    pub invalid: usize,
    pub unclassified: usize,
    pub errors: Vec<RuleError>,
}

#[derive(Serialize)]
pub struct RuleError {
    pub file: String,
    pub error: String,
}

impl Render for RuleValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Rule Validation: {}", self.path.bold())?;
        writeln!(
            w,
            "  Files: {} total, {} valid, {} invalid",
            self.total_files,
            self.valid.to_string().green(),
            if self.invalid > 0 {
                self.invalid.to_string().red()
            } else {
                self.invalid.to_string().normal()
            }
        )?;
        if self.unclassified > 0 {
            writeln!(
                w,
                "  {} rule(s) have neither logsource category nor service",
                self.unclassified.to_string().yellow()
            )?;
        }

        if !self.errors.is_empty() {
            writeln!(w)?;
            writeln!(w, "Errors:")?;
            for e in &self.errors {
                writeln!(w, "  {}: {}", e.file.red(), e.error)?;
            }
        }

        Ok(())
    }
}
