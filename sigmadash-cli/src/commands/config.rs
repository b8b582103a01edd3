//! `sigmadash config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use sigmadash_core::config::SigmadashConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Execute the config validate subcommand.
///
/// Attempts to load and validate the configuration file, reporting any errors.
///
/// # Errors
///
/// Returns `CliError::Config` if validation fails (missing fields, invalid values, parse errors).
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let result = SigmadashConfig::load(config_path).await;

    let report = match result {
        Ok(_) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Execute the config show subcommand.
///
/// Loads and displays the effective configuration (file + env overrides + defaults).
///
/// # Errors
///
/// Returns `CliError::Config` if loading fails or `CliError::Command` if section name is invalid.
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let config = SigmadashConfig::load(config_path).await?;

    let report = if let Some(section_name) = section {
        match section_name.as_str() {
            "general" => ConfigReport {
                source: config_path.display().to_string(),
                section: Some("general".to_owned()),
                config_toml: toml::to_string_pretty(&config.general)
                    .unwrap_or_else(|e| format!("(serialization error: {})", e)),
            },
            "dashboard" => ConfigReport {
                source: config_path.display().to_string(),
                section: Some("dashboard".to_owned()),
                config_toml: toml::to_string_pretty(&config.dashboard)
                    .unwrap_or_else(|e| format!("(serialization error: {})", e)),
            },
            _ => {
                return Err(CliError::Command(format!(
                    "unknown section: {} (expected: general, dashboard)",
                    section_name
                )));
            }
        }
    } else {
        ConfigReport {
            source: config_path.display().to_string(),
            section: None,
            config_toml: toml::to_string_pretty(&config)
                .unwrap_or_else(|e| format!("(serialization error: {})", e)),
        }
    };

    writer.render(&report)?;

    Ok(())
}

#[derive(Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.valid {
            writeln!(w, "{} {}", "✓".green(), self.source)?;
        } else {
            writeln!(w, "{} {}", "✗".red(), self.source)?;
            for e in &self.errors {
                writeln!(w, "  {}", e)?;
            }
        }
        Ok(())
    }
}

#[derive(Serialize)]
pub struct ConfigReport {
    pub source: String,
    pub section: Option<String>,
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        match &self.section {
            Some(s) => writeln!(w, "# {} [{}]", self.source.bold(), s)?,
            None => writeln!(w, "# {}", self.source.bold())?,
        }
        writeln!(w)?;
        writeln!(w, "{}", self.config_toml)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_report_valid_rendering() {
        let report = ConfigValidationReport {
            source: "sigmadash.toml".to_owned(),
            valid: true,
            errors: Vec::new(),
        };

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("sigmadash.toml"));
    }

    #[test]
    fn test_validation_report_invalid_rendering() {
        let report = ConfigValidationReport {
            source: "sigmadash.toml".to_owned(),
            valid: false,
            errors: vec!["invalid log level: verbose".to_owned()],
        };

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("invalid log level"));
    }

    #[test]
    fn test_config_report_section_header() {
        let report = ConfigReport {
            source: "sigmadash.toml".to_owned(),
            section: Some("dashboard".to_owned()),
            config_toml: "rule_dir = \"rules\"\n".to_owned(),
        };

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("[dashboard]"));
        assert!(output.contains("rule_dir"));
    }

    #[test]
    fn test_config_report_json_shape() {
        let report = ConfigReport {
            source: "sigmadash.toml".to_owned(),
            section: None,
            config_toml: "title = \"x\"\n".to_owned(),
        };

        let json = serde_json::to_string(&report).expect("serialization should succeed");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");

        assert!(parsed["section"].is_null());
        assert_eq!(parsed["source"].as_str(), Some("sigmadash.toml"));
    }
}
