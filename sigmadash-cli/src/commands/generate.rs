//! `sigmadash generate` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use sigmadash_core::config::SigmadashConfig;
use sigmadash_dashboard::{DashboardPipeline, RunStats};

use crate::cli::GenerateArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `generate` command.
///
/// Loads the configuration, applies command-line overrides, runs the
/// conversion pipeline and writes the dashboard XML to disk.
pub async fn execute(
    args: GenerateArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = SigmadashConfig::load(config_path).await?;
    let mut dashboard_config = config.dashboard;

    if let Some(rule_dir) = args.rule_dir {
        dashboard_config.rule_dir = rule_dir.display().to_string();
    }
    if let Some(out) = args.out {
        dashboard_config.output_path = out.display().to_string();
    }

    info!(
        rule_dir = %dashboard_config.rule_dir,
        output = %dashboard_config.output_path,
        "generating dashboard"
    );

    let output_path = dashboard_config.output_path.clone();
    let rule_dir = dashboard_config.rule_dir.clone();

    let pipeline = DashboardPipeline::with_splunk_backend(dashboard_config);
    let stats = pipeline.run().await?;

    let report = GenerateReport {
        rule_dir,
        output_path,
        stats,
    };

    writer.render(&report)?;

    Ok(())
}

#[derive(Serialize)]
pub struct GenerateReport {
    pub rule_dir: String,
    pub output_path: String,
    pub stats: RunStats,
}

impl Render for GenerateReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Dashboard written to {}", self.output_path.bold())?;
        writeln!(w)?;
        writeln!(w, "  Rules loaded:    {}", self.stats.total)?;
        writeln!(
            w,
            "  Converted:       {}",
            self.stats.converted.to_string().green()
        )?;
        writeln!(
            w,
            "  Failed:          {}",
            if self.stats.failed > 0 {
                self.stats.failed.to_string().red()
            } else {
                self.stats.failed.to_string().normal()
            }
        )?;
        writeln!(w)?;
        writeln!(w, "  Converted by category:")?;
        writeln!(
            w,
            "    derived-category: {}",
            self.stats.converted_by_category.derived_category
        )?;
        writeln!(
            w,
            "    derived-service:  {}",
            self.stats.converted_by_category.derived_service
        )?;
        writeln!(
            w,
            "    unclassified:     {}",
            self.stats.converted_by_category.unclassified
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigmadash_dashboard::CategoryCounts;

    fn sample_report() -> GenerateReport {
        GenerateReport {
            rule_dir: "rules".to_owned(),
            output_path: "dashboard.xml".to_owned(),
            stats: RunStats {
                total: 3,
                converted: 2,
                failed: 1,
                classified: CategoryCounts {
                    derived_category: 2,
                    derived_service: 1,
                    unclassified: 0,
                },
                converted_by_category: CategoryCounts {
                    derived_category: 1,
                    derived_service: 1,
                    unclassified: 0,
                },
                failed_by_category: CategoryCounts {
                    derived_category: 1,
                    derived_service: 0,
                    unclassified: 0,
                },
            },
        }
    }

    #[test]
    fn test_generate_report_text_rendering() {
        let report = sample_report();
        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("dashboard.xml"));
        assert!(output.contains("Rules loaded:    3"));
        assert!(output.contains("derived-category: 1"));
    }

    #[test]
    fn test_generate_report_json_shape() {
        let report = sample_report();
        let json = serde_json::to_string(&report).expect("serialization should succeed");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");

        assert_eq!(parsed["output_path"].as_str(), Some("dashboard.xml"));
        assert_eq!(parsed["stats"]["converted"].as_u64(), Some(2));
        assert_eq!(
            parsed["stats"]["converted_by_category"]["derived_service"].as_u64(),
            Some(1)
        );
    }
}
