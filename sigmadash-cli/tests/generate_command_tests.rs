//! Integration tests for the `sigmadash generate` flow.
//!
//! Exercises config loading and the dashboard pipeline with real files,
//! the same path the CLI handler drives.

use std::fs;
use tempfile::TempDir;

use sigmadash_core::config::SigmadashConfig;
use sigmadash_dashboard::DashboardPipeline;

#[tokio::test]
async fn test_generate_from_config_file() {
    // Given: a config file pointing at a rule directory
    let temp_dir = TempDir::new().expect("should create temp dir");
    let rules_dir = temp_dir.path().join("rules");
    fs::create_dir(&rules_dir).expect("should create rules dir");
    let output_path = temp_dir.path().join("dashboard.xml");
    let config_path = temp_dir.path().join("sigmadash.toml");

    fs::write(
        rules_dir.join("whoami.yml"),
        r#"
title: Whoami Execution
logsource:
  category: process_creation
detection:
  selection:
    Image|endswith: '\whoami.exe'
  condition: selection
"#,
    )
    .expect("should write rule");

    fs::write(
        &config_path,
        format!(
            r#"
[general]
log_level = "info"
log_format = "pretty"

[dashboard]
rule_dir = "{}"
output_path = "{}"
title = "CLI Test Dashboard"
"#,
            rules_dir.display(),
            output_path.display()
        ),
    )
    .expect("should write config");

    // When: loading the config and running the pipeline
    let config = SigmadashConfig::load(&config_path)
        .await
        .expect("valid config should load");
    let stats = DashboardPipeline::with_splunk_backend(config.dashboard)
        .run()
        .await
        .expect("pipeline should succeed");

    // Then: the dashboard exists and the rule converted
    assert_eq!(stats.total, 1);
    assert_eq!(stats.converted, 1);
    let xml = fs::read_to_string(&output_path).expect("output should exist");
    assert!(xml.contains("<label>CLI Test Dashboard</label>"));
}

#[tokio::test]
async fn test_generate_missing_config_file() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("missing.toml");

    let result = SigmadashConfig::load(&config_path).await;
    assert!(result.is_err(), "missing config file should fail to load");
}

#[tokio::test]
async fn test_generate_missing_rule_directory_fails() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = sigmadash_core::config::DashboardConfig {
        rule_dir: temp_dir.path().join("no_rules").display().to_string(),
        output_path: temp_dir.path().join("dashboard.xml").display().to_string(),
        ..Default::default()
    };

    let result = DashboardPipeline::with_splunk_backend(config).run().await;
    assert!(result.is_err(), "missing rule directory should be fatal");
}
