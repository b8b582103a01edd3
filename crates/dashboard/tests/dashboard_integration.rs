//! 규칙 디렉토리에서 최종 XML까지의 전 구간 통합 테스트

use std::fs;
use std::path::Path;

use sigmadash_core::config::DashboardConfig;
use sigmadash_dashboard::{DashboardError, DashboardPipeline};

fn write_rule(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).expect("write rule file");
}

fn seed_rules(dir: &Path) {
    write_rule(
        dir,
        "a_proc_whoami.yml",
        r#"
title: Whoami Execution
id: 11111111-1111-1111-1111-111111111111
status: test
level: medium
logsource:
  category: process_creation
  product: windows
detection:
  selection:
    Image|endswith: '\whoami.exe'
  condition: selection
"#,
    );
    write_rule(
        dir,
        "b_sec_logon.yaml",
        r#"
title: Failed Logon Burst
logsource:
  product: windows
  service: security
detection:
  selection:
    EventID: 4625
  condition: selection
"#,
    );
    write_rule(
        dir,
        "c_regex_rule.yml",
        r#"
title: Regex Based Rule
logsource:
  category: process_creation
detection:
  selection:
    CommandLine|re: '.*mimikatz.*'
  condition: selection
"#,
    );
}

fn test_config(rule_dir: &Path, output: &Path) -> DashboardConfig {
    DashboardConfig {
        rule_dir: rule_dir.display().to_string(),
        prepend_query: "index=windows".to_owned(),
        append_query: "| stats count by host".to_owned(),
        title: "Detection Coverage".to_owned(),
        description: "converted detection rules".to_owned(),
        panel_title: "Detections".to_owned(),
        output_path: output.display().to_string(),
    }
}

#[tokio::test]
async fn generates_sequentially_gated_panels() {
    let dir = tempfile::tempdir().expect("create tempdir");
    seed_rules(dir.path());
    let out = dir.path().join("dashboard.xml");

    let pipeline = DashboardPipeline::with_splunk_backend(test_config(dir.path(), &out));
    let stats = pipeline.run().await.unwrap();

    assert_eq!(stats.total, 3);
    assert_eq!(stats.converted, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.converted_by_category.derived_category, 1);
    assert_eq!(stats.converted_by_category.derived_service, 1);
    assert_eq!(stats.failed_by_category.derived_category, 1);

    let xml = fs::read_to_string(&out).expect("output exists");

    // 첫 패널은 의존 토큰이 없고 searchNum_0을 설정한다.
    assert!(xml.contains(r#"<set token="searchNum_0">done</set>"#));
    // 두 번째 패널은 첫 패널의 완료 토큰에 묶인다.
    assert!(xml.contains(r#"<search depends="$searchNum_0$">"#));
    assert!(xml.contains(r#"<set token="searchNum_1">done</set>"#));
    // 실패한 규칙은 패널이 없으므로 세 번째 토큰은 존재하지 않는다.
    assert!(!xml.contains("searchNum_2"));
    assert!(!xml.contains("Regex Based Rule"));

    // 질의는 접두사, 호스트 필터, 접미사를 모두 포함한다.
    assert!(xml.contains("index=windows host=$user_input_field_host$"));
    assert!(xml.contains("| stats count by host"));

    // 요약 통계
    assert!(xml.contains("Number of rules loaded: 3"));
    assert!(xml.contains("Number of rules failing to convert: 1"));
    assert!(xml.contains("Total number of rules converted: 2"));
    assert!(xml.contains("|---- derived-category: 1"));
    assert!(xml.contains("|---- derived-service: 1"));
    assert!(xml.contains("|---- unclassified: 0"));
}

#[tokio::test]
async fn repeated_runs_are_byte_identical() {
    let dir = tempfile::tempdir().expect("create tempdir");
    seed_rules(dir.path());
    let out = dir.path().join("dashboard.xml");

    let pipeline = DashboardPipeline::with_splunk_backend(test_config(dir.path(), &out));
    let (first, _) = pipeline.generate().await.unwrap();
    let (second, _) = pipeline.generate().await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn panels_follow_sorted_path_order() {
    let dir = tempfile::tempdir().expect("create tempdir");
    // 역순으로 기록해도 출력은 경로 정렬 순서를 따라야 한다.
    write_rule(
        dir.path(),
        "z_last.yml",
        r#"
title: Last Rule
logsource:
  service: sysmon
detection:
  selection:
    EventID: 1
  condition: selection
"#,
    );
    write_rule(
        dir.path(),
        "a_first.yml",
        r#"
title: First Rule
logsource:
  service: sysmon
detection:
  selection:
    EventID: 3
  condition: selection
"#,
    );
    let out = dir.path().join("dashboard.xml");

    let pipeline = DashboardPipeline::with_splunk_backend(test_config(dir.path(), &out));
    let (bytes, _) = pipeline.generate().await.unwrap();
    let xml = String::from_utf8(bytes).unwrap();

    let first = xml.find("First Rule").expect("first rule present");
    let last = xml.find("Last Rule").expect("last rule present");
    assert!(first < last);
}

#[tokio::test]
async fn unparsable_files_are_skipped_not_fatal() {
    let dir = tempfile::tempdir().expect("create tempdir");
    seed_rules(dir.path());
    write_rule(dir.path(), "broken.yml", ": : definitely not yaml : :");
    let out = dir.path().join("dashboard.xml");

    let pipeline = DashboardPipeline::with_splunk_backend(test_config(dir.path(), &out));
    let stats = pipeline.run().await.unwrap();

    // 파싱 불가 파일은 건너뛰므로 합계에 들어가지 않는다.
    assert_eq!(stats.total, 3);
}

#[tokio::test]
async fn missing_rule_dir_is_fatal() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let out = dir.path().join("dashboard.xml");
    let config = test_config(&dir.path().join("no_such_dir"), &out);

    let pipeline = DashboardPipeline::with_splunk_backend(config);
    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(err, DashboardError::RuleSource { .. }));
    assert!(!out.exists());
}
