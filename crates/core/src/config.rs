//! 설정 관리 -- sigmadash.toml 파싱 및 런타임 설정
//!
//! [`SigmadashConfig`]는 대시보드 생성 실행 전체의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`SIGMADASH_DASHBOARD_RULE_DIR=/sigma/rules` 형식)
//! 3. 설정 파일 (`sigmadash.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), sigmadash_core::error::SigmadashError> {
//! use sigmadash_core::config::SigmadashConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = SigmadashConfig::load("sigmadash.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = SigmadashConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, SigmadashError};

/// Sigmadash 통합 설정
///
/// `sigmadash.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SigmadashConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 대시보드 생성 설정
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl SigmadashConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SigmadashError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SigmadashError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SigmadashError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                SigmadashError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, SigmadashError> {
        toml::from_str(toml_str).map_err(|e| {
            SigmadashError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `SIGMADASH_{SECTION}_{FIELD}`
    /// 예: `SIGMADASH_DASHBOARD_RULE_DIR=/sigma/rules/windows`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "SIGMADASH_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "SIGMADASH_GENERAL_LOG_FORMAT");

        // Dashboard
        override_string(&mut self.dashboard.rule_dir, "SIGMADASH_DASHBOARD_RULE_DIR");
        override_string(
            &mut self.dashboard.prepend_query,
            "SIGMADASH_DASHBOARD_PREPEND_QUERY",
        );
        override_string(
            &mut self.dashboard.append_query,
            "SIGMADASH_DASHBOARD_APPEND_QUERY",
        );
        override_string(&mut self.dashboard.title, "SIGMADASH_DASHBOARD_TITLE");
        override_string(
            &mut self.dashboard.description,
            "SIGMADASH_DASHBOARD_DESCRIPTION",
        );
        override_string(
            &mut self.dashboard.panel_title,
            "SIGMADASH_DASHBOARD_PANEL_TITLE",
        );
        override_string(
            &mut self.dashboard.output_path,
            "SIGMADASH_DASHBOARD_OUTPUT_PATH",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), SigmadashError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.dashboard.rule_dir.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "dashboard.rule_dir".to_owned(),
                reason: "rule_dir must not be empty".to_owned(),
            }
            .into());
        }

        if self.dashboard.title.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "dashboard.title".to_owned(),
                reason: "title must not be empty".to_owned(),
            }
            .into());
        }

        if self.dashboard.output_path.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "dashboard.output_path".to_owned(),
                reason: "output_path must not be empty".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 대시보드 생성 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Sigma 규칙 디렉토리 (재귀 탐색)
    pub rule_dir: String,
    /// 모든 검색 앞에 붙는 SPL 조각 (빈 문자열 허용)
    pub prepend_query: String,
    /// 모든 검색 뒤에 붙는 SPL 조각 (빈 문자열 허용)
    pub append_query: String,
    /// 대시보드 제목
    pub title: String,
    /// 대시보드 설명
    pub description: String,
    /// 규칙 테이블이 모이는 패널 제목
    pub panel_title: String,
    /// 출력 XML 파일 경로
    pub output_path: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            rule_dir: "rules".to_owned(),
            prepend_query: "(index=* AND (sourcetype=XmlWinEventLog OR sourcetype=WinEventLog))"
                .to_owned(),
            append_query: "| bin _time span=1d \
                | stats values(index) values(sourcetype) dc(host) as UniqueHosts \
                count as TotalLogs by _time \
                | eval HITS=if(isnull(UniqueHosts), \"no\", \"YES\")"
                .to_owned(),
            title: "Sigma Detection Dashboard".to_owned(),
            description: "Conversion of Sigma rules to Splunk Search Processing Language"
                .to_owned(),
            panel_title: "Detections".to_owned(),
            output_path: "dashboard.xml".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        if val.is_empty() {
            warn!(env_key, "empty env override, ignoring");
            return;
        }
        *target = val;
    }
}
