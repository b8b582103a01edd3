//! Sigma 규칙 데이터 타입
//!
//! YAML 규칙 파일에서 역직렬화되는 구조체들을 정의합니다.
//! 파싱 이후 규칙은 불변이며, 파이프라인 한 번의 실행 동안만 소유됩니다.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// Sigma 탐지 규칙 -- 하나의 YAML 규칙 파일에 대응합니다.
///
/// # YAML 스키마
/// ```yaml
/// title: Suspicious Whoami Execution
/// id: e28a5a99-da44-436d-b7a0-2afc20a5f413
/// status: test
/// level: medium
/// logsource:
///   category: process_creation
///   product: windows
/// detection:
///   selection:
///     Image|endswith: '\whoami.exe'
///   condition: selection
/// tags:
///   - attack.discovery
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigmaRule {
    /// 규칙 제목 (패널 제목에 표시)
    pub title: String,
    /// 규칙 고유 ID (UUID 문자열, 선택)
    #[serde(default)]
    pub id: String,
    /// 규칙 설명
    #[serde(default)]
    pub description: String,
    /// 규칙 상태
    #[serde(default)]
    pub status: RuleStatus,
    /// 심각도 수준
    #[serde(default)]
    pub level: RuleLevel,
    /// 로그 소스 분류
    #[serde(default)]
    pub logsource: LogSource,
    /// 탐지 로직 (셀렉션 + 조건식)
    pub detection: Detection,
    /// 분류 태그
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SigmaRule {
    /// 규칙의 유효성을 검증합니다.
    ///
    /// 변환 가능 여부(조건식이 셀렉션을 올바르게 참조하는지 등)는
    /// 여기서 검사하지 않습니다. 그 실패는 변환 단계에서 규칙 단위로 복구됩니다.
    pub fn validate(&self, name: &str) -> Result<(), DashboardError> {
        if self.title.is_empty() {
            return Err(DashboardError::RuleValidation {
                rule: name.to_owned(),
                reason: "rule title must not be empty".to_owned(),
            });
        }

        if self.detection.condition.is_empty() {
            return Err(DashboardError::RuleValidation {
                rule: name.to_owned(),
                reason: "detection condition must not be empty".to_owned(),
            });
        }

        Ok(())
    }
}

/// 규칙 상태
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    /// 안정화된 규칙
    Stable,
    /// 테스트 단계
    Test,
    /// 실험 단계 (기본값)
    #[default]
    Experimental,
    /// 더 이상 유지되지 않음 (변환은 계속 수행)
    Deprecated,
    /// 유지 불가 판정 (변환은 계속 수행)
    Unsupported,
}

/// 심각도 수준
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleLevel {
    /// 정보성
    Informational,
    /// 낮음
    Low,
    /// 중간 (기본값)
    #[default]
    Medium,
    /// 높음
    High,
    /// 치명적
    Critical,
}

/// 로그 소스 분류 디스크립터
///
/// `category`와 `service`는 상호 배타적으로 쓰이는 것이 관례이며,
/// 분류기는 `category`를 우선합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogSource {
    /// 이벤트 카테고리 (예: process_creation)
    #[serde(default)]
    pub category: Option<String>,
    /// 제품명 (예: windows)
    #[serde(default)]
    pub product: Option<String>,
    /// 로그 채널/서비스명 (예: security)
    #[serde(default)]
    pub service: Option<String>,
}

/// 탐지 로직 -- 이름 붙은 셀렉션들과 이를 결합하는 조건식
///
/// 셀렉션은 `BTreeMap`으로 보관하여 변환 출력이 결정적이 되도록 합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    /// 셀렉션 결합 조건식 (예: `selection and not filter`)
    pub condition: String,
    /// 이름 붙은 셀렉션 (필드 매칭 블록)
    #[serde(flatten)]
    pub selections: BTreeMap<String, serde_yaml::Value>,
}

/// 규칙 분류 -- 로그 소스의 어느 필드가 채워져 있는지에 따른 구분
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleCategory {
    /// logsource.category 기반 규칙
    DerivedCategory,
    /// logsource.service 기반 규칙
    DerivedService,
    /// 둘 다 없음 (데이터 품질 경고, 치명적이지 않음)
    Unclassified,
}

impl RuleCategory {
    /// 문서와 로그에 쓰이는 고정 문자열 표현을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DerivedCategory => "derived-category",
            Self::DerivedService => "derived-service",
            Self::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 파싱된 규칙과 그 출처
///
/// `name`은 파일 경로의 stem에서 유도되며 패널 제목과 로그에 쓰입니다.
#[derive(Debug, Clone)]
pub struct RuleFile {
    /// 규칙 이름 (파일 stem)
    pub name: String,
    /// 규칙 파일 경로
    pub path: PathBuf,
    /// 파싱된 규칙
    pub rule: SigmaRule,
}
