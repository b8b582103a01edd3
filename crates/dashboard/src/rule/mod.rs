//! Sigma 규칙 모듈 -- 로딩 및 로그 소스 분류
//!
//! # 모듈 구성
//! - [`loader`]: YAML 파일 로딩 및 결정적 순회 (전체 경로 사전순)
//! - [`types`]: 규칙 데이터 구조 정의
//! - [`classify`]: 규칙을 로그 소스 기준으로 분류
//!
//! # 분류 정책
//! `logsource.category`가 있으면 `derived-category`, 없고 `logsource.service`가
//! 있으면 `derived-service`, 둘 다 없으면 `unclassified`입니다.
//! `unclassified`는 데이터 품질 경고일 뿐 치명적이지 않으며,
//! 해당 규칙도 변환 단계로 그대로 진행합니다.

pub mod loader;
pub mod types;

pub use loader::RuleLoader;
pub use types::{
    Detection, LogSource, RuleCategory, RuleFile, RuleLevel, RuleStatus, SigmaRule,
};

/// 규칙을 로그 소스 기준으로 분류합니다.
///
/// 전체 함수이며 항상 세 분류 중 정확히 하나를 반환합니다.
/// `category` 필드가 `service`보다 우선합니다.
/// 분류 불가 규칙에는 경고 로그를 남기지만 배치는 계속됩니다.
pub fn classify(file: &RuleFile) -> RuleCategory {
    let category = RuleCategory::from_logsource(&file.rule.logsource);
    if category == RuleCategory::Unclassified {
        tracing::warn!(
            rule = %file.name,
            path = %file.path.display(),
            "rule has neither logsource category nor service"
        );
    }
    category
}

impl RuleCategory {
    /// 로그 소스 디스크립터만으로 분류를 계산합니다. 순수 함수입니다.
    pub fn from_logsource(logsource: &LogSource) -> Self {
        let populated = |field: &Option<String>| field.as_deref().is_some_and(|v| !v.is_empty());

        if populated(&logsource.category) {
            Self::DerivedCategory
        } else if populated(&logsource.service) {
            Self::DerivedService
        } else {
            Self::Unclassified
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logsource(category: Option<&str>, service: Option<&str>) -> LogSource {
        LogSource {
            category: category.map(str::to_owned),
            product: Some("windows".to_owned()),
            service: service.map(str::to_owned),
        }
    }

    #[test]
    fn category_field_wins() {
        let ls = logsource(Some("process_creation"), None);
        assert_eq!(
            RuleCategory::from_logsource(&ls),
            RuleCategory::DerivedCategory
        );
    }

    #[test]
    fn service_field_when_no_category() {
        let ls = logsource(None, Some("security"));
        assert_eq!(
            RuleCategory::from_logsource(&ls),
            RuleCategory::DerivedService
        );
    }

    #[test]
    fn category_takes_precedence_over_service() {
        let ls = logsource(Some("process_creation"), Some("sysmon"));
        assert_eq!(
            RuleCategory::from_logsource(&ls),
            RuleCategory::DerivedCategory
        );
    }

    #[test]
    fn neither_field_is_unclassified() {
        let ls = logsource(None, None);
        assert_eq!(
            RuleCategory::from_logsource(&ls),
            RuleCategory::Unclassified
        );
    }

    #[test]
    fn empty_string_counts_as_absent() {
        let ls = logsource(Some(""), Some(""));
        assert_eq!(
            RuleCategory::from_logsource(&ls),
            RuleCategory::Unclassified
        );
    }
}
