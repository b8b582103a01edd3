//! 쿼리 변환 백엔드 -- 규칙을 대상 플랫폼 쿼리 언어로 번역하는 경계
//!
//! [`QueryBackend`]는 외부 변환 엔진과의 통합 지점입니다.
//! 파이프라인은 이 trait의 계약만 소비하며 번역 알고리즘에는 관여하지 않습니다.
//!
//! # 실패 분류
//! 백엔드 실패는 [`BackendError`]로 분류됩니다. 이 중 조건식 에러와
//! 미지원 기능 에러만 규칙 단위로 복구 가능한 것으로 취급되고,
//! 나머지는 통합 문제로 보고 배치 전체를 중단시킵니다
//! ([`ConversionAdapter`] 참고).
//!
//! [`ConversionAdapter`]: crate::convert::ConversionAdapter

pub mod splunk;

pub use splunk::{NormalizationPipeline, SplunkBackend};

use crate::rule::SigmaRule;

/// 쿼리 변환 백엔드 계약
///
/// 구현체는 실행당 한 번 구성되며(정규화 파이프라인 포함),
/// 규칙마다 재구성되지 않습니다.
pub trait QueryBackend {
    /// 백엔드 식별자 (로그에 표시)
    fn name(&self) -> &'static str;

    /// 규칙의 탐지 로직을 하나 이상의 동등한 쿼리 렌더링으로 변환합니다.
    ///
    /// 반환 벡터는 비어 있지 않아야 합니다. 호출 측은 계약상
    /// 첫 번째 렌더링만 사용합니다.
    fn convert(&self, rule: &SigmaRule) -> Result<Vec<String>, BackendError>;
}

/// 백엔드 실패 분류
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// 조건식 에러 (잘못된 문법, 존재하지 않는 셀렉션 참조 등)
    #[error("condition error: {reason}")]
    Condition {
        /// 실패 사유
        reason: String,
    },

    /// 백엔드가 지원하지 않는 규칙 기능
    #[error("unsupported feature: {feature}")]
    Unsupported {
        /// 지원하지 않는 기능 설명
        feature: String,
    },

    /// 그 외 내부 실패 (복구 대상이 아님)
    #[error("internal backend error: {0}")]
    Internal(String),
}
