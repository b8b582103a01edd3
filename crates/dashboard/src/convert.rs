//! 변환 어댑터 -- 백엔드 실패를 규칙 단위 결과로 정규화합니다.
//!
//! 외부 변환 엔진의 두 가지 예상 실패(조건식 에러, 미지원 기능)만을
//! [`ConversionOutcome::Failed`] 값으로 흡수하고, 그 외의 실패는
//! 통합 문제로 간주하여 배치 전체를 중단시킵니다.
//!
//! 예외를 제어 흐름으로 쓰는 대신 태그된 결과 타입으로 표현하므로,
//! 호출 측은 실패한 규칙을 세고 다음 규칙으로 넘어갈 수 있습니다.

use crate::backend::{BackendError, QueryBackend};
use crate::error::DashboardError;
use crate::rule::RuleFile;

/// 규칙 하나의 변환 결과
///
/// 규칙당 한 번 생성되며 이후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// 변환 성공 -- 플랫폼 쿼리 문자열
    Converted(String),
    /// 복구 가능한 변환 실패 -- 규칙은 출력에서 제외되고 배치는 계속됨
    Failed(FailureReason),
}

/// 복구 가능한 실패의 분류
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// 조건식 에러
    ConditionError(String),
    /// 백엔드 미지원 기능
    UnsupportedFeature(String),
}

impl FailureReason {
    /// 로그/통계용 고정 분류명을 반환합니다.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConditionError(_) => "condition-error",
            Self::UnsupportedFeature(_) => "unsupported-feature",
        }
    }
}

/// 변환 어댑터
///
/// 백엔드는 실행당 한 번 구성되어 모든 규칙에 재사용됩니다.
pub struct ConversionAdapter<B: QueryBackend> {
    backend: B,
}

impl<B: QueryBackend> ConversionAdapter<B> {
    /// 지정한 백엔드를 감싸는 어댑터를 생성합니다.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// 규칙 하나를 변환합니다.
    ///
    /// 백엔드가 여러 동등한 렌더링을 반환할 수 있으나 계약상 첫 번째만
    /// 사용합니다. 빈 렌더링 목록은 계약 위반이므로 치명적 에러입니다.
    ///
    /// # Errors
    /// 조건식/미지원 이외의 백엔드 실패는 [`DashboardError::Backend`]로
    /// 전파되어 배치를 중단시킵니다.
    pub fn convert(&self, file: &RuleFile) -> Result<ConversionOutcome, DashboardError> {
        match self.backend.convert(&file.rule) {
            Ok(renderings) => {
                let first = renderings.into_iter().next().ok_or_else(|| {
                    DashboardError::Backend {
                        rule: file.name.clone(),
                        reason: format!("backend '{}' returned no renderings", self.backend.name()),
                    }
                })?;
                Ok(ConversionOutcome::Converted(first))
            }
            Err(BackendError::Condition { reason }) => {
                tracing::warn!(
                    rule = %file.name,
                    path = %file.path.display(),
                    %reason,
                    "conversion failed: condition error"
                );
                Ok(ConversionOutcome::Failed(FailureReason::ConditionError(
                    reason,
                )))
            }
            Err(BackendError::Unsupported { feature }) => {
                tracing::warn!(
                    rule = %file.name,
                    path = %file.path.display(),
                    %feature,
                    "conversion failed: unsupported feature"
                );
                Ok(ConversionOutcome::Failed(FailureReason::UnsupportedFeature(
                    feature,
                )))
            }
            Err(BackendError::Internal(reason)) => Err(DashboardError::Backend {
                rule: file.name.clone(),
                reason,
            }),
        }
    }
}
