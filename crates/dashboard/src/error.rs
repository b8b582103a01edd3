//! 대시보드 파이프라인 에러 타입
//!
//! [`DashboardError`]는 대시보드 생성 파이프라인 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<DashboardError> for SigmadashError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! 규칙 단위로 복구되는 변환 실패([`ConversionOutcome::Failed`])는 에러가 아니라
//! 값으로 표현되므로 이 타입에 포함되지 않습니다.
//!
//! [`ConversionOutcome::Failed`]: crate::convert::ConversionOutcome

use sigmadash_core::error::{PipelineError, SigmadashError};

/// 대시보드 파이프라인 도메인 에러
///
/// 규칙 로딩, 백엔드 연동, 문서 직렬화 등 배치 전체를 중단시키는
/// 에러 상황을 포괄합니다.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// 규칙 디렉토리가 없거나 디렉토리가 아님 (실행 시작 전 치명적)
    #[error("rule source error: {path}: {reason}")]
    RuleSource {
        /// 규칙 디렉토리 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 규칙 파일 파싱 실패
    #[error("rule parse error: {path}: {reason}")]
    RuleParse {
        /// 규칙 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 규칙 유효성 검증 실패
    #[error("rule validation error: rule '{rule}': {reason}")]
    RuleValidation {
        /// 문제가 된 규칙 이름
        rule: String,
        /// 검증 실패 사유
        reason: String,
    },

    /// 변환 백엔드의 예기치 않은 실패
    ///
    /// 조건 에러와 미지원 기능 에러는 규칙 단위로 복구되지만,
    /// 그 외의 백엔드 실패는 통합 문제로 간주하고 배치를 중단합니다.
    #[error("backend failure on rule '{rule}': {reason}")]
    Backend {
        /// 변환 중이던 규칙 이름
        rule: String,
        /// 실패 사유
        reason: String,
    },

    /// 출력 문서 쓰기 실패
    #[error("failed to write dashboard: {path}: {source}")]
    Write {
        /// 출력 파일 경로
        path: String,
        /// 원인 I/O 에러
        #[source]
        source: std::io::Error,
    },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DashboardError> for SigmadashError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::Backend { .. } => {
                SigmadashError::Pipeline(PipelineError::Backend(err.to_string()))
            }
            DashboardError::Write { .. } => {
                SigmadashError::Pipeline(PipelineError::Serialize(err.to_string()))
            }
            DashboardError::Io(e) => SigmadashError::Io(e),
            _ => SigmadashError::Pipeline(PipelineError::InitFailed(err.to_string())),
        }
    }
}
