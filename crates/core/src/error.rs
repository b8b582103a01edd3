//! 에러 타입 -- 도메인별 에러 정의

/// Sigmadash 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum SigmadashError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파이프라인 처리 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 파이프라인 처리 에러
///
/// 규칙 단위로 복구되는 변환 실패는 여기 포함되지 않습니다.
/// 이 타입은 배치 전체를 중단시키는 에러만 표현합니다.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 변환 백엔드의 예기치 않은 실패 (복구 대상이 아닌 종류)
    #[error("backend failure: {0}")]
    Backend(String),

    /// 문서 직렬화 실패
    #[error("serialize failed: {0}")]
    Serialize(String),

    /// 파이프라인 초기화 실패
    #[error("pipeline init failed: {0}")]
    InitFailed(String),
}
