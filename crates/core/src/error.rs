//! 에러 타입 — 도메인별 에러 정의
//!
//! [`OmniscanError`]는 크레이트 경계를 넘는 최상위 에러 타입입니다.
//! 개별 백엔드의 실행 실패는 에러로 전파되지 않고
//! [`BackendStatus`](crate::types::BackendStatus)로 기록됩니다.
//! 여기에 정의된 에러는 스캔 전체를 중단시키는 조건에만 해당합니다.

/// Omniscan 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum OmniscanError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 스캔 대상 디렉토리를 찾을 수 없거나 읽을 수 없음
    ///
    /// 어댑터 실행 전에 검사되는 유일한 스캔 수준 실패입니다.
    #[error("target directory not usable: {path}: {reason}")]
    TargetNotFound {
        /// 대상 경로
        path: String,
        /// 사유
        reason: String,
    },

    /// 레지스트리 에러 (중복 등록 등)
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound {
        /// 파일 경로
        path: String,
    },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed {
        /// 실패 사유
        reason: String,
    },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue {
        /// 필드명
        field: String,
        /// 사유
        reason: String,
    },
}

/// 레지스트리 에러
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// 동일한 이름의 백엔드가 이미 등록됨
    #[error("backend already registered: {name}")]
    AlreadyRegistered {
        /// 백엔드 이름
        name: String,
    },
}
