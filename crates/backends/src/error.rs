//! 프로세스 백엔드 에러 타입
//!
//! [`BackendError`]는 외부 도구 실행과 출력 파싱 중 발생하는 에러를
//! 나타냅니다. 어댑터는 이 에러를 상위로 전파하지 않고
//! [`omniscan_core::BackendReport`]의 에러 상태로 변환하여 백엔드 간
//! 실패 격리를 유지합니다.

/// 프로세스 백엔드 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// 스캐너 바이너리가 설치되어 있지 않음
    #[error("tool not found: '{tool}' is not installed or not on PATH")]
    ToolMissing {
        /// 실행하려던 바이너리 이름
        tool: String,
    },

    /// 스캐너 실행 실패 (예상 밖 종료 코드, 시그널 종료 등)
    #[error("tool execution failed: {tool}: {reason}")]
    ExecFailed {
        /// 바이너리 이름
        tool: String,
        /// 실패 사유
        reason: String,
    },

    /// 네이티브 출력 파싱 실패
    #[error("output parse error: {tool}: {reason}")]
    ParseFailed {
        /// 바이너리 이름
        tool: String,
        /// 파싱 실패 사유
        reason: String,
    },
}
