//! 시맨틱 백엔드 에러 타입
//!
//! [`SemanticError`]는 원격 분석 요청의 전 구간(키 로딩, HTTP 전송,
//! 응답 파싱)에서 발생하는 에러를 나타냅니다. 파일 단위 에러는
//! 형제 작업에 전파되지 않고 실패 카운터에만 반영됩니다.

/// 시맨틱 백엔드 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum SemanticError {
    /// API 키 환경변수가 비어 있거나 설정되지 않음
    #[error("api key env var '{env}' is not set")]
    MissingApiKey {
        /// 키를 담아야 할 환경변수 이름
        env: String,
    },

    /// HTTP 전송 실패 (연결, TLS, 타임아웃 등)
    #[error("http request failed: {0}")]
    Http(String),

    /// API가 비정상 상태 코드를 반환
    #[error("api error: status {status}: {body}")]
    Api {
        /// HTTP 상태 코드
        status: u16,
        /// 응답 본문 요약
        body: String,
    },

    /// 모델 응답을 구조화된 결과로 파싱 실패
    #[error("response parse error: {0}")]
    ResponseParse(String),

    /// 요청 시간 상한 초과
    #[error("request timed out after {secs}s")]
    Timeout {
        /// 적용된 타임아웃 (초)
        secs: u64,
    },

    /// 분석 대상 파일 읽기 실패
    #[error("file read error: {path}: {reason}")]
    FileRead {
        /// 대상 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },
}

impl From<reqwest::Error> for SemanticError {
    fn from(e: reqwest::Error) -> Self {
        SemanticError::Http(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_message_names_the_env_var() {
        let err = SemanticError::MissingApiKey {
            env: "OPENAI_API_KEY".to_owned(),
        };
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn timeout_message_carries_duration() {
        let err = SemanticError::Timeout { secs: 120 };
        assert_eq!(err.to_string(), "request timed out after 120s");
    }
}
