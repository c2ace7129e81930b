//! 설정 관리 — omniscan.toml 파싱 및 런타임 설정
//!
//! [`OmniscanConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`OMNISCAN_SEMANTIC_MODEL=gpt-4o` 형식)
//! 3. 설정 파일 (`omniscan.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), omniscan_core::error::OmniscanError> {
//! use omniscan_core::config::OmniscanConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = OmniscanConfig::load("omniscan.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = OmniscanConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, OmniscanError};

/// Omniscan 통합 설정
///
/// `omniscan.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OmniscanConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 프로세스 백엔드 설정
    #[serde(default)]
    pub process: ProcessConfig,
    /// 시맨틱 백엔드 설정
    #[serde(default)]
    pub semantic: SemanticConfig,
}

impl OmniscanConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, OmniscanError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, OmniscanError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                OmniscanError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                OmniscanError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, OmniscanError> {
        toml::from_str(toml_str).map_err(|e| {
            OmniscanError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `OMNISCAN_{SECTION}_{FIELD}`
    /// 예: `OMNISCAN_SEMANTIC_MODEL=gpt-4o`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "OMNISCAN_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "OMNISCAN_GENERAL_LOG_FORMAT");

        // Process backends
        override_csv(&mut self.process.backends, "OMNISCAN_PROCESS_BACKENDS");
        override_u64(
            &mut self.process.timeout_secs,
            "OMNISCAN_PROCESS_TIMEOUT_SECS",
        );
        override_bool(
            &mut self.process.include_raw_output,
            "OMNISCAN_PROCESS_INCLUDE_RAW_OUTPUT",
        );

        // Semantic backend
        override_bool(&mut self.semantic.enabled, "OMNISCAN_SEMANTIC_ENABLED");
        override_string(&mut self.semantic.endpoint, "OMNISCAN_SEMANTIC_ENDPOINT");
        override_string(&mut self.semantic.model, "OMNISCAN_SEMANTIC_MODEL");
        override_string(
            &mut self.semantic.api_key_env,
            "OMNISCAN_SEMANTIC_API_KEY_ENV",
        );
        override_csv(
            &mut self.semantic.file_extensions,
            "OMNISCAN_SEMANTIC_FILE_EXTENSIONS",
        );
        override_usize(&mut self.semantic.max_files, "OMNISCAN_SEMANTIC_MAX_FILES");
        override_usize(
            &mut self.semantic.max_chars_per_file,
            "OMNISCAN_SEMANTIC_MAX_CHARS_PER_FILE",
        );
        override_usize(
            &mut self.semantic.max_concurrent_requests,
            "OMNISCAN_SEMANTIC_MAX_CONCURRENT_REQUESTS",
        );
        override_u64(
            &mut self.semantic.request_timeout_secs,
            "OMNISCAN_SEMANTIC_REQUEST_TIMEOUT_SECS",
        );
        override_u64(
            &mut self.semantic.run_timeout_secs,
            "OMNISCAN_SEMANTIC_RUN_TIMEOUT_SECS",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), OmniscanError> {
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

        // 프로세스 백엔드 타임아웃 검증
        if self.process.timeout_secs == 0 || self.process.timeout_secs > MAX_PROCESS_TIMEOUT_SECS {
            return Err(ConfigError::InvalidValue {
                field: "process.timeout_secs".to_owned(),
                reason: format!("must be 1-{MAX_PROCESS_TIMEOUT_SECS}"),
            }
            .into());
        }

        // 시맨틱 백엔드 검증 (활성화 시에만)
        if self.semantic.enabled {
            if self.semantic.endpoint.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "semantic.endpoint".to_owned(),
                    reason: "endpoint must not be empty when semantic is enabled".to_owned(),
                }
                .into());
            }

            if self.semantic.api_key_env.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "semantic.api_key_env".to_owned(),
                    reason: "api_key_env must not be empty when semantic is enabled".to_owned(),
                }
                .into());
            }

            if self.semantic.max_concurrent_requests == 0
                || self.semantic.max_concurrent_requests > MAX_CONCURRENT_REQUESTS_LIMIT
            {
                return Err(ConfigError::InvalidValue {
                    field: "semantic.max_concurrent_requests".to_owned(),
                    reason: format!("must be 1-{MAX_CONCURRENT_REQUESTS_LIMIT}"),
                }
                .into());
            }

            if self.semantic.max_chars_per_file == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "semantic.max_chars_per_file".to_owned(),
                    reason: "must be greater than 0".to_owned(),
                }
                .into());
            }

            if self.semantic.file_extensions.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "semantic.file_extensions".to_owned(),
                    reason: "at least one file extension required when semantic is enabled"
                        .to_owned(),
                }
                .into());
            }

            if self.semantic.request_timeout_secs == 0
                || self.semantic.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS
            {
                return Err(ConfigError::InvalidValue {
                    field: "semantic.request_timeout_secs".to_owned(),
                    reason: format!("must be 1-{MAX_REQUEST_TIMEOUT_SECS}"),
                }
                .into());
            }

            if self.semantic.run_timeout_secs == 0
                || self.semantic.run_timeout_secs > MAX_RUN_TIMEOUT_SECS
            {
                return Err(ConfigError::InvalidValue {
                    field: "semantic.run_timeout_secs".to_owned(),
                    reason: format!("must be 1-{MAX_RUN_TIMEOUT_SECS}"),
                }
                .into());
            }
        }

        Ok(())
    }
}

/// 설정 상한값 상수
const MAX_PROCESS_TIMEOUT_SECS: u64 = 600;
const MAX_CONCURRENT_REQUESTS_LIMIT: usize = 64;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;
const MAX_RUN_TIMEOUT_SECS: u64 = 3600;

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

/// 프로세스 백엔드 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    /// 기본 실행 백엔드 목록 (비어 있으면 등록된 전체)
    pub backends: Vec<String>,
    /// 백엔드별 실행 시간 상한 (초)
    pub timeout_secs: u64,
    /// 네이티브 원본 출력을 결과에 포함할지 여부
    pub include_raw_output: bool,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            backends: Vec::new(),
            timeout_secs: 30,
            include_raw_output: false,
        }
    }
}

/// 시맨틱 백엔드 설정
///
/// 원격 API는 호출당 과금되고 속도 제한이 있으므로
/// 동시 요청 상한과 입력 크기 상한을 설정으로 강제합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// API 엔드포인트 URL
    pub endpoint: String,
    /// 사용할 모델명
    pub model: String,
    /// API 키를 담은 환경변수 이름 (키 자체를 설정에 저장하지 않음)
    pub api_key_env: String,
    /// 분석 대상 파일 확장자 허용 목록
    pub file_extensions: Vec<String>,
    /// 실행당 최대 분석 파일 수
    pub max_files: usize,
    /// 파일당 전송 문자 수 상한 (초과분은 결정적으로 잘림)
    pub max_chars_per_file: usize,
    /// 동시 진행 요청 상한 (어드미션 게이트 크기)
    pub max_concurrent_requests: usize,
    /// 요청당 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 시맨틱 실행 전체(파일 발견 + 모든 요청)의 벽시계 타임아웃 (초)
    pub run_timeout_secs: u64,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "https://api.openai.com/v1/chat/completions".to_owned(),
            model: "gpt-4o-mini".to_owned(),
            api_key_env: "OPENAI_API_KEY".to_owned(),
            file_extensions: vec![
                "py".to_owned(),
                "js".to_owned(),
                "ts".to_owned(),
                "go".to_owned(),
                "rb".to_owned(),
            ],
            max_files: 200,
            max_chars_per_file: 24_000,
            max_concurrent_requests: 4,
            request_timeout_secs: 120,
            run_timeout_secs: 300,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val.split(',').map(|s| s.trim().to_owned()).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = OmniscanConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "pretty");
        assert_eq!(config.process.timeout_secs, 30);
        assert!(!config.semantic.enabled);
        assert_eq!(config.semantic.max_concurrent_requests, 4);
    }

    #[test]
    fn default_config_passes_validation() {
        let config = OmniscanConfig::default();
        config.validate().unwrap();
    }

    #[test]
    fn parse_empty_toml_uses_defaults() {
        let config = OmniscanConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.process.timeout_secs, 30);
    }

    #[test]
    fn parse_partial_toml_merges_with_defaults() {
        let toml = r#"
[general]
log_level = "debug"

[semantic]
enabled = true
model = "gpt-4o"
"#;
        let config = OmniscanConfig::parse(toml).unwrap();
        assert_eq!(config.general.log_level, "debug");
        // log_format은 기본값 유지
        assert_eq!(config.general.log_format, "pretty");
        assert!(config.semantic.enabled);
        assert_eq!(config.semantic.model, "gpt-4o");
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[general]
log_level = "warn"
log_format = "json"

[process]
backends = ["bandit", "eslint"]
timeout_secs = 60
include_raw_output = true

[semantic]
enabled = true
endpoint = "https://llm.internal/v1/chat/completions"
model = "analyzer-large"
api_key_env = "LLM_API_KEY"
file_extensions = ["py"]
max_files = 50
max_chars_per_file = 8000
max_concurrent_requests = 2
request_timeout_secs = 90
run_timeout_secs = 600
"#;
        let config = OmniscanConfig::parse(toml).unwrap();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.process.backends, vec!["bandit", "eslint"]);
        assert!(config.process.include_raw_output);
        assert_eq!(config.semantic.max_concurrent_requests, 2);
        assert_eq!(config.semantic.file_extensions, vec!["py"]);
        assert_eq!(config.semantic.run_timeout_secs, 600);
        config.validate().unwrap();
    }

    #[test]
    fn parse_invalid_toml_returns_error() {
        let result = OmniscanConfig::parse("invalid = [[[toml");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            OmniscanError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = OmniscanConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_zero_process_timeout() {
        let mut config = OmniscanConfig::default();
        config.process.timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn validate_rejects_empty_endpoint_when_semantic_enabled() {
        let mut config = OmniscanConfig::default();
        config.semantic.enabled = true;
        config.semantic.endpoint = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("endpoint"));
    }

    #[test]
    fn validate_accepts_empty_endpoint_when_semantic_disabled() {
        let mut config = OmniscanConfig::default();
        config.semantic.enabled = false;
        config.semantic.endpoint = String::new();
        // 비활성화 상태면 시맨틱 섹션 검증을 건너뜀
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_zero_gate_size() {
        let mut config = OmniscanConfig::default();
        config.semantic.enabled = true;
        config.semantic.max_concurrent_requests = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_concurrent_requests"));
    }

    #[test]
    fn validate_rejects_zero_run_timeout() {
        let mut config = OmniscanConfig::default();
        config.semantic.enabled = true;
        config.semantic.run_timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("run_timeout_secs"));
    }

    #[test]
    #[serial]
    fn env_override_run_timeout() {
        let mut config = OmniscanConfig::default();
        // SAFETY: serial 테스트에서만 환경변수를 조작하므로 안전합니다.
        unsafe { std::env::set_var("OMNISCAN_SEMANTIC_RUN_TIMEOUT_SECS", "45") };
        config.apply_env_overrides();
        assert_eq!(config.semantic.run_timeout_secs, 45);
        unsafe { std::env::remove_var("OMNISCAN_SEMANTIC_RUN_TIMEOUT_SECS") };
    }

    #[test]
    fn validate_rejects_oversized_gate() {
        let mut config = OmniscanConfig::default();
        config.semantic.enabled = true;
        config.semantic.max_concurrent_requests = 1000;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_concurrent_requests"));
    }

    #[test]
    #[serial]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: serial 테스트에서만 환경변수를 조작하므로 안전합니다.
        unsafe { std::env::set_var("TEST_OMNISCAN_STR", "overridden") };
        override_string(&mut val, "TEST_OMNISCAN_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_OMNISCAN_STR") };
    }

    #[test]
    #[serial]
    fn env_override_bool_invalid_keeps_original() {
        let mut val = false;
        // SAFETY: serial 테스트에서만 환경변수를 조작하므로 안전합니다.
        unsafe { std::env::set_var("TEST_OMNISCAN_BOOL_BAD", "not-a-bool") };
        override_bool(&mut val, "TEST_OMNISCAN_BOOL_BAD");
        assert!(!val); // 원래 값 유지
        unsafe { std::env::remove_var("TEST_OMNISCAN_BOOL_BAD") };
    }

    #[test]
    #[serial]
    fn env_override_csv() {
        let mut val = vec!["a".to_owned()];
        // SAFETY: serial 테스트에서만 환경변수를 조작하므로 안전합니다.
        unsafe { std::env::set_var("TEST_OMNISCAN_CSV", "py, js, ts") };
        override_csv(&mut val, "TEST_OMNISCAN_CSV");
        assert_eq!(val, vec!["py", "js", "ts"]);
        unsafe { std::env::remove_var("TEST_OMNISCAN_CSV") };
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = "original".to_owned();
        override_string(&mut val, "TEST_OMNISCAN_NONEXISTENT_12345");
        assert_eq!(val, "original");
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = OmniscanConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = OmniscanConfig::parse(&toml_str).unwrap();
        assert_eq!(config.general.log_level, parsed.general.log_level);
        assert_eq!(config.process.timeout_secs, parsed.process.timeout_secs);
        assert_eq!(config.semantic.model, parsed.semantic.model);
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let result = OmniscanConfig::from_file("/nonexistent/path/omniscan.toml").await;
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            OmniscanError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
