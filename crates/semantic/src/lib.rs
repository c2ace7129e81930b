//! # omniscan-semantic
//!
//! 원격 LLM API로 파일 단위 시맨틱 분석을 수행하는 백엔드입니다.
//! 규칙 기반 스캐너가 놓치는 논리 오류와 취약 패턴을 찾습니다.
//!
//! ## 구조
//! - [`provider`]: [`provider::AnalysisProvider`] trait과 OpenAI 호환
//!   HTTP 구현
//! - [`scanner`]: 파일 팬아웃, 어드미션 게이트, 취소 처리
//! - [`schema`]: 모델 응답 JSON 스키마와 정규화
//! - [`gate`]: 동시 요청 계측 ([`gate::GateMeter`])
//! - [`backend`]: 레지스트리에 연결되는 [`backend::SemanticBackend`]
//! - [`mock`]: 테스트용 제공자
//!
//! 원격 호출은 호출당 과금과 속도 제한이 있으므로 동시 요청 상한,
//! 파일 수 상한, 파일당 입력 길이 상한을 설정으로 강제합니다.

pub mod backend;
pub mod error;
pub mod gate;
pub mod mock;
pub mod prompts;
pub mod provider;
pub mod scanner;
pub mod schema;

pub use backend::SemanticBackend;
pub use error::SemanticError;
pub use gate::GateMeter;
pub use mock::MockProvider;
pub use provider::{AnalysisProvider, AnalysisRequest, AnalysisResponse, HttpProvider};
pub use scanner::SemanticScanner;
pub use schema::SemanticFinding;
