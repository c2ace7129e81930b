//! # omniscan-core
//!
//! Omniscan의 공통 기반 crate입니다. 다른 모든 crate가 의존하는
//! 핵심 타입과 trait을 제공합니다.
//!
//! ## 제공 항목
//! - [`types`]: 정규화된 이슈, 백엔드 상태, 스캔 요약 등 도메인 타입
//! - [`backend`]: 프로세스/원격 백엔드 어댑터 trait
//! - [`registry`]: 이름 기반 백엔드 레지스트리
//! - [`config`]: TOML + 환경변수 기반 설정
//! - [`error`]: crate 전반의 에러 타입

pub mod backend;
pub mod config;
pub mod error;
pub mod registry;
pub mod types;

pub use backend::{BackendAdapter, BackendKind, BoxFuture, RemoteAdapter};
pub use config::{GeneralConfig, OmniscanConfig, ProcessConfig, SemanticConfig};
pub use error::{ConfigError, OmniscanError, RegistryError};
pub use registry::{BackendRegistry, RegisteredBackend, ResolvedBackends};
pub use types::{
    BackendReport, BackendStatus, Issue, Level, LevelCounts, RemoteRunStats, ScanOutcome,
    ScanSummary,
};
