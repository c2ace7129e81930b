//! # omniscan-backends
//!
//! 프로세스 기반 스캐너 어댑터 모음입니다. 각 어댑터는 외부 도구를
//! 한 번 실행하고 네이티브 출력을 정규화된 이슈로 변환합니다.
//!
//! ## 어댑터 목록
//! - [`bandit::BanditBackend`]: Python SAST (JSON)
//! - [`eslint::EslintBackend`]: JS/TS 린트 (JSON, 정수 심각도)
//! - [`deadcode::DeadcodeBackend`]: 미사용 코드 (vulture, 텍스트)
//! - [`npm_audit::NpmAuditBackend`]: 의존성 취약점 (npm audit, JSON)
//!
//! 모든 어댑터는 블로킹 I/O를 수행하므로 오케스트레이터가
//! `spawn_blocking` 안에서 호출합니다. 출력 파싱은 어댑터마다 분리된
//! 순수 함수(`parse_output`)로, 도구 없이 단위 테스트가 가능합니다.

use std::sync::Arc;

use omniscan_core::{BackendRegistry, RegistryError};

pub mod bandit;
pub mod deadcode;
pub mod error;
pub mod eslint;
pub mod exec;
pub mod norm;
pub mod npm_audit;

pub use bandit::BanditBackend;
pub use deadcode::DeadcodeBackend;
pub use error::BackendError;
pub use eslint::EslintBackend;
pub use npm_audit::NpmAuditBackend;

/// 기본 프로세스 백엔드 네 종을 레지스트리에 등록합니다.
pub fn register_defaults(registry: &mut BackendRegistry) -> Result<(), RegistryError> {
    registry.register(Arc::new(BanditBackend::new()))?;
    registry.register(Arc::new(EslintBackend::new()))?;
    registry.register(Arc::new(DeadcodeBackend::new()))?;
    registry.register(Arc::new(NpmAuditBackend::new()))?;
    Ok(())
}
