//! 백엔드 레지스트리
//!
//! 이름으로 백엔드를 등록하고 조회합니다. 스캔 시작 전에 모든 등록이
//! 끝나며, 스캔 중에는 불변 참조로만 사용됩니다.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::backend::{BackendAdapter, BackendKind, RemoteAdapter};
use crate::error::RegistryError;

/// 등록된 백엔드 항목
#[derive(Clone)]
pub enum RegisteredBackend {
    /// 프로세스 기반 백엔드
    Process(Arc<dyn BackendAdapter>),
    /// 원격 API 기반 백엔드
    Remote(Arc<dyn RemoteAdapter>),
}

impl RegisteredBackend {
    /// 백엔드 이름
    pub fn name(&self) -> &str {
        match self {
            RegisteredBackend::Process(b) => b.name(),
            RegisteredBackend::Remote(b) => b.name(),
        }
    }

    /// 한 줄 설명
    pub fn description(&self) -> &str {
        match self {
            RegisteredBackend::Process(b) => b.description(),
            RegisteredBackend::Remote(b) => b.description(),
        }
    }

    /// 실행 방식
    pub fn kind(&self) -> BackendKind {
        match self {
            RegisteredBackend::Process(_) => BackendKind::Process,
            RegisteredBackend::Remote(_) => BackendKind::Remote,
        }
    }
}

impl std::fmt::Debug for RegisteredBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredBackend")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .finish()
    }
}

/// 레지스트리 해석 결과
///
/// 요청된 이름 중 등록된 백엔드와, 등록되지 않아 건너뛴 이름을 분리합니다.
/// 알 수 없는 이름은 전체 스캔을 중단시키지 않고 건너뛴 것으로 기록됩니다.
#[derive(Debug)]
pub struct ResolvedBackends {
    /// 실행할 백엔드 목록 (요청 순서 유지)
    pub entries: Vec<RegisteredBackend>,
    /// 요청되었으나 등록되지 않은 이름 → 건너뛴 사유
    pub skipped: BTreeMap<String, String>,
}

/// 이름 기반 백엔드 레지스트리
///
/// # 사용 예시
/// ```ignore
/// let mut registry = BackendRegistry::new();
/// registry.register(Arc::new(BanditBackend::new()))?;
/// let resolved = registry.resolve(&["bandit".to_owned(), "unknown".to_owned()]);
/// assert_eq!(resolved.entries.len(), 1);
/// assert!(resolved.skipped.contains_key("unknown"));
/// ```
#[derive(Default)]
pub struct BackendRegistry {
    // 등록 순서 유지를 위한 Vec + 이름 중복 검사용 인덱스
    entries: Vec<RegisteredBackend>,
}

impl BackendRegistry {
    /// 빈 레지스트리를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 프로세스 백엔드를 등록합니다. 같은 이름이 이미 있으면 실패합니다.
    pub fn register(&mut self, backend: Arc<dyn BackendAdapter>) -> Result<(), RegistryError> {
        self.ensure_unique(backend.name())?;
        self.entries.push(RegisteredBackend::Process(backend));
        Ok(())
    }

    /// 원격 백엔드를 등록합니다. 같은 이름이 이미 있으면 실패합니다.
    pub fn register_remote(&mut self, backend: Arc<dyn RemoteAdapter>) -> Result<(), RegistryError> {
        self.ensure_unique(backend.name())?;
        self.entries.push(RegisteredBackend::Remote(backend));
        Ok(())
    }

    fn ensure_unique(&self, name: &str) -> Result<(), RegistryError> {
        if self.entries.iter().any(|e| e.name() == name) {
            return Err(RegistryError::AlreadyRegistered {
                name: name.to_owned(),
            });
        }
        Ok(())
    }

    /// 이름으로 백엔드를 조회합니다.
    pub fn get(&self, name: &str) -> Option<&RegisteredBackend> {
        self.entries.iter().find(|e| e.name() == name)
    }

    /// 등록된 모든 백엔드 (등록 순서)
    pub fn all(&self) -> &[RegisteredBackend] {
        &self.entries
    }

    /// 등록된 백엔드 수
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 레지스트리가 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 요청된 이름 목록을 실행 대상으로 해석합니다.
    ///
    /// - 빈 목록이면 등록된 전체 백엔드를 반환합니다.
    /// - 등록되지 않은 이름은 `skipped`에 사유와 함께 기록됩니다.
    /// - 중복 요청 이름은 한 번만 실행됩니다.
    pub fn resolve(&self, requested: &[String]) -> ResolvedBackends {
        if requested.is_empty() {
            return ResolvedBackends {
                entries: self.entries.clone(),
                skipped: BTreeMap::new(),
            };
        }

        let mut entries = Vec::new();
        let mut skipped = BTreeMap::new();
        let mut seen = std::collections::BTreeSet::new();

        for name in requested {
            if !seen.insert(name.as_str()) {
                continue;
            }
            match self.get(name) {
                Some(backend) => entries.push(backend.clone()),
                None => {
                    skipped.insert(name.clone(), "backend not registered".to_owned());
                }
            }
        }

        ResolvedBackends { entries, skipped }
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.entries.iter().map(|e| e.name()).collect();
        f.debug_struct("BackendRegistry")
            .field("backends", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BackendReport;
    use std::path::Path;

    struct NamedStub(&'static str);

    impl BackendAdapter for NamedStub {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "stub backend"
        }

        fn run(&self, _target: &Path) -> BackendReport {
            BackendReport::from_issues(Vec::new())
        }
    }

    fn registry_with(names: &[&'static str]) -> BackendRegistry {
        let mut registry = BackendRegistry::new();
        for name in names {
            registry.register(Arc::new(NamedStub(name))).unwrap();
        }
        registry
    }

    #[test]
    fn register_and_get() {
        let registry = registry_with(&["bandit"]);
        assert!(registry.get("bandit").is_some());
        assert!(registry.get("unknown").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut registry = registry_with(&["bandit"]);
        let err = registry.register(Arc::new(NamedStub("bandit"))).unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered { .. }));
        // 기존 등록은 그대로 유지
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn resolve_empty_request_returns_all() {
        let registry = registry_with(&["bandit", "eslint"]);
        let resolved = registry.resolve(&[]);
        assert_eq!(resolved.entries.len(), 2);
        assert!(resolved.skipped.is_empty());
    }

    #[test]
    fn resolve_unknown_name_is_skipped_not_fatal() {
        let registry = registry_with(&["bandit"]);
        let resolved = registry.resolve(&["bandit".to_owned(), "ghost".to_owned()]);
        assert_eq!(resolved.entries.len(), 1);
        assert_eq!(resolved.entries[0].name(), "bandit");
        assert_eq!(
            resolved.skipped.get("ghost").map(String::as_str),
            Some("backend not registered")
        );
    }

    #[test]
    fn resolve_preserves_request_order() {
        let registry = registry_with(&["a", "b", "c"]);
        let resolved = registry.resolve(&["c".to_owned(), "a".to_owned()]);
        let names: Vec<&str> = resolved.entries.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["c", "a"]);
    }

    #[test]
    fn resolve_deduplicates_requests() {
        let registry = registry_with(&["a"]);
        let resolved = registry.resolve(&["a".to_owned(), "a".to_owned()]);
        assert_eq!(resolved.entries.len(), 1);
    }
}
