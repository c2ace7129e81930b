//! 백엔드 오케스트레이션
//!
//! 실행 방식(프로세스/원격)별로 오케스트레이터 구현을 분리합니다.
//! 공통 계약: 맡은 모든 백엔드에 대해 정확히 하나의 보고서를 돌려주고,
//! 한 백엔드의 실패(에러, panic, 타임아웃)가 형제 백엔드에 전파되지
//! 않아야 합니다.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use omniscan_core::{BackendReport, BoxFuture, RegisteredBackend};

/// 백엔드 묶음 실행 오케스트레이터
///
/// dyn 호환을 위해 [`BoxFuture`]를 반환합니다. 구현체는 맡을 수 없는
/// 종류의 백엔드를 조용히 무시합니다 (종류별 분배는 호출자 책임).
pub trait Orchestrator: Send + Sync {
    /// 백엔드들을 실행하고 이름 → 보고서 맵을 돌려줍니다.
    fn run<'a>(
        &'a self,
        target: &'a Path,
        entries: &'a [RegisteredBackend],
    ) -> BoxFuture<'a, BTreeMap<String, BackendReport>>;
}

/// 프로세스 백엔드 오케스트레이터
///
/// 백엔드당 블로킹 전용 스레드 하나(`spawn_blocking`)를 쓰고, 각 실행을
/// 타임아웃으로 감쌉니다. 타임아웃 시 블로킹 호출 자체는 중단을 보장하지
/// 않으며 결과만 버려집니다. 어댑터 내부 panic은 `JoinError`로 수거되어
/// 에러 상태로 기록됩니다.
#[derive(Debug, Default)]
pub struct ProcessOrchestrator {
    /// 설정이 제공하는 타임아웃. `None`이면 어댑터 기본값 사용.
    timeout_override: Option<Duration>,
}

impl ProcessOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 모든 백엔드에 같은 타임아웃을 강제합니다.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout_override: Some(timeout),
        }
    }
}

impl Orchestrator for ProcessOrchestrator {
    fn run<'a>(
        &'a self,
        target: &'a Path,
        entries: &'a [RegisteredBackend],
    ) -> BoxFuture<'a, BTreeMap<String, BackendReport>> {
        Box::pin(async move {
            let mut tasks: JoinSet<(String, BackendReport)> = JoinSet::new();

            for entry in entries {
                let RegisteredBackend::Process(adapter) = entry else {
                    continue;
                };
                let adapter = Arc::clone(adapter);
                let name = adapter.name().to_owned();
                let timeout = self.timeout_override.unwrap_or_else(|| adapter.timeout());
                let target: PathBuf = target.to_path_buf();

                tasks.spawn(async move {
                    debug!(backend = %name, timeout_secs = timeout.as_secs(), "starting process backend");
                    let blocking = tokio::task::spawn_blocking(move || adapter.run(&target));
                    let report = match tokio::time::timeout(timeout, blocking).await {
                        Ok(Ok(report)) => report,
                        Ok(Err(join_err)) => {
                            warn!(backend = %name, error = %join_err, "process backend crashed");
                            BackendReport::error(format!("backend crashed: {join_err}"))
                        }
                        Err(_) => {
                            warn!(backend = %name, "process backend timed out");
                            BackendReport::timed_out()
                        }
                    };
                    (name, report)
                });
            }

            collect(tasks).await
        })
    }
}

/// 원격 백엔드 오케스트레이터
///
/// 원격 실행마다 벽시계 타임아웃 하나를 적용합니다. 어댑터에는 호출자
/// 토큰의 자식 토큰을 전달하므로, 타임아웃 시 해당 어댑터의 새 요청
/// 제출만 막히고 호출자 토큰과 형제 어댑터는 영향을 받지 않습니다.
/// 외부에서 호출자 토큰이 취소되면 자식 토큰으로 전파되어 모든
/// 어댑터가 진행분만 수거하고 일찍 반환합니다.
pub struct SemanticOrchestrator {
    run_timeout: Duration,
    cancel: CancellationToken,
}

impl SemanticOrchestrator {
    pub fn new(run_timeout: Duration, cancel: CancellationToken) -> Self {
        Self {
            run_timeout,
            cancel,
        }
    }
}

impl Orchestrator for SemanticOrchestrator {
    fn run<'a>(
        &'a self,
        target: &'a Path,
        entries: &'a [RegisteredBackend],
    ) -> BoxFuture<'a, BTreeMap<String, BackendReport>> {
        Box::pin(async move {
            let mut tasks: JoinSet<(String, BackendReport)> = JoinSet::new();

            for entry in entries {
                let RegisteredBackend::Remote(adapter) = entry else {
                    continue;
                };
                let adapter = Arc::clone(adapter);
                let name = adapter.name().to_owned();
                // 어댑터별 자식 토큰: 타임아웃 시 이 어댑터만 멈추고
                // 호출자 토큰은 변경하지 않는다
                let cancel = self.cancel.child_token();
                let run_timeout = self.run_timeout;
                let target: PathBuf = target.to_path_buf();

                tasks.spawn(async move {
                    debug!(backend = %name, timeout_secs = run_timeout.as_secs(), "starting remote backend");
                    let run = adapter.run(&target, cancel.clone());
                    let report = match tokio::time::timeout(run_timeout, run).await {
                        Ok(report) => report,
                        Err(_) => {
                            warn!(backend = %name, "remote backend run timed out");
                            cancel.cancel();
                            BackendReport::timed_out()
                        }
                    };
                    (name, report)
                });
            }

            collect(tasks).await
        })
    }
}

async fn collect(mut tasks: JoinSet<(String, BackendReport)>) -> BTreeMap<String, BackendReport> {
    let mut reports = BTreeMap::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((name, report)) => {
                reports.insert(name, report);
            }
            // 작업 자체의 panic. 백엔드 이름을 알 수 없으므로 여기서는
            // 로그만 남긴다. 어댑터 panic은 위의 JoinError 경로에서
            // 이름과 함께 수거된다.
            Err(e) => warn!(error = %e, "orchestration task panicked"),
        }
    }
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use omniscan_core::{BackendAdapter, BackendStatus, Issue, Level};

    struct SlowBackend;

    impl BackendAdapter for SlowBackend {
        fn name(&self) -> &str {
            "slow"
        }

        fn description(&self) -> &str {
            "sleeps past its timeout"
        }

        fn timeout(&self) -> Duration {
            Duration::from_millis(50)
        }

        fn run(&self, _target: &Path) -> BackendReport {
            std::thread::sleep(Duration::from_secs(5));
            BackendReport::from_issues(Vec::new())
        }
    }

    struct PanickyBackend;

    impl BackendAdapter for PanickyBackend {
        fn name(&self) -> &str {
            "panicky"
        }

        fn description(&self) -> &str {
            "always panics"
        }

        fn run(&self, _target: &Path) -> BackendReport {
            panic!("adapter bug");
        }
    }

    struct HealthyBackend;

    impl BackendAdapter for HealthyBackend {
        fn name(&self) -> &str {
            "healthy"
        }

        fn description(&self) -> &str {
            "returns one finding"
        }

        fn run(&self, _target: &Path) -> BackendReport {
            BackendReport::from_issues(vec![Issue::new(
                "a.py",
                1,
                (1, 1),
                "finding",
                Level::High,
                Level::High,
                "test",
                "",
                "healthy",
            )])
        }
    }

    fn entries(backends: Vec<Arc<dyn BackendAdapter>>) -> Vec<RegisteredBackend> {
        backends
            .into_iter()
            .map(RegisteredBackend::Process)
            .collect()
    }

    #[tokio::test]
    async fn timeout_is_recorded_as_timed_out() {
        let orch = ProcessOrchestrator::new();
        let reports = orch
            .run(Path::new("."), &entries(vec![Arc::new(SlowBackend)]))
            .await;
        assert_eq!(reports["slow"].status, BackendStatus::TimedOut);
    }

    #[tokio::test]
    async fn panic_is_isolated_as_error() {
        let orch = ProcessOrchestrator::new();
        let reports = orch
            .run(
                Path::new("."),
                &entries(vec![Arc::new(PanickyBackend), Arc::new(HealthyBackend)]),
            )
            .await;

        // panic이 형제 백엔드에 영향을 주지 않음
        assert_eq!(reports.len(), 2);
        assert!(matches!(reports["panicky"].status, BackendStatus::Error(_)));
        assert_eq!(reports["healthy"].status, BackendStatus::Findings(1));
    }

    #[tokio::test]
    async fn timeout_override_applies_to_all_backends() {
        let orch = ProcessOrchestrator::with_timeout(Duration::from_millis(50));
        let reports = orch
            .run(
                Path::new("."),
                &entries(vec![Arc::new(HealthyBackend), Arc::new(SlowBackend)]),
            )
            .await;
        assert_eq!(reports["healthy"].status, BackendStatus::Findings(1));
        assert_eq!(reports["slow"].status, BackendStatus::TimedOut);
    }

    struct HangingRemote;

    impl omniscan_core::RemoteAdapter for HangingRemote {
        fn name(&self) -> &str {
            "hanging-remote"
        }

        fn description(&self) -> &str {
            "never returns on its own"
        }

        fn run<'a>(
            &'a self,
            _target: &'a Path,
            _cancel: CancellationToken,
        ) -> omniscan_core::BoxFuture<'a, BackendReport> {
            Box::pin(async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                BackendReport::from_issues(Vec::new())
            })
        }
    }

    struct CooperativeRemote;

    impl omniscan_core::RemoteAdapter for CooperativeRemote {
        fn name(&self) -> &str {
            "cooperative-remote"
        }

        fn description(&self) -> &str {
            "reports whether its token was pre-cancelled"
        }

        fn run<'a>(
            &'a self,
            _target: &'a Path,
            cancel: CancellationToken,
        ) -> omniscan_core::BoxFuture<'a, BackendReport> {
            Box::pin(async move {
                if cancel.is_cancelled() {
                    BackendReport::error("token was cancelled before start")
                } else {
                    BackendReport::from_issues(Vec::new())
                }
            })
        }
    }

    fn remote_entries(
        backends: Vec<Arc<dyn omniscan_core::RemoteAdapter>>,
    ) -> Vec<RegisteredBackend> {
        backends
            .into_iter()
            .map(RegisteredBackend::Remote)
            .collect()
    }

    #[tokio::test]
    async fn remote_timeout_leaves_caller_token_untouched() {
        let caller = CancellationToken::new();
        let orch = SemanticOrchestrator::new(Duration::from_millis(50), caller.clone());

        let reports = orch
            .run(Path::new("."), &remote_entries(vec![Arc::new(HangingRemote)]))
            .await;

        assert_eq!(reports["hanging-remote"].status, BackendStatus::TimedOut);
        assert!(!caller.is_cancelled());
    }

    #[tokio::test]
    async fn caller_token_is_reusable_after_remote_timeout() {
        let caller = CancellationToken::new();
        let orch = SemanticOrchestrator::new(Duration::from_millis(50), caller.clone());
        let reports = orch
            .run(Path::new("."), &remote_entries(vec![Arc::new(HangingRemote)]))
            .await;
        assert_eq!(reports["hanging-remote"].status, BackendStatus::TimedOut);

        // 같은 토큰으로 두 번째 실행: 이전 타임아웃이 남긴 취소 상태가
        // 없어야 함
        let orch = SemanticOrchestrator::new(Duration::from_secs(5), caller.clone());
        let reports = orch
            .run(
                Path::new("."),
                &remote_entries(vec![Arc::new(CooperativeRemote)]),
            )
            .await;
        assert_eq!(reports["cooperative-remote"].status, BackendStatus::Clean);
    }

    #[tokio::test]
    async fn caller_cancellation_propagates_to_adapters() {
        let caller = CancellationToken::new();
        caller.cancel();
        let orch = SemanticOrchestrator::new(Duration::from_secs(5), caller);

        let reports = orch
            .run(
                Path::new("."),
                &remote_entries(vec![Arc::new(CooperativeRemote)]),
            )
            .await;
        assert!(matches!(
            reports["cooperative-remote"].status,
            BackendStatus::Error(_)
        ));
    }

    #[tokio::test]
    async fn remote_orchestrator_ignores_process_entries() {
        let orch = SemanticOrchestrator::new(Duration::from_secs(1), CancellationToken::new());
        let reports = orch
            .run(Path::new("."), &entries(vec![Arc::new(HealthyBackend)]))
            .await;
        assert!(reports.is_empty());
    }
}
