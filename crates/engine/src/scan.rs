//! 스캔 진입점
//!
//! [`scan`]은 호출자 대면 단일 진입점입니다. 대상 검증, 백엔드 해석,
//! 모드 필터링, 프로세스/원격 동시 실행, 병합·랭킹·집계를 순서대로
//! 수행하고 [`ScanOutcome`]을 돌려줍니다.
//!
//! 불변식: 요청된 (또는 빈 요청 시 등록된 전체) 백엔드 이름마다 상태
//! 맵에 정확히 하나의 엔트리가 생깁니다. 백엔드가 실패하거나 모드로
//! 걸러져도 마찬가지입니다.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use omniscan_core::{
    BackendKind, BackendRegistry, BackendStatus, OmniscanError, RegisteredBackend, ScanOutcome,
};

use crate::orchestrator::{Orchestrator, ProcessOrchestrator, SemanticOrchestrator};
use crate::rank::{rank, summarize};

/// 실행할 백엔드 종류 선택
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// 프로세스 백엔드만
    Process,
    /// 원격 백엔드만
    Semantic,
    /// 전부
    #[default]
    Full,
}

impl ScanMode {
    fn admits(self, kind: BackendKind) -> bool {
        match self {
            ScanMode::Process => kind == BackendKind::Process,
            ScanMode::Semantic => kind == BackendKind::Remote,
            ScanMode::Full => true,
        }
    }
}

/// 스캔 실행 옵션
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// 백엔드 종류 필터
    pub mode: ScanMode,
    /// 네이티브 원본 출력 수집 여부
    pub include_raw: bool,
    /// 프로세스 백엔드 타임아웃 오버라이드
    pub process_timeout: Option<Duration>,
    /// 원격 실행 전체의 벽시계 타임아웃
    pub remote_run_timeout: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            mode: ScanMode::Full,
            include_raw: false,
            process_timeout: None,
            remote_run_timeout: Duration::from_secs(300),
        }
    }
}

/// 스캔 한 건을 실행합니다.
///
/// - `requested`가 비어 있으면 등록된 전체 백엔드를 실행합니다.
/// - 등록되지 않은 이름과 모드로 걸러진 백엔드는 `Skipped`로 기록됩니다.
/// - 대상 디렉터리가 없거나 읽을 수 없으면 어댑터 실행 전에 에러를
///   반환합니다. 그 외 백엔드 단위 실패는 상태 맵에만 나타납니다.
pub async fn scan(
    target: &Path,
    requested: &[String],
    registry: &BackendRegistry,
    options: &ScanOptions,
    cancel: CancellationToken,
) -> Result<ScanOutcome, OmniscanError> {
    check_target(target).await?;

    let resolved = registry.resolve(requested);
    let mut statuses: BTreeMap<String, BackendStatus> = resolved
        .skipped
        .into_iter()
        .map(|(name, reason)| (name, BackendStatus::Skipped(reason)))
        .collect();

    // 모드 필터: 걸러진 백엔드도 상태 맵에는 남는다
    let mut process_entries: Vec<RegisteredBackend> = Vec::new();
    let mut remote_entries: Vec<RegisteredBackend> = Vec::new();
    for entry in resolved.entries {
        if !options.mode.admits(entry.kind()) {
            statuses.insert(
                entry.name().to_owned(),
                BackendStatus::Skipped("disabled by scan mode".to_owned()),
            );
            continue;
        }
        match entry.kind() {
            BackendKind::Process => process_entries.push(entry),
            BackendKind::Remote => remote_entries.push(entry),
        }
    }

    let scan_id = Uuid::new_v4().to_string();
    info!(
        scan_id = %scan_id,
        target = %target.display(),
        process = process_entries.len(),
        remote = remote_entries.len(),
        skipped = statuses.len(),
        "starting scan"
    );

    let process_orch = match options.process_timeout {
        Some(timeout) => ProcessOrchestrator::with_timeout(timeout),
        None => ProcessOrchestrator::new(),
    };
    let remote_orch = SemanticOrchestrator::new(options.remote_run_timeout, cancel);

    let (process_reports, remote_reports) = tokio::join!(
        process_orch.run(target, &process_entries),
        remote_orch.run(target, &remote_entries),
    );

    let mut issues = Vec::new();
    let mut raw_outputs = BTreeMap::new();
    let mut remote_stats = BTreeMap::new();

    for (name, report) in process_reports.into_iter().chain(remote_reports) {
        issues.extend(report.issues);
        if options.include_raw
            && let Some(raw) = report.raw_output
        {
            raw_outputs.insert(name.clone(), raw);
        }
        if let Some(stats) = report.remote_stats {
            remote_stats.insert(name.clone(), stats);
        }
        statuses.insert(name, report.status);
    }

    let issues = rank(issues);
    let summary = summarize(&issues);

    info!(
        scan_id = %scan_id,
        total_issues = summary.total_issues,
        affected_files = summary.affected_files,
        "scan complete"
    );

    Ok(ScanOutcome {
        scan_id,
        issues,
        statuses,
        summary,
        raw_outputs,
        remote_stats,
    })
}

/// 대상이 존재하는 읽기 가능한 디렉터리인지 확인합니다.
async fn check_target(target: &Path) -> Result<(), OmniscanError> {
    let metadata = tokio::fs::metadata(target).await.map_err(|e| {
        OmniscanError::TargetNotFound {
            path: target.display().to_string(),
            reason: e.to_string(),
        }
    })?;
    if !metadata.is_dir() {
        return Err(OmniscanError::TargetNotFound {
            path: target.display().to_string(),
            reason: "not a directory".to_owned(),
        });
    }
    // 읽기 권한 확인
    tokio::fs::read_dir(target)
        .await
        .map_err(|e| OmniscanError::TargetNotFound {
            path: target.display().to_string(),
            reason: e.to_string(),
        })?;
    Ok(())
}
