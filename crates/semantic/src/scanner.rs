//! 시맨틱 스캐너 — 파일 팬아웃과 어드미션 게이트
//!
//! 대상 디렉터리에서 허용 확장자 파일을 수집하고, 파일당 하나의 비동기
//! 작업으로 원격 분석을 팬아웃합니다. 동시 진행 요청 수는 세마포어로
//! 상한을 강제하고, 취소 토큰이 트리거되면 새 작업은 게이트를 통과하지
//! 못하며 진행 중인 작업만 마저 수거합니다.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use omniscan_core::{BackendReport, Issue, RemoteRunStats, SemanticConfig};

use crate::error::SemanticError;
use crate::gate::GateMeter;
use crate::provider::{AnalysisProvider, AnalysisRequest};
use crate::schema;

/// 원격 시맨틱 스캐너
pub struct SemanticScanner {
    config: SemanticConfig,
    provider: Arc<dyn AnalysisProvider>,
    meter: Arc<GateMeter>,
}

impl SemanticScanner {
    pub fn new(config: SemanticConfig, provider: Arc<dyn AnalysisProvider>) -> Self {
        Self {
            config,
            provider,
            meter: Arc::new(GateMeter::new()),
        }
    }

    /// 스캐너 내부 게이트 계측기 (테스트 관측용)
    pub fn meter(&self) -> Arc<GateMeter> {
        Arc::clone(&self.meter)
    }

    /// 대상 디렉터리 전체를 분석합니다.
    ///
    /// 파일 단위 실패는 형제 작업에 영향을 주지 않고 `files_errored`
    /// 카운터에만 반영됩니다. 전 파일이 실패한 경우에만 백엔드 단위
    /// 에러로 보고합니다.
    pub async fn analyze_directory(
        &self,
        target: &Path,
        cancel: CancellationToken,
    ) -> BackendReport {
        let started_at = SystemTime::now();
        let files = self.discover_files(target);
        let files_discovered = files.len();

        if files.is_empty() {
            let mut report = BackendReport::clean("no files matching semantic extensions");
            report.remote_stats = Some(RemoteRunStats {
                files_discovered: 0,
                files_processed: 0,
                files_errored: 0,
                started_at,
                finished_at: SystemTime::now(),
            });
            return report;
        }

        info!(
            files = files_discovered,
            gate = self.config.max_concurrent_requests,
            model = self.provider.model(),
            "starting semantic analysis"
        );

        let gate = Arc::new(Semaphore::new(self.config.max_concurrent_requests));
        let processed = Arc::new(AtomicU64::new(0));
        let errored = Arc::new(AtomicU64::new(0));
        let mut tasks: JoinSet<Vec<Issue>> = JoinSet::new();

        for path in files {
            let gate = Arc::clone(&gate);
            let meter = Arc::clone(&self.meter);
            let provider = Arc::clone(&self.provider);
            let processed = Arc::clone(&processed);
            let errored = Arc::clone(&errored);
            let cancel = cancel.clone();
            let relative = relative_display(target, &path);
            let max_chars = self.config.max_chars_per_file;
            let timeout_secs = self.config.request_timeout_secs;

            tasks.spawn(async move {
                // 취소 이후에는 새 요청이 게이트를 통과하지 않음
                if cancel.is_cancelled() {
                    return Vec::new();
                }
                let Ok(_permit) = gate.acquire_owned().await else {
                    return Vec::new();
                };
                if cancel.is_cancelled() {
                    return Vec::new();
                }
                let _pass = meter.enter();

                match analyze_file(&*provider, &path, &relative, max_chars, timeout_secs).await {
                    Ok(issues) => {
                        processed.fetch_add(1, Ordering::SeqCst);
                        issues
                    }
                    Err(e) => {
                        warn!(file = %relative, error = %e, "semantic analysis failed for file");
                        errored.fetch_add(1, Ordering::SeqCst);
                        Vec::new()
                    }
                }
            });
        }

        let mut issues = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(file_issues) => issues.extend(file_issues),
                Err(e) => {
                    warn!(error = %e, "semantic analysis task failed to join");
                    errored.fetch_add(1, Ordering::SeqCst);
                }
            }
        }

        let files_processed = processed.load(Ordering::SeqCst) as usize;
        let files_errored = errored.load(Ordering::SeqCst) as usize;
        let stats = RemoteRunStats {
            files_discovered,
            files_processed,
            files_errored,
            started_at,
            finished_at: SystemTime::now(),
        };

        info!(
            issues = issues.len(),
            processed = files_processed,
            errored = files_errored,
            peak_concurrency = self.meter.peak(),
            "semantic analysis complete"
        );

        let mut report = if files_errored == files_discovered {
            BackendReport::error(format!(
                "all {files_discovered} files failed semantic analysis"
            ))
        } else {
            BackendReport::from_issues(issues)
        };
        report.remote_stats = Some(stats);
        report
    }

    /// 허용 확장자 파일을 결정적 순서(경로 정렬)로 수집합니다.
    fn discover_files(&self, target: &Path) -> Vec<PathBuf> {
        let extensions: Vec<&str> = self
            .config
            .file_extensions
            .iter()
            .map(String::as_str)
            .collect();

        let mut files: Vec<PathBuf> = WalkDir::new(target)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| extensions.contains(&ext))
            })
            .map(|entry| entry.into_path())
            .collect();
        files.sort();
        files.truncate(self.config.max_files);

        debug!(count = files.len(), "discovered files for semantic analysis");
        files
    }
}

/// 파일 하나를 읽고, 자르고, 제공자에 보내고, 응답을 이슈로 변환합니다.
async fn analyze_file(
    provider: &dyn AnalysisProvider,
    path: &Path,
    relative: &str,
    max_chars: usize,
    timeout_secs: u64,
) -> Result<Vec<Issue>, SemanticError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SemanticError::FileRead {
            path: relative.to_owned(),
            reason: e.to_string(),
        })?;

    let request = AnalysisRequest {
        relative_path: relative.to_owned(),
        content: truncate_chars(&content, max_chars).to_owned(),
    };

    let response = tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        provider.analyze(&request),
    )
    .await
    .map_err(|_| SemanticError::Timeout { secs: timeout_secs })??;

    let findings = schema::parse_findings(&response.content)?;
    Ok(findings
        .into_iter()
        .map(|f| f.into_issue(relative, "semantic"))
        .collect())
}

/// 문자 경계에서 결정적으로 자릅니다.
fn truncate_chars(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

fn relative_display(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
