//! 이슈 랭킹과 통계 집계
//!
//! [`rank`]는 (심각도, 신뢰도, 파일, 줄 번호) 오름차순의 결정적 전순서를
//! 만듭니다. 도착 순서나 백엔드 실행 속도에 의존하지 않으므로 같은
//! 입력에 대해 항상 같은 출력을 보장합니다 (멱등).
//!
//! [`summarize`]는 이슈 목록 한 번 순회로 파생 통계를 만드는 순수
//! 함수입니다. I/O 없음.

use std::collections::{BTreeMap, BTreeSet};
use std::time::SystemTime;

use omniscan_core::{Issue, LevelCounts, ScanSummary};

/// 이슈를 결정적 전순서로 정렬합니다.
///
/// 정렬 키: (심각도 HIGH<MEDIUM<LOW, 신뢰도 HIGH<MEDIUM<LOW,
/// 파일 경로, 줄 번호) 오름차순. 멱등: `rank(rank(x)) == rank(x)`.
pub fn rank(mut issues: Vec<Issue>) -> Vec<Issue> {
    issues.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then(a.confidence.cmp(&b.confidence))
            .then_with(|| a.source_file.cmp(&b.source_file))
            .then(a.line_number.cmp(&b.line_number))
    });
    issues
}

/// 이슈 목록에서 파생 통계를 계산합니다.
pub fn summarize(issues: &[Issue]) -> ScanSummary {
    let mut severity_counts = LevelCounts::default();
    let mut confidence_counts = LevelCounts::default();
    let mut category_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut backend_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut files: BTreeSet<&str> = BTreeSet::new();

    for issue in issues {
        severity_counts.bump(issue.severity);
        confidence_counts.bump(issue.confidence);
        *category_counts.entry(issue.category.clone()).or_default() += 1;
        *backend_counts
            .entry(issue.backend_name.clone())
            .or_default() += 1;
        files.insert(&issue.source_file);
    }

    ScanSummary {
        total_issues: issues.len(),
        severity_counts,
        confidence_counts,
        affected_files: files.len(),
        category_counts,
        backend_counts,
        generated_at: SystemTime::now(),
    }
}
