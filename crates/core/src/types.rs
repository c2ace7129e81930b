//! 도메인 타입 — 스캔 결과의 공통 스키마
//!
//! 모든 백엔드 어댑터는 자신의 네이티브 출력 형식을 이 모듈의
//! [`Issue`] 스키마로 정규화하여 반환합니다.
//! 오케스트레이터와 집계기는 이 타입들만 알고 동작합니다.

use std::collections::BTreeMap;
use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// 정규화된 심각도/신뢰도 레벨
///
/// 각 백엔드의 네이티브 어휘(정수, 단어, 퍼센트)를 3단계 공통 척도로
/// 매핑한 결과입니다. `Ord` 파생 구현으로 `High < Medium < Low`가 성립하여
/// 오름차순 정렬 시 심각한 이슈가 먼저 옵니다.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Level {
    /// 높음
    High,
    /// 중간
    Medium,
    /// 낮음
    Low,
}

impl Level {
    /// 문자열에서 레벨을 파싱합니다. 대소문자를 구분하지 않습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "high" | "critical" | "error" => Some(Self::High),
            "medium" | "med" | "moderate" | "warning" => Some(Self::Medium),
            "low" | "info" | "informational" | "note" => Some(Self::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "HIGH"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::Low => write!(f, "LOW"),
        }
    }
}

/// 정규화된 단일 발견 사항
///
/// 백엔드 어댑터가 네이티브 출력을 파싱한 직후 생성하며, 이후 불변입니다.
/// `source_file`은 스캔 루트 기준 상대 경로이며 호스트의 절대 경로를
/// 노출하지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// 스캔 루트 기준 상대 경로
    pub source_file: String,
    /// 줄 번호 (0 = 줄 단위로 지정할 수 없는 발견, 예: 의존성 취약점)
    pub line_number: u32,
    /// 줄 범위 [start, end], start <= end
    pub line_range: (u32, u32),
    /// 사람이 읽을 수 있는 설명 (비어 있지 않음)
    pub message: String,
    /// 정규화된 심각도
    pub severity: Level,
    /// 정규화된 신뢰도
    pub confidence: Level,
    /// 백엔드별 분류 태그 (예: "dependency_vulnerability", "dead_code")
    pub category: String,
    /// 코드 발췌 또는 증거 문자열 (없으면 빈 문자열)
    pub snippet: String,
    /// 이슈를 생성한 백엔드 이름
    pub backend_name: String,
    /// 수정 제안 (시맨틱 백엔드만 채움)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
    /// 상세 설명 (시맨틱 백엔드만 채움)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Issue {
    /// 새 이슈를 생성합니다.
    ///
    /// 스키마 불변식을 생성 시점에 보정합니다:
    /// - 뒤집힌 `line_range`는 (start, start)로 클램프
    /// - 빈 메시지는 플레이스홀더로 대체
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source_file: impl Into<String>,
        line_number: u32,
        line_range: (u32, u32),
        message: impl Into<String>,
        severity: Level,
        confidence: Level,
        category: impl Into<String>,
        snippet: impl Into<String>,
        backend_name: impl Into<String>,
    ) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "(no description provided)".to_owned()
        } else {
            message
        };
        let line_range = if line_range.0 > line_range.1 {
            (line_range.0, line_range.0)
        } else {
            line_range
        };
        Self {
            source_file: source_file.into(),
            line_number,
            line_range,
            message,
            severity,
            confidence,
            category: category.into(),
            snippet: snippet.into(),
            backend_name: backend_name.into(),
            suggested_fix: None,
            explanation: None,
        }
    }

    /// 수정 제안을 설정합니다.
    pub fn with_suggested_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(fix.into());
        self
    }

    /// 상세 설명을 설정합니다.
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}/{}] {}:{} {} ({})",
            self.severity, self.confidence, self.source_file, self.line_number, self.message, self.backend_name,
        )
    }
}

/// 백엔드별 스캔 시도 결과
///
/// 요청된 모든 백엔드는 성공/실패와 무관하게 정확히 하나의 상태를
/// 보고합니다. 오케스트레이터는 백엔드를 조용히 누락시키지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendStatus {
    /// 정상 수행, 발견 없음
    Clean,
    /// 정상 수행, 발견 n건
    Findings(usize),
    /// 실행 실패 (비정상 종료, 파싱 실패, 네트워크 오류 등)
    Error(String),
    /// 실행되지 않음 (요청 제외, 알 수 없는 이름, 모드 필터)
    Skipped(String),
    /// 실행 시간 초과
    TimedOut,
}

impl BackendStatus {
    /// 백엔드가 실제로 실행되어 결과를 냈는지 여부
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Clean | Self::Findings(_))
    }
}

impl fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clean => write!(f, "ok (no issues)"),
            Self::Findings(n) => write!(f, "ok ({n} issues)"),
            Self::Error(msg) => write!(f, "error: {msg}"),
            Self::Skipped(reason) => write!(f, "skipped: {reason}"),
            Self::TimedOut => write!(f, "timed out"),
        }
    }
}

/// 원격 백엔드의 실행 단위 통계
///
/// 파일 단위로 팬아웃하는 시맨틱 백엔드가 실행당 한 번 생성합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteRunStats {
    /// 발견된 분석 대상 파일 수
    pub files_discovered: usize,
    /// 성공적으로 처리된 파일 수
    pub files_processed: usize,
    /// 오류가 발생한 파일 수
    pub files_errored: usize,
    /// 실행 시작 시각
    pub started_at: SystemTime,
    /// 실행 종료 시각
    pub finished_at: SystemTime,
}

/// 어댑터 단일 실행 결과
///
/// `run()` 계약의 반환값입니다. 어댑터는 실패 시에도 예외를 던지지 않고
/// 빈 이슈 목록과 설명적 상태를 담아 반환합니다 (fail-closed).
#[derive(Debug, Clone)]
pub struct BackendReport {
    /// 정규화된 이슈 목록
    pub issues: Vec<Issue>,
    /// 백엔드 상태
    pub status: BackendStatus,
    /// 디버깅/감사용 네이티브 원본 출력 (정규화 계약에는 포함되지 않음)
    pub raw_output: Option<String>,
    /// 원격 백엔드 실행 통계 (프로세스 백엔드는 None)
    pub remote_stats: Option<RemoteRunStats>,
}

impl BackendReport {
    /// 이슈 목록으로부터 보고서를 생성합니다. 상태는 이슈 수에서 유도됩니다.
    pub fn from_issues(issues: Vec<Issue>) -> Self {
        let status = if issues.is_empty() {
            BackendStatus::Clean
        } else {
            BackendStatus::Findings(issues.len())
        };
        Self {
            issues,
            status,
            raw_output: None,
            remote_stats: None,
        }
    }

    /// 빈 보고서를 생성합니다 (적용 대상 파일 없음 등).
    pub fn clean(note: impl Into<String>) -> Self {
        Self {
            issues: Vec::new(),
            status: BackendStatus::Clean,
            raw_output: Some(note.into()),
            remote_stats: None,
        }
    }

    /// 실행 실패 보고서를 생성합니다.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            issues: Vec::new(),
            status: BackendStatus::Error(message.into()),
            raw_output: None,
            remote_stats: None,
        }
    }

    /// 시간 초과 보고서를 생성합니다.
    pub fn timed_out() -> Self {
        Self {
            issues: Vec::new(),
            status: BackendStatus::TimedOut,
            raw_output: None,
            remote_stats: None,
        }
    }

    /// 원본 출력을 첨부합니다.
    pub fn with_raw_output(mut self, raw: impl Into<String>) -> Self {
        self.raw_output = Some(raw.into());
        self
    }
}

/// 레벨별 카운트 (심각도 또는 신뢰도)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCounts {
    /// HIGH 건수
    pub high: usize,
    /// MEDIUM 건수
    pub medium: usize,
    /// LOW 건수
    pub low: usize,
}

impl LevelCounts {
    /// 해당 레벨의 카운트를 1 증가시킵니다.
    pub fn bump(&mut self, level: Level) {
        match level {
            Level::High => self.high += 1,
            Level::Medium => self.medium += 1,
            Level::Low => self.low += 1,
        }
    }

    /// 전체 합계
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// 완료된 스캔의 파생 통계
///
/// 이슈 목록에 대한 읽기 전용 집계입니다.
/// 불변식: 심각도별/신뢰도별 카운트의 합은 항상 `total_issues`와 같습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    /// 전체 이슈 수
    pub total_issues: usize,
    /// 심각도별 카운트
    pub severity_counts: LevelCounts,
    /// 신뢰도별 카운트
    pub confidence_counts: LevelCounts,
    /// 이슈가 발견된 서로 다른 파일 수
    pub affected_files: usize,
    /// 분류 태그별 카운트
    pub category_counts: BTreeMap<String, usize>,
    /// 백엔드별 카운트
    pub backend_counts: BTreeMap<String, usize>,
    /// 통계 생성 시각
    pub generated_at: SystemTime,
}

/// 스캔 요청 한 건의 최종 결과
///
/// 호출자(CLI/리포트 레이어)에 전달되는 삼중 쌍
/// (정렬된 이슈, 백엔드 상태 맵, 통계)에 감사용 부가 정보를 더한 것입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutcome {
    /// 스캔 고유 ID (UUID v4)
    pub scan_id: String,
    /// 결정적 순서로 정렬된 이슈 목록
    pub issues: Vec<Issue>,
    /// 요청된 백엔드 이름 → 상태 (요청당 정확히 한 엔트리)
    pub statuses: BTreeMap<String, BackendStatus>,
    /// 파생 통계
    pub summary: ScanSummary,
    /// 백엔드별 네이티브 원본 출력 (--raw 요청 시)
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub raw_outputs: BTreeMap<String, String>,
    /// 원격 백엔드별 실행 통계
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub remote_stats: BTreeMap<String, RemoteRunStats>,
}
