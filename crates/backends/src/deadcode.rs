//! deadcode 어댑터 — 미사용 코드 탐지 (vulture)
//!
//! `vulture <dir>` 는 구조화된 출력이 없고 한 줄 텍스트 형식을 씁니다:
//!
//! ```text
//! path/to/file.py:12: unused function 'helper' (60% confidence)
//! ```
//!
//! 백분율 신뢰도를 3단계 척도로 변환하고, 심각도는 미사용 코드 특성상
//! 고정 LOW를 사용합니다. 발견이 있으면 vulture는 종료 코드 3을
//! 반환합니다.

use std::path::Path;

use tracing::debug;

use omniscan_core::{BackendAdapter, BackendReport, Issue, Level};

use crate::error::BackendError;
use crate::exec::{has_matching_files, run_tool};
use crate::norm::{level_from_percent, relative_path};

const TOOL: &str = "vulture";
const BACKEND_NAME: &str = "deadcode";
const EXTENSIONS: &[&str] = &["py"];

/// deadcode(vulture) 백엔드 어댑터
#[derive(Debug, Default)]
pub struct DeadcodeBackend;

impl DeadcodeBackend {
    pub fn new() -> Self {
        Self
    }
}

impl BackendAdapter for DeadcodeBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn description(&self) -> &str {
        "unused-code detector (vulture)"
    }

    fn run(&self, target: &Path) -> BackendReport {
        if !has_matching_files(target, EXTENSIONS) {
            return BackendReport::clean("no Python files in target");
        }

        let target_str = target.display().to_string();
        let output = match run_tool(TOOL, &[&target_str], None) {
            Ok(output) => output,
            Err(e) => return BackendReport::error(e.to_string()),
        };

        // 0: 발견 없음, 3: 미사용 코드 발견. 1은 실행 에러.
        match output.exit_code {
            Some(0 | 3) => {}
            code => {
                return BackendReport::error(format!(
                    "vulture exited with {code:?}: {}",
                    output.stderr.trim()
                ));
            }
        }

        match parse_output(&output.stdout, target) {
            Ok(issues) => {
                debug!(count = issues.len(), "deadcode scan complete");
                BackendReport::from_issues(issues).with_raw_output(output.stdout)
            }
            Err(e) => BackendReport::error(e.to_string()),
        }
    }
}

/// vulture 텍스트 출력을 정규화된 이슈 목록으로 변환합니다.
///
/// 형식에 맞지 않는 줄은 조용히 건너뜁니다 (vulture는 경고를
/// stdout에 섞어 내보내는 경우가 있습니다).
pub fn parse_output(raw: &str, root: &Path) -> Result<Vec<Issue>, BackendError> {
    let issues = raw
        .lines()
        .filter_map(|line| parse_line(line, root))
        .collect();
    Ok(issues)
}

/// 한 줄을 파싱합니다: `file:line: message (NN% confidence)`
fn parse_line(line: &str, root: &Path) -> Option<Issue> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    // 뒤에서부터 신뢰도 괄호를 떼어냄
    let (body, percent) = match line.rfind('(') {
        Some(pos) if line.ends_with("% confidence)") => {
            let inner = &line[pos + 1..line.len() - "% confidence)".len()];
            match inner.parse::<u8>() {
                Ok(p) => (line[..pos].trim_end(), p),
                Err(_) => (line, 60),
            }
        }
        _ => (line, 60),
    };

    // `file:line: message` — 경로에 콜론이 없는 전제 (유닉스 경로)
    let (file_part, rest) = body.split_once(':')?;
    let (line_part, message) = rest.split_once(':')?;
    let line_number = line_part.trim().parse::<u32>().ok()?;
    let message = message.trim();
    if message.is_empty() {
        return None;
    }

    Some(Issue::new(
        relative_path(root, Path::new(file_part)),
        line_number,
        (line_number, line_number),
        message,
        Level::Low,
        level_from_percent(percent),
        "dead_code",
        String::new(),
        BACKEND_NAME,
    ))
}
