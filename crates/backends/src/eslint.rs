//! eslint 어댑터 — JS/TS 린트
//!
//! `eslint --format json <dir>` 출력을 정규화합니다. eslint는 린트 에러가
//! 있으면 종료 코드 1을 반환하며, 그때도 stdout에 유효한 JSON 리포트가
//! 있습니다.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use omniscan_core::{BackendAdapter, BackendReport, Issue, Level};

use crate::error::BackendError;
use crate::exec::{has_matching_files, run_tool};
use crate::norm::{level_from_eslint_severity, relative_path};

const TOOL: &str = "eslint";
const EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs"];

/// eslint JSON 출력의 파일 단위 항목
#[derive(Debug, Deserialize)]
struct EslintFileEntry {
    #[serde(rename = "filePath")]
    file_path: String,
    #[serde(default)]
    messages: Vec<EslintMessage>,
}

#[derive(Debug, Deserialize)]
struct EslintMessage {
    #[serde(rename = "ruleId")]
    rule_id: Option<String>,
    severity: i64,
    message: String,
    #[serde(default)]
    line: u32,
    #[serde(rename = "endLine")]
    end_line: Option<u32>,
}

/// eslint 백엔드 어댑터
#[derive(Debug, Default)]
pub struct EslintBackend;

impl EslintBackend {
    pub fn new() -> Self {
        Self
    }
}

impl BackendAdapter for EslintBackend {
    fn name(&self) -> &str {
        TOOL
    }

    fn description(&self) -> &str {
        "JavaScript/TypeScript linter (eslint)"
    }

    fn run(&self, target: &Path) -> BackendReport {
        if !has_matching_files(target, EXTENSIONS) {
            return BackendReport::clean("no JavaScript/TypeScript files in target");
        }

        let target_str = target.display().to_string();
        let output = match run_tool(TOOL, &["--format", "json", &target_str], None) {
            Ok(output) => output,
            Err(e) => return BackendReport::error(e.to_string()),
        };

        // 0: 발견 없음, 1: 린트 에러 발견. 2 이상은 실행 실패.
        match output.exit_code {
            Some(0 | 1) => {}
            code => {
                return BackendReport::error(format!(
                    "eslint exited with {code:?}: {}",
                    output.stderr.trim()
                ));
            }
        }

        match parse_output(&output.stdout, target) {
            Ok(issues) => {
                debug!(count = issues.len(), "eslint scan complete");
                BackendReport::from_issues(issues).with_raw_output(output.stdout)
            }
            Err(e) => BackendReport::error(e.to_string()),
        }
    }
}

/// eslint JSON 출력을 정규화된 이슈 목록으로 변환합니다.
pub fn parse_output(raw: &str, root: &Path) -> Result<Vec<Issue>, BackendError> {
    let entries: Vec<EslintFileEntry> =
        serde_json::from_str(raw).map_err(|e| BackendError::ParseFailed {
            tool: TOOL.to_owned(),
            reason: e.to_string(),
        })?;

    let mut issues = Vec::new();
    for entry in entries {
        let file = relative_path(root, Path::new(&entry.file_path));
        for msg in entry.messages {
            let end = msg.end_line.unwrap_or(msg.line);
            issues.push(Issue::new(
                file.clone(),
                msg.line,
                (msg.line, end),
                msg.message,
                level_from_eslint_severity(msg.severity),
                // 규칙 기반 린트는 신뢰도가 높음. eslint는 별도
                // 신뢰도 축이 없으므로 고정값을 사용.
                Level::High,
                msg.rule_id.unwrap_or_else(|| "eslint".to_owned()),
                String::new(),
                TOOL,
            ));
        }
    }

    Ok(issues)
}
