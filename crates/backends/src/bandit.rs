//! bandit 어댑터 — Python SAST
//!
//! `bandit -r <dir> -f json` 출력을 정규화합니다. bandit은 발견이 있으면
//! 종료 코드 1을 반환하므로 0과 1 모두 정상 실행으로 취급합니다.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use omniscan_core::{BackendAdapter, BackendReport, Issue};

use crate::error::BackendError;
use crate::exec::{has_matching_files, run_tool};
use crate::norm::{confidence_from_label, relative_path, severity_from_label};

const TOOL: &str = "bandit";
const EXTENSIONS: &[&str] = &["py"];

/// bandit JSON 최상위 구조
#[derive(Debug, Deserialize)]
struct BanditOutput {
    #[serde(default)]
    results: Vec<BanditResult>,
}

#[derive(Debug, Deserialize)]
struct BanditResult {
    filename: String,
    line_number: u32,
    #[serde(default)]
    line_range: Vec<u32>,
    issue_text: String,
    issue_severity: String,
    issue_confidence: String,
    test_name: String,
    #[serde(default)]
    code: String,
}

/// bandit 백엔드 어댑터
#[derive(Debug, Default)]
pub struct BanditBackend;

impl BanditBackend {
    pub fn new() -> Self {
        Self
    }
}

impl BackendAdapter for BanditBackend {
    fn name(&self) -> &str {
        TOOL
    }

    fn description(&self) -> &str {
        "Python security linter (bandit)"
    }

    fn run(&self, target: &Path) -> BackendReport {
        if !has_matching_files(target, EXTENSIONS) {
            return BackendReport::clean("no Python files in target");
        }

        let target_str = target.display().to_string();
        let output = match run_tool(TOOL, &["-r", &target_str, "-f", "json"], None) {
            Ok(output) => output,
            Err(e) => return BackendReport::error(e.to_string()),
        };

        // 0: 발견 없음, 1: 발견 있음. 둘 다 유효한 리포트를 동반함.
        match output.exit_code {
            Some(0 | 1) => {}
            code => {
                return BackendReport::error(format!(
                    "bandit exited with {code:?}: {}",
                    output.stderr.trim()
                ));
            }
        }

        match parse_output(&output.stdout, target) {
            Ok(issues) => {
                debug!(count = issues.len(), "bandit scan complete");
                BackendReport::from_issues(issues).with_raw_output(output.stdout)
            }
            Err(e) => BackendReport::error(e.to_string()),
        }
    }
}

/// bandit JSON 출력을 정규화된 이슈 목록으로 변환합니다.
pub fn parse_output(raw: &str, root: &Path) -> Result<Vec<Issue>, BackendError> {
    let parsed: BanditOutput =
        serde_json::from_str(raw).map_err(|e| BackendError::ParseFailed {
            tool: TOOL.to_owned(),
            reason: e.to_string(),
        })?;

    let issues = parsed
        .results
        .into_iter()
        .map(|r| {
            let range = match (r.line_range.first(), r.line_range.last()) {
                (Some(&start), Some(&end)) => (start, end),
                _ => (r.line_number, r.line_number),
            };
            Issue::new(
                relative_path(root, Path::new(&r.filename)),
                r.line_number,
                range,
                r.issue_text,
                severity_from_label(TOOL, &r.issue_severity),
                confidence_from_label(TOOL, &r.issue_confidence),
                r.test_name,
                r.code,
                TOOL,
            )
        })
        .collect();

    Ok(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use omniscan_core::Level;

    const SAMPLE: &str = r#"{
        "errors": [],
        "results": [
            {
                "filename": "/scan/app/views.py",
                "line_number": 42,
                "line_range": [42, 44],
                "issue_text": "Use of insecure MD5 hash function.",
                "issue_severity": "HIGH",
                "issue_confidence": "MEDIUM",
                "test_name": "hashlib_insecure_functions",
                "test_id": "B324",
                "code": "42 h = hashlib.md5(data)\n"
            },
            {
                "filename": "/scan/app/util.py",
                "line_number": 7,
                "line_range": [7],
                "issue_text": "Possible hardcoded password.",
                "issue_severity": "LOW",
                "issue_confidence": "EXPERIMENTAL",
                "test_name": "hardcoded_password_string",
                "test_id": "B105",
                "code": ""
            }
        ]
    }"#;

    #[test]
    fn parses_results_with_normalization() {
        let issues = parse_output(SAMPLE, Path::new("/scan/app")).unwrap();
        assert_eq!(issues.len(), 2);

        let first = &issues[0];
        assert_eq!(first.source_file, "views.py");
        assert_eq!(first.line_number, 42);
        assert_eq!(first.line_range, (42, 44));
        assert_eq!(first.severity, Level::High);
        assert_eq!(first.confidence, Level::Medium);
        assert_eq!(first.category, "hashlib_insecure_functions");
        assert_eq!(first.backend_name, "bandit");

        // 알 수 없는 신뢰도 어휘는 MEDIUM으로 정규화
        let second = &issues[1];
        assert_eq!(second.confidence, Level::Medium);
        // 단일 원소 line_range는 해당 줄로 접힘
        assert_eq!(second.line_range, (7, 7));
    }

    #[test]
    fn empty_results_parses_to_empty_vec() {
        let issues = parse_output(r#"{"results": []}"#, Path::new("/scan")).unwrap();
        assert!(issues.is_empty());
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = parse_output("not json at all", Path::new("/scan")).unwrap_err();
        assert!(matches!(err, BackendError::ParseFailed { .. }));
    }

    #[test]
    fn missing_line_range_falls_back_to_line_number() {
        let raw = r#"{"results": [{
            "filename": "a.py",
            "line_number": 3,
            "issue_text": "x",
            "issue_severity": "MEDIUM",
            "issue_confidence": "HIGH",
            "test_name": "t"
        }]}"#;
        let issues = parse_output(raw, Path::new("/scan")).unwrap();
        assert_eq!(issues[0].line_range, (3, 3));
    }

    #[test]
    fn run_without_python_files_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.js"), "//").unwrap();

        let report = BanditBackend::new().run(dir.path());
        assert!(report.status.is_ok());
        assert!(report.issues.is_empty());
        assert_eq!(report.raw_output.as_deref(), Some("no Python files in target"));
    }
}
