//! npm-audit 어댑터 — 의존성 취약점
//!
//! `npm audit --json` 을 대상 디렉터리에서 실행합니다. 취약점은 코드 줄이
//! 아니라 의존성 단위이므로 `line_number` 0, `source_file`은
//! `package.json`으로 고정합니다. npm audit은 취약점이 있으면 종료 코드
//! 1을 반환합니다.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use omniscan_core::{BackendAdapter, BackendReport, Issue};

use crate::error::BackendError;
use crate::exec::{has_file_named, run_tool};
use crate::norm::{confidence_from_label, severity_from_label};

const TOOL: &str = "npm";
const BACKEND_NAME: &str = "npm-audit";

/// npm audit JSON 최상위 구조 (v7+ 형식)
#[derive(Debug, Deserialize)]
struct AuditOutput {
    #[serde(default)]
    vulnerabilities: BTreeMap<String, Vulnerability>,
}

#[derive(Debug, Deserialize)]
struct Vulnerability {
    severity: String,
    #[serde(default)]
    via: Vec<ViaEntry>,
    #[serde(default)]
    range: Option<String>,
}

/// `via`는 문자열(전이 의존성 이름) 또는 advisory 객체가 섞인 배열
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ViaEntry {
    Advisory { title: String },
    Name(String),
}

/// npm-audit 백엔드 어댑터
#[derive(Debug, Default)]
pub struct NpmAuditBackend;

impl NpmAuditBackend {
    pub fn new() -> Self {
        Self
    }
}

impl BackendAdapter for NpmAuditBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn description(&self) -> &str {
        "dependency vulnerability audit (npm audit)"
    }

    fn run(&self, target: &Path) -> BackendReport {
        if !has_file_named(target, "package.json") {
            return BackendReport::clean("no package.json in target");
        }

        let output = match run_tool(TOOL, &["audit", "--json"], Some(target)) {
            Ok(output) => output,
            Err(e) => return BackendReport::error(e.to_string()),
        };

        // 0: 취약점 없음, 1: 취약점 발견. 둘 다 유효한 리포트를 동반함.
        match output.exit_code {
            Some(0 | 1) => {}
            code => {
                return BackendReport::error(format!(
                    "npm audit exited with {code:?}: {}",
                    output.stderr.trim()
                ));
            }
        }

        match parse_output(&output.stdout) {
            Ok(issues) => {
                debug!(count = issues.len(), "npm audit complete");
                BackendReport::from_issues(issues).with_raw_output(output.stdout)
            }
            Err(e) => BackendReport::error(e.to_string()),
        }
    }
}

/// npm audit JSON 출력을 정규화된 이슈 목록으로 변환합니다.
pub fn parse_output(raw: &str) -> Result<Vec<Issue>, BackendError> {
    let parsed: AuditOutput = serde_json::from_str(raw).map_err(|e| BackendError::ParseFailed {
        tool: TOOL.to_owned(),
        reason: e.to_string(),
    })?;

    let issues = parsed
        .vulnerabilities
        .into_iter()
        .map(|(package, vuln)| {
            let advisory = vuln.via.iter().find_map(|v| match v {
                ViaEntry::Advisory { title } => Some(title.as_str()),
                ViaEntry::Name(_) => None,
            });
            let message = match (advisory, vuln.range.as_deref()) {
                (Some(title), Some(range)) => {
                    format!("{package} ({range}): {title}")
                }
                (Some(title), None) => format!("{package}: {title}"),
                (None, Some(range)) => {
                    format!("{package} ({range}): vulnerable dependency")
                }
                (None, None) => format!("{package}: vulnerable dependency"),
            };
            Issue::new(
                "package.json",
                0,
                (0, 0),
                message,
                severity_from_label(BACKEND_NAME, &vuln.severity),
                // advisory가 직접 붙은 취약점은 확정적, 전이 의존성만
                // 있는 경우는 간접 증거
                confidence_from_label(
                    BACKEND_NAME,
                    if advisory.is_some() { "high" } else { "medium" },
                ),
                "dependency_vulnerability",
                String::new(),
                BACKEND_NAME,
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
        "auditReportVersion": 2,
        "vulnerabilities": {
            "lodash": {
                "name": "lodash",
                "severity": "critical",
                "via": [
                    {"title": "Prototype Pollution in lodash", "url": "https://example.invalid/advisory/1"}
                ],
                "range": "<4.17.21"
            },
            "minimist": {
                "name": "minimist",
                "severity": "moderate",
                "via": ["mkdirp"],
                "range": "<1.2.6"
            }
        }
    }"#;

    #[test]
    fn parses_vulnerabilities_map() {
        let issues = parse_output(SAMPLE).unwrap();
        assert_eq!(issues.len(), 2);

        // BTreeMap이므로 패키지 이름 순서 고정
        let lodash = &issues[0];
        assert_eq!(lodash.source_file, "package.json");
        assert_eq!(lodash.line_number, 0);
        assert_eq!(lodash.line_range, (0, 0));
        assert_eq!(lodash.severity, Level::High); // critical → HIGH
        assert_eq!(lodash.confidence, Level::High);
        assert_eq!(lodash.category, "dependency_vulnerability");
        assert!(lodash.message.contains("lodash"));
        assert!(lodash.message.contains("Prototype Pollution"));

        let minimist = &issues[1];
        assert_eq!(minimist.severity, Level::Medium); // moderate → MEDIUM
        assert_eq!(minimist.confidence, Level::Medium); // 전이 의존성만 있음
    }

    #[test]
    fn empty_vulnerabilities_is_empty_list() {
        let issues = parse_output(r#"{"vulnerabilities": {}}"#).unwrap();
        assert!(issues.is_empty());
    }

    #[test]
    fn unknown_severity_defaults_to_low() {
        let raw = r#"{"vulnerabilities": {
            "leftpad": {"severity": "unheard-of", "via": []}
        }}"#;
        let issues = parse_output(raw).unwrap();
        assert_eq!(issues[0].severity, Level::Low);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = parse_output("npm ERR! something").unwrap_err();
        assert!(matches!(err, BackendError::ParseFailed { .. }));
    }

    #[test]
    fn run_without_package_json_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.py"), "pass").unwrap();

        let report = NpmAuditBackend::new().run(dir.path());
        assert!(report.status.is_ok());
        assert!(report.issues.is_empty());
        assert_eq!(report.raw_output.as_deref(), Some("no package.json in target"));
    }
}
