//! 모델 응답 스키마
//!
//! 시맨틱 분석기는 모델에게 엄격한 JSON 배열을 요구합니다. 각 원소는
//! [`SemanticFinding`] 하나입니다. 알 수 없는 심각도/신뢰도 어휘는
//! 보수적 기본값(LOW/MEDIUM)으로 정규화합니다.

use serde::Deserialize;
use tracing::debug;

use omniscan_core::{Issue, Level};

use crate::error::SemanticError;

/// 모델이 보고하는 단일 발견
#[derive(Debug, Deserialize)]
pub struct SemanticFinding {
    /// 1-기반 줄 번호
    pub line: u32,
    /// 범위 종료 줄 (없으면 단일 줄)
    #[serde(default)]
    pub end_line: Option<u32>,
    /// 발견 설명
    pub message: String,
    /// 네이티브 심각도 어휘 (high/medium/low 기대)
    pub severity: String,
    /// 네이티브 신뢰도 어휘
    #[serde(default)]
    pub confidence: String,
    /// 분류 태그
    #[serde(default = "default_category")]
    pub category: String,
    /// 관련 코드 조각
    #[serde(default)]
    pub snippet: String,
    /// 수정 제안
    #[serde(default)]
    pub suggested_fix: Option<String>,
    /// 발견 근거 설명
    #[serde(default)]
    pub explanation: Option<String>,
}

fn default_category() -> String {
    "semantic".to_owned()
}

impl SemanticFinding {
    /// 정규화된 이슈로 변환합니다.
    pub fn into_issue(self, source_file: &str, backend_name: &str) -> Issue {
        let severity = Level::from_str_loose(&self.severity).unwrap_or_else(|| {
            debug!(raw = %self.severity, "unknown severity from model, defaulting to LOW");
            Level::Low
        });
        let confidence = Level::from_str_loose(&self.confidence).unwrap_or_else(|| {
            debug!(raw = %self.confidence, "unknown confidence from model, defaulting to MEDIUM");
            Level::Medium
        });
        let end = self.end_line.unwrap_or(self.line);

        let mut issue = Issue::new(
            source_file,
            self.line,
            (self.line, end),
            self.message,
            severity,
            confidence,
            self.category,
            self.snippet,
            backend_name,
        );
        if let Some(fix) = self.suggested_fix {
            issue = issue.with_suggested_fix(fix);
        }
        if let Some(explanation) = self.explanation {
            issue = issue.with_explanation(explanation);
        }
        issue
    }
}

/// 모델 응답 본문을 발견 목록으로 파싱합니다.
///
/// 모델이 마크다운 코드 펜스로 감싸 보내는 경우가 있어 펜스를 벗겨낸 뒤
/// 엄격한 JSON 배열로 파싱합니다. 배열이 아니면 파싱 에러입니다.
pub fn parse_findings(content: &str) -> Result<Vec<SemanticFinding>, SemanticError> {
    let stripped = strip_code_fence(content.trim());
    serde_json::from_str(stripped).map_err(|e| SemanticError::ResponseParse(e.to_string()))
}

fn strip_code_fence(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("```") else {
        return content;
    };
    // 언어 태그가 붙은 첫 줄 제거 ("```json" 등)
    let rest = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    rest.strip_suffix("```").map(str::trim_end).unwrap_or(rest)
}
