//! 분석 프롬프트 구성

/// 시스템 프롬프트. 응답을 엄격한 JSON 배열로 제한합니다.
pub const SYSTEM_PROMPT: &str = "\
You are a static-analysis engine reviewing a single source file for \
security vulnerabilities, logic errors, and risky patterns that \
rule-based linters miss.

Respond with a JSON array only, no prose and no markdown fences. Each \
element must be an object with fields: line (1-based integer), end_line \
(optional integer), message (string), severity (high|medium|low), \
confidence (high|medium|low), category (short snake_case tag), snippet \
(optional string), suggested_fix (optional string), explanation \
(optional string). Report an empty array [] when the file is clean.";

/// 파일 하나에 대한 사용자 프롬프트를 구성합니다.
///
/// `content`는 호출 전에 이미 상한 길이로 잘려 있어야 합니다.
pub fn build_user_prompt(relative_path: &str, content: &str) -> String {
    format!("File: {relative_path}\n\n```\n{content}\n```")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_prompt_names_the_file() {
        let prompt = build_user_prompt("src/auth.py", "def login(): pass");
        assert!(prompt.starts_with("File: src/auth.py"));
        assert!(prompt.contains("def login(): pass"));
    }

    #[test]
    fn system_prompt_demands_json_array() {
        assert!(SYSTEM_PROMPT.contains("JSON array"));
    }
}
