//! 심각도/신뢰도 정규화
//!
//! 각 백엔드의 네이티브 어휘를 공유 3단계 척도로 변환합니다.
//! 알 수 없는 값은 버리지 않고 보수적 기본값으로 정규화합니다:
//! 심각도는 LOW, 신뢰도는 MEDIUM.

use std::path::Path;

use omniscan_core::Level;
use tracing::warn;

/// 네이티브 심각도 단어를 정규화합니다. 알 수 없는 값은 LOW.
pub fn severity_from_label(backend: &str, raw: &str) -> Level {
    match Level::from_str_loose(raw) {
        Some(level) => level,
        None => {
            warn!(backend, raw, "unknown severity label, defaulting to LOW");
            Level::Low
        }
    }
}

/// 네이티브 신뢰도 단어를 정규화합니다. 알 수 없는 값은 MEDIUM.
pub fn confidence_from_label(backend: &str, raw: &str) -> Level {
    match Level::from_str_loose(raw) {
        Some(level) => level,
        None => {
            warn!(backend, raw, "unknown confidence label, defaulting to MEDIUM");
            Level::Medium
        }
    }
}

/// 백분율 신뢰도(vulture 형식)를 정규화합니다.
///
/// 90% 이상 HIGH, 60% 이상 MEDIUM, 그 외 LOW.
pub fn level_from_percent(percent: u8) -> Level {
    match percent {
        90..=100 => Level::High,
        60..=89 => Level::Medium,
        _ => Level::Low,
    }
}

/// eslint 정수 심각도(1 = warning, 2 = error)를 정규화합니다.
/// 범위 밖 값은 LOW.
pub fn level_from_eslint_severity(raw: i64) -> Level {
    match raw {
        2 => Level::High,
        1 => Level::Medium,
        _ => Level::Low,
    }
}

/// 절대 경로를 스캔 루트 기준 상대 경로 문자열로 변환합니다.
///
/// 루트 밖 경로(도구가 절대 경로를 그대로 보고하는 경우 등)는
/// 원본 경로를 그대로 사용합니다.
pub fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
