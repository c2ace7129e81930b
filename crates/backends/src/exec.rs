//! 외부 도구 실행 헬퍼
//!
//! 모든 프로세스 어댑터가 공유하는 실행 로직입니다. 블로킹 호출이므로
//! 오케스트레이터의 `spawn_blocking` 안에서만 사용해야 합니다.

use std::path::Path;
use std::process::Command;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::BackendError;

/// 외부 도구 실행 결과
#[derive(Debug)]
pub struct ToolOutput {
    /// 표준 출력 (UTF-8 손실 변환)
    pub stdout: String,
    /// 표준 에러 (UTF-8 손실 변환)
    pub stderr: String,
    /// 종료 코드. 시그널 종료 등으로 코드가 없으면 `None`
    pub exit_code: Option<i32>,
}

/// 외부 도구를 실행하고 출력을 수집합니다.
///
/// 바이너리가 PATH에 없으면 [`BackendError::ToolMissing`]을 반환합니다.
/// 종료 코드 해석은 도구마다 다르므로 호출자 책임입니다
/// (다수의 스캐너가 발견이 있을 때 비정상 종료 코드를 씁니다).
pub fn run_tool(
    tool: &str,
    args: &[&str],
    working_dir: Option<&Path>,
) -> Result<ToolOutput, BackendError> {
    let mut command = Command::new(tool);
    command.args(args);
    if let Some(dir) = working_dir {
        command.current_dir(dir);
    }

    debug!(tool, ?args, "running external scanner");

    let output = command.output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BackendError::ToolMissing {
                tool: tool.to_owned(),
            }
        } else {
            BackendError::ExecFailed {
                tool: tool.to_owned(),
                reason: e.to_string(),
            }
        }
    })?;

    Ok(ToolOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code(),
    })
}

/// 대상 디렉터리에 주어진 확장자의 파일이 하나라도 있는지 검사합니다.
///
/// 적용 가능한 파일이 없는 백엔드는 도구를 실행하지 않고
/// 결과 없는 정상 보고서를 반환하기 위한 사전 검사입니다.
pub fn has_matching_files(target: &Path, extensions: &[&str]) -> bool {
    WalkDir::new(target)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .any(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.contains(&ext))
        })
}

/// 대상 디렉터리에 특정 이름의 파일이 있는지 검사합니다 (깊이 1).
///
/// `package.json` 같은 매니페스트 존재 확인에 사용합니다.
pub fn has_file_named(target: &Path, name: &str) -> bool {
    target.join(name).is_file()
}
