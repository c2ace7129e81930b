//! 백엔드 어댑터 trait 정의
//!
//! 모든 분석 백엔드는 두 가지 형태 중 하나로 구현됩니다:
//!
//! - [`BackendAdapter`]: 외부 프로세스를 실행하고 출력을 파싱하는 동기 어댑터.
//!   블로킹 I/O를 수행하므로 오케스트레이터가 블로킹 전용 스레드에서 호출합니다.
//! - [`RemoteAdapter`]: 원격 API를 호출하는 비동기 어댑터.
//!   dyn 호환성을 위해 [`BoxFuture`]를 반환합니다.
//!
//! 어댑터는 실패를 스스로 보고합니다. 도구 미설치, 파싱 실패 등은
//! [`BackendReport`]의 에러 상태로 표현하고, panic은 오케스트레이터가
//! 격리합니다.

use std::path::Path;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::types::BackendReport;

/// dyn 호환 trait에서 async 메서드를 표현하기 위한 boxed future 별칭
pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// 백엔드 실행 방식 구분
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// 로컬 외부 프로세스 실행
    Process,
    /// 원격 API 호출
    Remote,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Process => write!(f, "process"),
            BackendKind::Remote => write!(f, "remote"),
        }
    }
}

/// 프로세스 기반 백엔드 어댑터
///
/// 구현체는 외부 스캐너 바이너리를 실행하고 네이티브 출력을
/// 정규화된 [`BackendReport`]로 변환합니다.
///
/// # 계약
/// - `run`은 블로킹 호출입니다. 오케스트레이터가 `spawn_blocking`으로 감쌉니다.
/// - 도구가 설치되어 있지 않으면 에러 상태의 리포트를 반환합니다 (panic 금지).
/// - 적용 가능한 파일이 없으면 결과 없는 정상 리포트를 반환합니다.
pub trait BackendAdapter: Send + Sync {
    /// 백엔드 고유 이름 (레지스트리 키, 결과의 `backend_name`)
    fn name(&self) -> &str;

    /// 사람이 읽을 한 줄 설명
    fn description(&self) -> &str;

    /// 실행 방식
    fn kind(&self) -> BackendKind {
        BackendKind::Process
    }

    /// 백엔드별 실행 시간 상한. 초과 시 오케스트레이터가 타임아웃 처리합니다.
    fn timeout(&self) -> Duration {
        Duration::from_secs(30)
    }

    /// 대상 디렉터리를 스캔하고 정규화된 리포트를 반환합니다.
    fn run(&self, target: &Path) -> BackendReport;
}

/// 원격 API 기반 백엔드 어댑터
///
/// 구현체는 파일 단위로 원격 분석 요청을 보내고 결과를 취합합니다.
/// 동시 요청 수 제한과 취소 전파는 구현체 책임입니다.
pub trait RemoteAdapter: Send + Sync {
    /// 백엔드 고유 이름
    fn name(&self) -> &str;

    /// 사람이 읽을 한 줄 설명
    fn description(&self) -> &str;

    /// 실행 방식
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    /// 대상 디렉터리를 비동기로 분석합니다.
    ///
    /// `cancel`이 트리거되면 새 요청 제출을 멈추고
    /// 진행 중인 요청의 결과만 수거한 뒤 반환해야 합니다.
    fn run<'a>(&'a self, target: &'a Path, cancel: CancellationToken)
    -> BoxFuture<'a, BackendReport>;
}
