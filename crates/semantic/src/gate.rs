//! 어드미션 게이트 계측
//!
//! [`GateMeter`]는 동시 진행 중인 원격 요청 수의 현재값과 최고값을
//! 기록합니다. 게이트 상한이 실제로 지켜지는지 테스트로 검증하기 위한
//! 관측 장치이며, 제한 자체는 세마포어가 담당합니다.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 동시 요청 수 계측기
#[derive(Debug, Default)]
pub struct GateMeter {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl GateMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 게이트 통과를 기록하고, drop 시 퇴장을 기록하는 가드를 반환합니다.
    pub fn enter(self: &Arc<Self>) -> GatePass {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        GatePass {
            meter: Arc::clone(self),
        }
    }

    /// 현재 진행 중인 요청 수
    pub fn current(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }

    /// 관측된 최대 동시 요청 수
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// 게이트 통과 가드. drop 시 현재 카운트를 감소시킵니다.
#[derive(Debug)]
pub struct GatePass {
    meter: Arc<GateMeter>,
}

impl Drop for GatePass {
    fn drop(&mut self) {
        self.meter.current.fetch_sub(1, Ordering::SeqCst);
    }
}
