//! 테스트용 mock 제공자
//!
//! 통합 테스트(엔진 포함)에서 실제 API 없이 스캐너 동작을 검증하기 위해
//! 일반 모듈로 노출합니다. 지연·실패 주입과 자체 동시성 기록을
//! 지원합니다.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use omniscan_core::BoxFuture;

use crate::error::SemanticError;
use crate::gate::GateMeter;
use crate::provider::{AnalysisProvider, AnalysisRequest, AnalysisResponse};

/// 고정 응답을 돌려주는 mock 제공자
pub struct MockProvider {
    response: String,
    delay: Duration,
    fail: bool,
    meter: Arc<GateMeter>,
    calls: AtomicU64,
}

impl MockProvider {
    /// 모든 요청에 같은 본문으로 응답하는 제공자를 만듭니다.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            delay: Duration::ZERO,
            fail: false,
            meter: Arc::new(GateMeter::new()),
            calls: AtomicU64::new(0),
        }
    }

    /// 발견 없는 깨끗한 응답을 주는 제공자
    pub fn clean() -> Self {
        Self::new("[]")
    }

    /// 모든 요청이 실패하는 제공자
    pub fn failing() -> Self {
        let mut provider = Self::new("");
        provider.fail = true;
        provider
    }

    /// 요청마다 주어진 지연을 추가합니다 (동시성 검증용).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// 제공자 내부에서 관측한 동시 요청 계측기
    pub fn meter(&self) -> Arc<GateMeter> {
        Arc::clone(&self.meter)
    }

    /// 받은 요청 총수
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AnalysisProvider for MockProvider {
    fn model(&self) -> &str {
        "mock-model"
    }

    fn analyze<'a>(
        &'a self,
        _request: &'a AnalysisRequest,
    ) -> BoxFuture<'a, Result<AnalysisResponse, SemanticError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let _pass = self.meter.enter();

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            if self.fail {
                return Err(SemanticError::Api {
                    status: 500,
                    body: "injected failure".to_owned(),
                });
            }

            Ok(AnalysisResponse {
                content: self.response.clone(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_canned_response_and_counts_calls() {
        let provider = MockProvider::new("[]");
        let request = AnalysisRequest {
            relative_path: "a.py".to_owned(),
            content: "pass".to_owned(),
        };

        let response = provider.analyze(&request).await.unwrap();
        assert_eq!(response.content, "[]");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn failing_provider_returns_api_error() {
        let provider = MockProvider::failing();
        let request = AnalysisRequest {
            relative_path: "a.py".to_owned(),
            content: "pass".to_owned(),
        };

        let err = provider.analyze(&request).await.unwrap_err();
        assert!(matches!(err, SemanticError::Api { status: 500, .. }));
    }
}
