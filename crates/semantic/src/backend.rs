//! 레지스트리 연결용 원격 어댑터 구현

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use omniscan_core::{BackendReport, BoxFuture, RemoteAdapter, SemanticConfig};

use crate::error::SemanticError;
use crate::provider::{AnalysisProvider, HttpProvider};
use crate::scanner::SemanticScanner;

/// `semantic` 이름으로 등록되는 원격 백엔드
pub struct SemanticBackend {
    scanner: SemanticScanner,
}

impl SemanticBackend {
    /// 설정에서 HTTP 제공자를 구성해 백엔드를 만듭니다.
    ///
    /// API 키 환경변수가 비어 있으면 여기서 실패합니다. 스캔 도중이
    /// 아니라 레지스트리 구성 시점에 드러나는 편이 낫습니다.
    pub fn from_config(config: &SemanticConfig) -> Result<Self, SemanticError> {
        let provider = Arc::new(HttpProvider::from_config(config)?);
        Ok(Self::with_provider(config.clone(), provider))
    }

    /// 임의 제공자(mock 포함)로 백엔드를 만듭니다.
    pub fn with_provider(config: SemanticConfig, provider: Arc<dyn AnalysisProvider>) -> Self {
        Self {
            scanner: SemanticScanner::new(config, provider),
        }
    }

    /// 내부 스캐너 (게이트 계측기 접근용)
    pub fn scanner(&self) -> &SemanticScanner {
        &self.scanner
    }
}

impl RemoteAdapter for SemanticBackend {
    fn name(&self) -> &str {
        "semantic"
    }

    fn description(&self) -> &str {
        "remote LLM-backed semantic analyzer"
    }

    fn run<'a>(
        &'a self,
        target: &'a Path,
        cancel: CancellationToken,
    ) -> BoxFuture<'a, BackendReport> {
        Box::pin(self.scanner.analyze_directory(target, cancel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockProvider;

    #[tokio::test]
    async fn runs_as_remote_adapter() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.py"), "pass").unwrap();

        let config = SemanticConfig {
            file_extensions: vec!["py".to_owned()],
            ..SemanticConfig::default()
        };
        let backend = SemanticBackend::with_provider(config, Arc::new(MockProvider::clean()));

        assert_eq!(backend.name(), "semantic");
        let report = backend.run(dir.path(), CancellationToken::new()).await;
        assert!(report.status.is_ok());
    }
}
