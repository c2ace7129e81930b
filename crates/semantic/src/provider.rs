//! 분석 제공자 trait 및 HTTP 구현
//!
//! [`AnalysisProvider`]는 파일 하나를 원격 모델에 보내고 응답 본문을
//! 돌려받는 경계입니다. 실제 배포에서는 [`HttpProvider`]가 OpenAI 호환
//! chat-completions API를 호출하고, 테스트에서는 mock 구현이 이 자리를
//! 대신합니다.

use serde::{Deserialize, Serialize};
use tracing::debug;

use omniscan_core::{BoxFuture, SemanticConfig};

use crate::error::SemanticError;
use crate::prompts;

/// 파일 하나에 대한 분석 요청
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// 스캔 루트 기준 상대 경로 (프롬프트와 결과 귀속에 사용)
    pub relative_path: String,
    /// 상한 길이로 잘린 파일 내용
    pub content: String,
}

/// 모델 응답
#[derive(Debug, Clone)]
pub struct AnalysisResponse {
    /// 모델이 반환한 본문 (JSON 배열 기대)
    pub content: String,
}

/// 원격 분석 제공자
///
/// dyn 호환을 위해 [`BoxFuture`]를 반환합니다. 구현체는 요청 단위
/// 전송만 책임지며, 동시성 제한과 타임아웃은 호출자(스캐너)가
/// 적용합니다.
pub trait AnalysisProvider: Send + Sync {
    /// 사용 중인 모델 이름
    fn model(&self) -> &str;

    /// 파일 하나를 분석 요청합니다.
    fn analyze<'a>(
        &'a self,
        request: &'a AnalysisRequest,
    ) -> BoxFuture<'a, Result<AnalysisResponse, SemanticError>>;
}

// --- OpenAI 호환 chat-completions 와이어 형식 ---

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// OpenAI 호환 API를 호출하는 제공자
pub struct HttpProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl HttpProvider {
    /// 설정에서 제공자를 생성합니다.
    ///
    /// API 키는 설정이 가리키는 환경변수에서 읽습니다. 키 자체는 설정
    /// 파일이나 로그에 절대 나타나지 않습니다.
    pub fn from_config(config: &SemanticConfig) -> Result<Self, SemanticError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| SemanticError::MissingApiKey {
                env: config.api_key_env.clone(),
            })?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
        })
    }
}

impl AnalysisProvider for HttpProvider {
    fn model(&self) -> &str {
        &self.model
    }

    fn analyze<'a>(
        &'a self,
        request: &'a AnalysisRequest,
    ) -> BoxFuture<'a, Result<AnalysisResponse, SemanticError>> {
        Box::pin(async move {
            let user_prompt = prompts::build_user_prompt(&request.relative_path, &request.content);
            let body = ChatRequest {
                model: &self.model,
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: prompts::SYSTEM_PROMPT,
                    },
                    ChatMessage {
                        role: "user",
                        content: &user_prompt,
                    },
                ],
                temperature: 0.0,
            };

            debug!(file = %request.relative_path, model = %self.model, "sending analysis request");

            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(SemanticError::Api {
                    status: status.as_u16(),
                    body: body.chars().take(200).collect(),
                });
            }

            let parsed: ChatResponse = response
                .json()
                .await
                .map_err(|e| SemanticError::ResponseParse(e.to_string()))?;

            let content = parsed
                .choices
                .into_iter()
                .next()
                .map(|c| c.message.content)
                .ok_or_else(|| {
                    SemanticError::ResponseParse("response contained no choices".to_owned())
                })?;

            Ok(AnalysisResponse { content })
        })
    }
}
