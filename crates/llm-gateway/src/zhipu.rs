use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::warn;

use crate::errors::GatewayError;
use crate::gateway::{ExecuteOptions, LlmBackend};
use crate::openai::{
    build_client, chat_messages, first_choice_text, ChatCompletionRequest, ChatCompletionResponse,
    ResponseFormat,
};

const BACKEND: &str = "zhipu";

/// Configuration for the ZhiPu (GLM) backend.
/// The API is OpenAI-compatible with its endpoint at https://open.bigmodel.cn/api/paas/v4
#[derive(Debug, Clone)]
pub struct ZhipuConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub temperature: f32,
    pub max_output_tokens: Option<u32>,
    pub timeout: Duration,
}

pub struct ZhipuBackend {
    client: Client,
    config: ZhipuConfig,
}

impl ZhipuBackend {
    pub fn new(config: ZhipuConfig) -> Result<Self, GatewayError> {
        if config.api_key.trim().is_empty() {
            return Err(GatewayError::Configuration(
                "missing ZhiPu API key".to_string(),
            ));
        }
        let client = build_client(config.timeout)?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl LlmBackend for ZhipuBackend {
    fn label(&self) -> &'static str {
        BACKEND
    }

    async fn complete(
        &self,
        prompt: &str,
        options: &ExecuteOptions,
    ) -> Result<String, GatewayError> {
        let url = format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        );
        // GLM accepts json_object only.
        let body = ChatCompletionRequest {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_output_tokens,
            response_format: options
                .response_shape
                .as_ref()
                .map(|_| ResponseFormat::JsonObject),
            messages: chat_messages(prompt, options),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| GatewayError::transport(BACKEND, err))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<response unavailable>".to_string());
            if status.as_u16() == 429 {
                warn!(target: "zhipu", raw = %text, "ZhiPu rate limited request");
                return Err(GatewayError::RateLimited {
                    backend: BACKEND,
                    message: "ZhiPu rate limit exceeded; please retry later.".to_string(),
                });
            }
            return Err(GatewayError::Backend {
                backend: BACKEND,
                status: status.as_u16(),
                body: text,
            });
        }

        let response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| GatewayError::invalid_response(BACKEND, err))?;
        first_choice_text(BACKEND, response)
    }
}
