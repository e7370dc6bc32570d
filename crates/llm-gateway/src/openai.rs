use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::errors::GatewayError;
use crate::gateway::{ExecuteOptions, LlmBackend, ResponseShape};

const BACKEND: &str = "openai";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Tried in order; a 429 moves on to the next key.
    pub api_keys: Vec<String>,
    pub model: String,
    pub api_base: String,
    pub temperature: f32,
    pub max_output_tokens: Option<u32>,
    pub timeout: Duration,
}

pub struct OpenAiBackend {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiBackend {
    pub fn new(config: OpenAiConfig) -> Result<Self, GatewayError> {
        if config.api_keys.is_empty() {
            return Err(GatewayError::Configuration(
                "missing OpenAI API key".to_string(),
            ));
        }
        let client = build_client(config.timeout)?;
        Ok(Self { client, config })
    }

    fn request_body(&self, prompt: &str, options: &ExecuteOptions) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_output_tokens,
            response_format: options
                .response_shape
                .as_ref()
                .map(ResponseFormat::json_schema),
            messages: chat_messages(prompt, options),
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
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
        let body = self.request_body(prompt, options);

        let mut last_error: Option<GatewayError> = None;
        for (index, key) in self.config.api_keys.iter().enumerate() {
            let response = match self.client.post(&url).bearer_auth(key).json(&body).send().await
            {
                Ok(resp) => resp,
                Err(err) => {
                    last_error = Some(GatewayError::transport(BACKEND, err));
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<response unavailable>".to_string());
                if status.as_u16() == 429 {
                    let friendly = openai_rate_limit_message(&text);
                    if index + 1 < self.config.api_keys.len() {
                        warn!(
                            target: "openai",
                            message = %friendly,
                            attempt = index + 1,
                            remaining = self.config.api_keys.len() - index - 1,
                            "OpenAI rate limited request; switching API key"
                        );
                        last_error = Some(GatewayError::RateLimited {
                            backend: BACKEND,
                            message: friendly,
                        });
                        continue;
                    }
                    return Err(GatewayError::RateLimited {
                        backend: BACKEND,
                        message: friendly,
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
            return first_choice_text(BACKEND, response);
        }

        Err(last_error.unwrap_or_else(|| {
            GatewayError::Configuration("OpenAI request exhausted all API keys".to_string())
        }))
    }
}

pub(crate) fn build_client(timeout: Duration) -> Result<Client, GatewayError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| GatewayError::Configuration(format!("failed to build HTTP client: {err}")))
}

pub(crate) fn chat_messages(prompt: &str, options: &ExecuteOptions) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = options.system_prompt.as_ref() {
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: system.clone(),
        });
    }
    messages.push(ChatMessage {
        role: "user".to_string(),
        content: prompt.to_string(),
    });
    messages
}

pub(crate) fn first_choice_text(
    backend: &'static str,
    response: ChatCompletionResponse,
) -> Result<String, GatewayError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .and_then(|content| content.into_text())
        .ok_or(GatewayError::EmptyResponse { backend })
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest {
    pub model: String,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ResponseFormat {
    JsonObject,
    JsonSchema { json_schema: JsonSchemaFormat },
}

impl ResponseFormat {
    fn json_schema(shape: &ResponseShape) -> Self {
        ResponseFormat::JsonSchema {
            json_schema: JsonSchemaFormat {
                name: shape.name.clone(),
                schema: shape.schema.clone(),
                strict: false,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonSchemaFormat {
    name: String,
    schema: Value,
    strict: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    #[serde(default)]
    content: Option<ChatCompletionContent>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChatCompletionContent {
    Text(String),
    Parts(Vec<ChatCompletionPart>),
}

impl ChatCompletionContent {
    fn into_text(self) -> Option<String> {
        let text = match self {
            ChatCompletionContent::Text(value) => value,
            ChatCompletionContent::Parts(parts) => parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("\n"),
        };
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorEnvelope {
    error: OpenAiErrorMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorMessage {
    message: Option<String>,
}

fn openai_rate_limit_message(raw: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<OpenAiErrorEnvelope>(raw) {
        if let Some(message) = envelope.error.message {
            return format!(
                "OpenAI rate limit exceeded: {}. Please retry later or configure a higher tier.",
                message.trim()
            );
        }
    }
    "OpenAI rate limit exceeded; please retry later or reduce usage.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn backend() -> OpenAiBackend {
        OpenAiBackend::new(OpenAiConfig {
            api_keys: vec!["sk-test".into()],
            model: "gpt-4o-mini".into(),
            api_base: "http://localhost:9".into(),
            temperature: 0.0,
            max_output_tokens: None,
            timeout: Duration::from_secs(1),
        })
        .expect("backend")
    }

    #[test]
    fn request_carries_system_prompt_and_json_schema() {
        let options = ExecuteOptions::new()
            .with_system_prompt("be terse")
            .with_response_shape(ResponseShape::new("query", json!({"type": "object"})))
            .with_prefill("{");
        let body = serde_json::to_value(backend().request_body("find it", &options)).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "gpt-4o-mini",
                "temperature": 0.0,
                "response_format": {
                    "type": "json_schema",
                    "json_schema": { "name": "query", "schema": {"type": "object"}, "strict": false }
                },
                "messages": [
                    { "role": "system", "content": "be terse" },
                    { "role": "user", "content": "find it" }
                ]
            })
        );
    }

    #[test]
    fn requires_at_least_one_key() {
        let err = OpenAiBackend::new(OpenAiConfig {
            api_keys: Vec::new(),
            model: "m".into(),
            api_base: "http://localhost".into(),
            temperature: 0.0,
            max_output_tokens: None,
            timeout: Duration::from_secs(1),
        })
        .err()
        .expect("error");
        assert!(err.is_configuration());
    }

    #[test]
    fn content_parts_are_joined() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "content": [{ "type": "text", "text": "{\"a\":" }, { "type": "text", "text": "1}" }] } }]
        }))
        .unwrap();
        assert_eq!(first_choice_text(BACKEND, response).unwrap(), "{\"a\":\n1}");

        let empty: ChatCompletionResponse =
            serde_json::from_value(json!({ "choices": [{ "message": { "content": null } }] }))
                .unwrap();
        assert_eq!(
            first_choice_text(BACKEND, empty).unwrap_err(),
            GatewayError::EmptyResponse { backend: BACKEND }
        );
    }

    #[test]
    fn rate_limit_message_prefers_vendor_text() {
        let raw = r#"{"error":{"message":"Too many requests ","type":"rate_limit"}}"#;
        assert!(openai_rate_limit_message(raw).contains("Too many requests."));
        assert!(openai_rate_limit_message("garbage").contains("retry later"));
    }
}
