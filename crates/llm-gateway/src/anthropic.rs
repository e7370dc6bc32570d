use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::GatewayError;
use crate::gateway::{ExecuteOptions, LlmBackend};
use crate::openai::build_client;

const BACKEND: &str = "anthropic";
const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

/// Messages API backend. Response shapes travel in the system prompt; prefill is sent as the
/// start of the assistant turn and prepended to the reply.
pub struct AnthropicBackend {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicBackend {
    pub fn new(config: AnthropicConfig) -> Result<Self, GatewayError> {
        if config.api_key.trim().is_empty() {
            return Err(GatewayError::Configuration(
                "missing Anthropic API key".to_string(),
            ));
        }
        let client = build_client(config.timeout)?;
        Ok(Self { client, config })
    }

    fn request_body(&self, prompt: &str, options: &ExecuteOptions) -> MessagesRequest {
        let mut system = options.system_prompt.clone().unwrap_or_default();
        if let Some(shape) = options.response_shape.as_ref() {
            if !system.is_empty() {
                system.push_str("\n\n");
            }
            system.push_str(&format!(
                "Respond with a single JSON object ({}) matching this JSON schema:\n{}",
                shape.name,
                shape.pretty_schema()
            ));
        }

        let mut messages = vec![Message::text("user", prompt)];
        if let Some(prefill) = options.prefill.as_ref().filter(|p| !p.is_empty()) {
            messages.push(Message::text("assistant", prefill));
        }

        MessagesRequest {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            system: (!system.is_empty()).then_some(system),
            messages,
        }
    }
}

#[async_trait]
impl LlmBackend for AnthropicBackend {
    fn label(&self) -> &'static str {
        BACKEND
    }

    async fn complete(
        &self,
        prompt: &str,
        options: &ExecuteOptions,
    ) -> Result<String, GatewayError> {
        let body = self.request_body(prompt, options);
        let url = format!("{}/messages", self.config.api_base.trim_end_matches('/'));

        let response = self
            .client
            .post(url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
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
                return Err(GatewayError::RateLimited {
                    backend: BACKEND,
                    message: format!("Anthropic rate limit exceeded: {}", text.trim()),
                });
            }
            return Err(GatewayError::Backend {
                backend: BACKEND,
                status: status.as_u16(),
                body: text,
            });
        }

        let response: MessagesResponse = response
            .json()
            .await
            .map_err(|err| GatewayError::invalid_response(BACKEND, err))?;
        let content = response.joined_text();
        if content.trim().is_empty() {
            return Err(GatewayError::EmptyResponse { backend: BACKEND });
        }

        match options.prefill.as_deref() {
            Some(prefill) if !content.trim_start().starts_with(prefill) => {
                Ok(format!("{prefill}{content}"))
            }
            _ => Ok(content),
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: Vec<MessageContent>,
}

impl Message {
    fn text(role: &str, text: &str) -> Self {
        Self {
            role: role.to_string(),
            content: vec![MessageContent {
                kind: "text".to_string(),
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct MessageContent {
    #[serde(rename = "type")]
    kind: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseContent>,
}

impl MessagesResponse {
    fn joined_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ResponseShape;
    use serde_json::json;

    fn backend() -> AnthropicBackend {
        AnthropicBackend::new(AnthropicConfig {
            api_key: "key".into(),
            model: "claude-3-5-sonnet-20240620".into(),
            api_base: "http://localhost:9".into(),
            temperature: 0.0,
            max_tokens: 2_000,
            timeout: Duration::from_secs(1),
        })
        .expect("backend")
    }

    #[test]
    fn schema_goes_into_system_prompt_and_prefill_into_assistant_turn() {
        let options = ExecuteOptions::new()
            .with_system_prompt("You classify elements.")
            .with_response_shape(ResponseShape::new("query", json!({"type": "object"})))
            .with_prefill("{");
        let body = serde_json::to_value(backend().request_body("the heading", &options)).unwrap();

        let system = body["system"].as_str().unwrap();
        assert!(system.starts_with("You classify elements.\n\n"));
        assert!(system.contains("\"type\": \"object\""));
        assert_eq!(body["max_tokens"], 2_000);
        assert_eq!(
            body["messages"],
            json!([
                { "role": "user", "content": [{ "type": "text", "text": "the heading" }] },
                { "role": "assistant", "content": [{ "type": "text", "text": "{" }] }
            ])
        );
    }

    #[test]
    fn no_system_field_without_prompt_or_shape() {
        let body = serde_json::to_value(backend().request_body("x", &ExecuteOptions::new())).unwrap();
        assert!(body.get("system").is_none());
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }
}
