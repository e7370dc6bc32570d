//! Configuration-time backend selection.

use std::{env, fmt, str::FromStr, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::anthropic::{AnthropicBackend, AnthropicConfig};
use crate::errors::GatewayError;
use crate::gateway::LlmBackend;
use crate::mock::{ScriptedBackend, ScriptedReply};
use crate::openai::{OpenAiBackend, OpenAiConfig};
use crate::zhipu::{ZhipuBackend, ZhipuConfig};

pub const OPENAI_KEY_ENV_VARS: &[&str] = &["LOCUS_OPENAI_API_KEY", "OPENAI_API_KEY"];
pub const ANTHROPIC_KEY_ENV_VARS: &[&str] = &[
    "LOCUS_ANTHROPIC_API_KEY",
    "ANTHROPIC_API_KEY",
    "CLAUDE_API_KEY",
];
pub const ZHIPU_KEY_ENV_VARS: &[&str] = &["LOCUS_ZHIPU_API_KEY", "ZHIPU_API_KEY"];

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderSelection {
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    Zhipu,
    Mock,
}

impl ProviderSelection {
    pub fn from_str_case(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "anthropic" | "claude" => Some(Self::Anthropic),
            "zhipu" | "glm" => Some(Self::Zhipu),
            "mock" => Some(Self::Mock),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProviderSelection::OpenAi => "openai",
            ProviderSelection::Anthropic => "anthropic",
            ProviderSelection::Zhipu => "zhipu",
            ProviderSelection::Mock => "mock",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderSelection::OpenAi => "gpt-4o-mini",
            ProviderSelection::Anthropic => "claude-3-5-sonnet-20240620",
            ProviderSelection::Zhipu => "glm-4-flash",
            ProviderSelection::Mock => "scripted",
        }
    }

    pub fn default_api_base(&self) -> &'static str {
        match self {
            ProviderSelection::OpenAi => "https://api.openai.com/v1",
            ProviderSelection::Anthropic => "https://api.anthropic.com/v1",
            ProviderSelection::Zhipu => "https://open.bigmodel.cn/api/paas/v4",
            ProviderSelection::Mock => "",
        }
    }
}

impl fmt::Display for ProviderSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProviderSelection {
    type Err = GatewayError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_str_case(value).ok_or_else(|| {
            GatewayError::Configuration(format!(
                "unknown provider '{value}'; expected openai, anthropic, zhipu or mock"
            ))
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct ProviderConfig {
    pub model: Option<String>,
    pub api_base: Option<String>,
    pub temperature: Option<f32>,
    /// Credential; for OpenAI a comma separated list enables key rotation.
    pub api_key: Option<String>,
    pub max_output_tokens: Option<u32>,
    pub http_timeout: Option<Duration>,
    /// Replies for the scripted backend.
    pub mock_responses: Vec<String>,
}

pub fn build_backend(
    selection: ProviderSelection,
    config: &ProviderConfig,
) -> Result<Arc<dyn LlmBackend>, GatewayError> {
    let model = config
        .model
        .clone()
        .unwrap_or_else(|| selection.default_model().to_string());
    let api_base = config
        .api_base
        .clone()
        .unwrap_or_else(|| selection.default_api_base().to_string());
    let temperature = config.temperature.unwrap_or(0.0);
    let timeout = config.http_timeout.unwrap_or(DEFAULT_HTTP_TIMEOUT);

    let backend: Arc<dyn LlmBackend> = match selection {
        ProviderSelection::OpenAi => Arc::new(OpenAiBackend::new(OpenAiConfig {
            api_keys: resolve_api_keys(&config.api_key, OPENAI_KEY_ENV_VARS)?,
            model: model.clone(),
            api_base,
            temperature,
            max_output_tokens: config.max_output_tokens,
            timeout,
        })?),
        ProviderSelection::Anthropic => Arc::new(AnthropicBackend::new(AnthropicConfig {
            api_key: resolve_api_key(&config.api_key, ANTHROPIC_KEY_ENV_VARS)?,
            model: model.clone(),
            api_base,
            temperature,
            max_tokens: config.max_output_tokens.unwrap_or(2_000),
            timeout,
        })?),
        ProviderSelection::Zhipu => Arc::new(ZhipuBackend::new(ZhipuConfig {
            api_key: resolve_api_key(&config.api_key, ZHIPU_KEY_ENV_VARS)?,
            model: model.clone(),
            api_base,
            temperature,
            max_output_tokens: config.max_output_tokens,
            timeout,
        })?),
        ProviderSelection::Mock => Arc::new(ScriptedBackend::new(
            config.mock_responses.iter().cloned().map(ScriptedReply::Text),
        )),
    };
    info!(provider = selection.label(), model = %model, "model backend configured");
    Ok(backend)
}

fn resolve_api_key(
    source: &Option<String>,
    env_keys: &'static [&'static str],
) -> Result<String, GatewayError> {
    if let Some(value) = source.as_deref().and_then(sanitize_secret) {
        return Ok(value);
    }
    for key in env_keys {
        if let Some(value) = env::var(key).ok().and_then(|raw| sanitize_secret(&raw)) {
            return Ok(value);
        }
    }
    Err(GatewayError::MissingApiKey { env_keys })
}

fn resolve_api_keys(
    source: &Option<String>,
    env_keys: &'static [&'static str],
) -> Result<Vec<String>, GatewayError> {
    let joined = resolve_api_key(source, env_keys)?;
    let keys: Vec<String> = joined.split(',').filter_map(sanitize_secret).collect();
    if keys.is_empty() {
        return Err(GatewayError::MissingApiKey { env_keys });
    }
    Ok(keys)
}

/// Trimmed, unquoted secret, or `None` for blank and placeholder values.
pub fn sanitize_secret(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let unquoted = trimmed.trim_matches(|c| c == '"' || c == '\'');
    if unquoted.is_empty() {
        return None;
    }
    if !unquoted.chars().any(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    let lowered = unquoted.to_ascii_lowercase();
    if matches!(
        lowered.as_str(),
        "your-api-key" | "replace-me" | "changeme" | "set-me" | "todo"
    ) {
        return None;
    }
    Some(unquoted.to_string())
}

/// Display form of a credential: a short prefix and the length.
pub fn redact_secret(value: &str) -> String {
    let prefix: String = value.chars().take(4).collect();
    format!("{prefix}… ({} chars)", value.chars().count())
}
