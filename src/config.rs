//! Effective configuration: YAML file, then `LOCUS_*` environment overrides, then CLI flags.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use locus_action_locator::EngineConfig;
use locus_llm_gateway::{redact_secret, ProviderConfig, ProviderSelection};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SCOPE: &str = "default";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub llm: LlmSettings,
    pub cache: CacheSettings,
    pub resolution: ResolutionSettings,
    /// Replies for the `mock` provider, consumed in order.
    pub mock_responses: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: ProviderSelection,
    pub model: Option<String>,
    pub api_base: Option<String>,
    pub api_key: Option<String>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    /// Bound on the primary resolution call.
    pub request_timeout_ms: u64,
    pub http_timeout_secs: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    /// Directory holding one `<scope>.json` file per scope.
    pub dir: Option<PathBuf>,
    /// Explicit cache file; wins over `dir` and scope.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ResolutionSettings {
    pub simplify: bool,
    pub max_retries: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: ProviderSelection::default(),
            model: None,
            api_base: None,
            api_key: None,
            temperature: None,
            max_output_tokens: None,
            request_timeout_ms: EngineConfig::DEFAULT_PRIMARY_TIMEOUT.as_millis() as u64,
            http_timeout_secs: None,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            path: None,
        }
    }
}

impl Default for ResolutionSettings {
    fn default() -> Self {
        Self {
            simplify: true,
            max_retries: locus_agent_core::DEFAULT_MAX_RETRIES,
        }
    }
}

impl Config {
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse config file")
    }

    /// Apply `LOCUS_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| env::var(key).ok())
    }

    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = get("LOCUS_LLM_PROVIDER") {
            self.llm.provider = value
                .parse()
                .with_context(|| format!("Invalid LOCUS_LLM_PROVIDER '{value}'"))?;
        }
        if let Some(value) = get("LOCUS_LLM_MODEL") {
            self.llm.model = Some(value.trim().to_string());
        }
        if let Some(value) = get("LOCUS_LLM_API_BASE") {
            self.llm.api_base = Some(value.trim().to_string());
        }
        if let Some(value) = get("LOCUS_LLM_API_KEY") {
            self.llm.api_key = Some(value);
        }
        if let Some(value) = get("LOCUS_LLM_TIMEOUT_MS") {
            self.llm.request_timeout_ms = value
                .trim()
                .parse()
                .with_context(|| format!("Invalid LOCUS_LLM_TIMEOUT_MS '{value}'"))?;
        }
        if let Some(value) = get("LOCUS_CACHE_PATH") {
            self.cache.path = Some(PathBuf::from(value.trim()));
        }
        if let Some(value) = get("LOCUS_SIMPLIFY") {
            self.resolution.simplify = parse_flag("LOCUS_SIMPLIFY", &value)?;
        }
        if let Some(value) = get("LOCUS_MAX_RETRIES") {
            self.resolution.max_retries = value
                .trim()
                .parse()
                .with_context(|| format!("Invalid LOCUS_MAX_RETRIES '{value}'"))?;
        }
        Ok(())
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            model: self.llm.model.clone(),
            api_base: self.llm.api_base.clone(),
            temperature: self.llm.temperature,
            api_key: self.llm.api_key.clone(),
            max_output_tokens: self.llm.max_output_tokens,
            http_timeout: self.llm.http_timeout_secs.map(Duration::from_secs),
            mock_responses: self.mock_responses.clone(),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            primary_timeout: Duration::from_millis(self.llm.request_timeout_ms),
            simplify: self.resolution.simplify,
        }
    }

    /// Cache file for a scope: explicit `cache.path`, else `<dir>/<sanitised scope>.json`.
    pub fn cache_path(&self, scope: &str) -> Result<PathBuf> {
        if let Some(path) = &self.cache.path {
            return Ok(path.clone());
        }
        let dir = match &self.cache.dir {
            Some(dir) => dir.clone(),
            None => default_cache_dir()?,
        };
        Ok(dir.join(format!("{}.json", sanitize_scope(scope))))
    }

    /// Copy safe to print: the credential is reduced to a prefix and length.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.llm.api_key = copy.llm.api_key.as_deref().map(redact_secret);
        copy
    }
}

fn default_cache_dir() -> Result<PathBuf> {
    let mut path = dirs::cache_dir().context("Failed to get cache directory")?;
    path.push("locus");
    Ok(path)
}

/// File-name-safe form of a scope name.
pub fn sanitize_scope(scope: &str) -> String {
    let mapped: String = scope
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = mapped.trim_matches('.');
    if trimmed.is_empty() {
        DEFAULT_SCOPE.to_string()
    } else {
        trimmed.to_string()
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("Invalid {key} '{other}'; expected true or false"),
    }
}

/// Default search order for the config file.
pub fn default_config_path() -> Option<PathBuf> {
    let local = Path::new("config/locus.yaml");
    if local.exists() {
        return Some(local.to_path_buf());
    }
    dirs::config_dir().map(|mut path| {
        path.push("locus");
        path.push("config.yaml");
        path
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("llm:\n  provider: anthropic\n").unwrap();
        assert_eq!(config.llm.provider, ProviderSelection::Anthropic);
        assert_eq!(config.llm.request_timeout_ms, 10_000);
        assert!(config.cache.enabled);
        assert!(config.resolution.simplify);
        assert_eq!(config.resolution.max_retries, 2);
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = Config::from_yaml("llm:\n  model: gpt-4o\n").unwrap();
        config
            .apply_overrides_from(lookup(&[
                ("LOCUS_LLM_PROVIDER", "zhipu"),
                ("LOCUS_LLM_MODEL", "glm-4"),
                ("LOCUS_LLM_TIMEOUT_MS", "2500"),
                ("LOCUS_SIMPLIFY", "off"),
                ("LOCUS_MAX_RETRIES", "4"),
                ("LOCUS_CACHE_PATH", "/tmp/q.json"),
                ("LOCUS_LLM_API_BASE", "  "),
            ]))
            .unwrap();
        assert_eq!(config.llm.provider, ProviderSelection::Zhipu);
        assert_eq!(config.llm.model.as_deref(), Some("glm-4"));
        assert_eq!(config.engine_config().primary_timeout, Duration::from_millis(2500));
        assert!(!config.engine_config().simplify);
        assert_eq!(config.resolution.max_retries, 4);
        assert_eq!(config.cache_path("x").unwrap(), PathBuf::from("/tmp/q.json"));
        assert_eq!(config.llm.api_base, None);
    }

    #[test]
    fn invalid_overrides_are_reported() {
        let mut config = Config::default();
        let err = config
            .apply_overrides_from(lookup(&[("LOCUS_SIMPLIFY", "maybe")]))
            .unwrap_err();
        assert!(err.to_string().contains("LOCUS_SIMPLIFY"));
        assert!(config
            .apply_overrides_from(lookup(&[("LOCUS_LLM_PROVIDER", "gemini")]))
            .is_err());
    }

    #[test]
    fn scopes_become_file_names() {
        assert_eq!(sanitize_scope("checkout flow/step 1"), "checkout_flow_step_1");
        assert_eq!(sanitize_scope("../.."), "_");
        assert_eq!(sanitize_scope("  "), DEFAULT_SCOPE);
        assert_eq!(sanitize_scope("login.spec"), "login.spec");

        let config = Config {
            cache: CacheSettings {
                dir: Some(PathBuf::from("/var/cache/locus")),
                ..CacheSettings::default()
            },
            ..Config::default()
        };
        assert_eq!(
            config.cache_path("login page").unwrap(),
            PathBuf::from("/var/cache/locus/login_page.json")
        );
    }

    #[test]
    fn redaction_hides_the_credential() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-1234567890".into());
        let redacted = config.redacted();
        assert_eq!(redacted.llm.api_key.as_deref(), Some("sk-1… (13 chars)"));
        let shown = serde_yaml::to_string(&redacted).unwrap();
        assert!(!shown.contains("sk-1234567890"));
    }
}
