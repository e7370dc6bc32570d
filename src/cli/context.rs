use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use locus_action_locator::ResolutionEngine;
use locus_action_primitives::StaticPage;
use locus_llm_gateway::{build_backend, LlmGateway, ProviderSelection};
use locus_snapshot_store::{DisabledCache, JsonFileCache, QueryCache};
use tokio::fs;
use tracing::debug;

use crate::cli::output::OutputFormat;
use crate::config::Config;

/// Per-command overrides shared by `locate` and `act`.
#[derive(Debug, Clone, Default)]
pub struct EngineOverrides {
    pub provider: Option<ProviderSelection>,
    pub model: Option<String>,
    pub no_cache: bool,
}

pub struct CliContext {
    config: Arc<Config>,
    config_path: Option<PathBuf>,
    output: OutputFormat,
}

impl CliContext {
    pub fn new(config: Config, config_path: Option<PathBuf>, output: OutputFormat) -> Self {
        Self {
            config: Arc::new(config),
            config_path,
            output,
        }
    }

    pub fn config(&self) -> &Config {
        self.config.as_ref()
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn output(&self) -> &OutputFormat {
        &self.output
    }

    pub async fn load_page(&self, html: &Path) -> Result<Arc<StaticPage>> {
        let markup = fs::read_to_string(html)
            .await
            .with_context(|| format!("Failed to read document {}", html.display()))?;
        Ok(Arc::new(StaticPage::new(markup)))
    }

    pub fn gateway(&self, overrides: &EngineOverrides) -> Result<LlmGateway> {
        let selection = overrides.provider.unwrap_or(self.config.llm.provider);
        let mut provider = self.config.provider_config();
        if let Some(model) = &overrides.model {
            provider.model = Some(model.clone());
        }
        let backend = build_backend(selection, &provider)
            .with_context(|| format!("Failed to configure the {selection} backend"))?;
        Ok(LlmGateway::new(backend))
    }

    pub fn cache(&self, scope: &str, no_cache: bool) -> Result<Arc<dyn QueryCache>> {
        if no_cache || !self.config.cache.enabled {
            debug!("query cache disabled");
            return Ok(Arc::new(DisabledCache));
        }
        let path = self.config.cache_path(scope)?;
        debug!(path = %path.display(), scope, "using query cache");
        Ok(Arc::new(JsonFileCache::new(path)))
    }

    pub fn engine(
        &self,
        page: Arc<StaticPage>,
        gateway: LlmGateway,
        scope: &str,
        overrides: &EngineOverrides,
    ) -> Result<ResolutionEngine> {
        let cache = self.cache(scope, overrides.no_cache)?;
        Ok(ResolutionEngine::new(page, gateway, cache).with_config(self.config.engine_config()))
    }
}
