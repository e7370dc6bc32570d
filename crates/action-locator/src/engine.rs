//! Resolution ladder: cache, primary model attempt, degraded attempt, literal fallback.

use std::sync::Arc;

use locus_action_primitives::{query_locator, Page};
use locus_core_types::StructuredQuery;
use locus_llm_gateway::{ExecuteOptions, LlmGateway};
use locus_perceiver_structural::{
    truncate_chars, DocumentSimplifier, MarkupSimplifier, SimplifyStrength,
};
use locus_snapshot_store::QueryCache;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::context::ResolutionContext;
use crate::errors::LocatorError;
use crate::metrics::{self, CacheEvent};
use crate::parse::{parse_query_response, query_response_shape};
use crate::prompt::QueryPromptBuilder;
use crate::types::{EngineConfig, Resolution, ResolutionSource};

/// Forced first output token for query replies.
const PREFILL: &str = "{";

pub struct ResolutionEngine {
    page: Arc<dyn Page>,
    gateway: LlmGateway,
    cache: Arc<dyn QueryCache>,
    simplifier: Arc<dyn DocumentSimplifier>,
    prompts: QueryPromptBuilder,
    config: EngineConfig,
    context: Mutex<ResolutionContext>,
}

impl ResolutionEngine {
    pub fn new(page: Arc<dyn Page>, gateway: LlmGateway, cache: Arc<dyn QueryCache>) -> Self {
        Self {
            page,
            gateway,
            cache,
            simplifier: Arc::new(MarkupSimplifier::new()),
            prompts: QueryPromptBuilder::new(),
            config: EngineConfig::default(),
            context: Mutex::new(ResolutionContext::new()),
        }
    }

    pub fn with_simplifier(mut self, simplifier: Arc<dyn DocumentSimplifier>) -> Self {
        self.simplifier = simplifier;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn page(&self) -> &Arc<dyn Page> {
        &self.page
    }

    pub fn gateway(&self) -> &LlmGateway {
        &self.gateway
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve a description to a locator. Never fails: the last rung is a literal text query.
    pub async fn locate(&self, description: &str) -> Resolution {
        info!(description, "resolving element");

        if let Some(resolution) = self.cached(description).await {
            return resolution;
        }

        match self.primary_attempt(description).await {
            Ok(resolution) => return resolution,
            Err(err) => warn!(
                description,
                kind = err.kind(),
                error = %err,
                "primary resolution failed; degrading to simplified document"
            ),
        }

        match self.simplified_attempt(description).await {
            Ok(resolution) => return resolution,
            Err(err) => warn!(
                description,
                kind = err.kind(),
                error = %err,
                "simplified resolution failed; falling back to literal text"
            ),
        }

        self.literal_fallback(description)
    }

    /// Document representation for the current snapshot, shared with the resolution ladder.
    pub async fn representation(&self, strength: SimplifyStrength) -> Result<String, LocatorError> {
        let raw = self.page.content().await?;
        Ok(self.derive(&raw, strength))
    }

    fn derive(&self, raw: &str, strength: SimplifyStrength) -> String {
        self.context
            .lock()
            .representation(raw, strength, self.simplifier.as_ref())
    }

    async fn cached(&self, description: &str) -> Option<Resolution> {
        let Some(query) = self.cache.lookup(description).await else {
            debug!(description, cache = self.cache.label(), "query cache miss");
            metrics::record_cache_event(CacheEvent::Miss);
            return None;
        };

        let locator = match query_locator(self.page.as_ref(), &query) {
            Ok(locator) => locator,
            Err(err) => {
                warn!(description, %query, error = %err, "cached query cannot be built; re-resolving");
                metrics::record_cache_event(CacheEvent::Stale);
                return None;
            }
        };

        match locator.count().await {
            Ok(count) if count > 0 => {
                debug!(description, %query, count, "query cache hit");
                metrics::record_cache_event(CacheEvent::Hit);
                metrics::record_resolution(ResolutionSource::Cache);
                Some(Resolution::new(query, ResolutionSource::Cache, locator))
            }
            Ok(_) => {
                info!(description, %query, "cached query matches nothing; re-resolving");
                metrics::record_cache_event(CacheEvent::Stale);
                None
            }
            Err(err) => {
                warn!(description, %query, error = %err, "cached query could not be counted; re-resolving");
                metrics::record_cache_event(CacheEvent::Stale);
                None
            }
        }
    }

    async fn primary_attempt(&self, description: &str) -> Result<Resolution, LocatorError> {
        let raw = self.page.content().await?;
        let document = if self.config.simplify {
            self.derive(&raw, SimplifyStrength::Standard)
        } else {
            truncate_chars(&raw, SimplifyStrength::Standard.budget()).to_string()
        };
        let prompt = self.prompts.primary_prompt(description, &document);
        let options = self
            .query_options()
            .with_timeout(self.config.primary_timeout);
        debug!(description, chars = document.chars().count(), "primary attempt");

        let reply = self.gateway.execute(&prompt, &options).await?;
        let query = parse_query_response(&reply)?;
        self.accept(description, query, ResolutionSource::Primary)
            .await
    }

    async fn simplified_attempt(&self, description: &str) -> Result<Resolution, LocatorError> {
        let raw = self.page.content().await?;
        let document = self.derive(&raw, SimplifyStrength::Aggressive);
        let prompt = self.prompts.simplified_prompt(description, &document);
        debug!(description, chars = document.chars().count(), "simplified attempt");

        let reply = self.gateway.execute(&prompt, &self.query_options()).await?;
        let query = parse_query_response(&reply)?;
        self.accept(description, query, ResolutionSource::Simplified)
            .await
    }

    async fn accept(
        &self,
        description: &str,
        query: StructuredQuery,
        source: ResolutionSource,
    ) -> Result<Resolution, LocatorError> {
        let locator = query_locator(self.page.as_ref(), &query)?;
        self.cache.write(description, &query).await;
        metrics::record_cache_event(CacheEvent::Store);
        metrics::record_resolution(source);
        info!(description, %query, stage = source.name(), "element resolved");
        Ok(Resolution::new(query, source, locator))
    }

    fn literal_fallback(&self, description: &str) -> Resolution {
        let query = StructuredQuery::literal_text(description);
        let locator = self.page.get_by_text(description, false);
        metrics::record_resolution(ResolutionSource::LiteralFallback);
        info!(description, %query, "using literal text fallback");
        Resolution::new(query, ResolutionSource::LiteralFallback, locator)
    }

    fn query_options(&self) -> ExecuteOptions {
        ExecuteOptions::new()
            .with_system_prompt(self.prompts.system_prompt())
            .with_response_shape(query_response_shape())
            .with_prefill(PREFILL)
    }
}

impl std::fmt::Debug for ResolutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionEngine")
            .field("backend", &self.gateway.backend_label())
            .field("cache", &self.cache.label())
            .field("config", &self.config)
            .finish()
    }
}
