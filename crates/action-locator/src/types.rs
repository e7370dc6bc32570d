//! Core types for the resolution engine

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use locus_action_primitives::Locator;
use locus_core_types::StructuredQuery;
use serde::{Deserialize, Serialize};

/// Terminal state of the resolution ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// A cached query that still matches at least one element
    Cache,

    /// Model answer over the standard document representation
    Primary,

    /// Model answer over the aggressive representation
    Simplified,

    /// Text query wrapping the description verbatim
    LiteralFallback,
}

impl ResolutionSource {
    pub fn name(&self) -> &'static str {
        match self {
            ResolutionSource::Cache => "cache",
            ResolutionSource::Primary => "primary",
            ResolutionSource::Simplified => "simplified",
            ResolutionSource::LiteralFallback => "literal_fallback",
        }
    }
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of `ResolutionEngine::locate`.
#[derive(Clone)]
pub struct Resolution {
    pub query: StructuredQuery,
    pub source: ResolutionSource,
    pub locator: Arc<dyn Locator>,
}

impl Resolution {
    pub fn new(query: StructuredQuery, source: ResolutionSource, locator: Arc<dyn Locator>) -> Self {
        Self {
            query,
            source,
            locator,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == ResolutionSource::LiteralFallback
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolution")
            .field("query", &self.query)
            .field("source", &self.source)
            .field("locator", &self.locator.description())
            .finish()
    }
}

/// Tunables for the resolution ladder.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Bound on the primary model call; the degraded call is unbounded.
    pub primary_timeout: Duration,

    /// When false the primary attempt sends raw markup truncated to the standard budget.
    pub simplify: bool,
}

impl EngineConfig {
    pub const DEFAULT_PRIMARY_TIMEOUT: Duration = Duration::from_millis(10_000);
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            primary_timeout: Self::DEFAULT_PRIMARY_TIMEOUT,
            simplify: true,
        }
    }
}
