use async_trait::async_trait;
use dashmap::DashMap;
use locus_core_types::StructuredQuery;

use crate::api::{CacheMap, QueryCache};

/// Process-local cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, StructuredQuery>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated cache.
    pub fn with_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, StructuredQuery)>,
        K: Into<String>,
    {
        let cache = Self::new();
        for (description, query) in entries {
            cache.entries.insert(description.into(), query);
        }
        cache
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl QueryCache for MemoryCache {
    fn label(&self) -> &str {
        "memory"
    }

    async fn read(&self) -> CacheMap {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    async fn write(&self, description: &str, query: &StructuredQuery) {
        self.entries.insert(description.to_string(), query.clone());
    }

    async fn lookup(&self, description: &str) -> Option<StructuredQuery> {
        self.entries.get(description).map(|entry| entry.value().clone())
    }
}

/// Never remembers anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCache;

#[async_trait]
impl QueryCache for DisabledCache {
    fn label(&self) -> &str {
        "disabled"
    }

    async fn read(&self) -> CacheMap {
        CacheMap::new()
    }

    async fn write(&self, _description: &str, _query: &StructuredQuery) {}
}
