use std::collections::HashMap;

use async_trait::async_trait;
use locus_core_types::StructuredQuery;

/// Description (exact, case-sensitive) to query mapping.
pub type CacheMap = HashMap<String, StructuredQuery>;

#[async_trait]
pub trait QueryCache: Send + Sync {
    /// Short label used in logs.
    fn label(&self) -> &str;

    /// Every readable entry. Never fails; unreadable state reads as empty.
    async fn read(&self) -> CacheMap;

    /// Insert or overwrite one entry. Failures are logged and swallowed.
    async fn write(&self, description: &str, query: &StructuredQuery);

    async fn lookup(&self, description: &str) -> Option<StructuredQuery> {
        self.read().await.remove(description)
    }
}
