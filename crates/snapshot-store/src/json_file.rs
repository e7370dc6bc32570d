use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use locus_core_types::StructuredQuery;
use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::api::{CacheMap, QueryCache};

/// One JSON object per scope: `{ "<description>": { "queryName": .., "params": [..] } }`.
///
/// No locking; concurrent writers may lose each other's updates, but every write replaces the
/// file whole so readers never see a partial document.
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    path: PathBuf,
    label: String,
}

impl JsonFileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "default".to_string());
        Self { path, label }
    }

    pub fn with_label(path: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the backing file. A missing file is not an error.
    pub async fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "query cache cleared");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }

    async fn read_raw(&self) -> Option<serde_json::Map<String, Value>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "query cache file absent");
                return None;
            }
            Err(err) => {
                warn!(%err, path = %self.path.display(), "failed to read query cache");
                return None;
            }
        };
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Some(map),
            Ok(_) => {
                warn!(path = %self.path.display(), "query cache is not a JSON object");
                None
            }
            Err(err) => {
                warn!(%err, path = %self.path.display(), "failed to parse query cache");
                None
            }
        }
    }

    async fn persist(&self, entries: &BTreeMap<String, Value>) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let payload = serde_json::to_vec_pretty(entries)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        write_atomic(&self.path, &payload).await
    }
}

#[async_trait]
impl QueryCache for JsonFileCache {
    fn label(&self) -> &str {
        &self.label
    }

    async fn read(&self) -> CacheMap {
        let Some(raw) = self.read_raw().await else {
            return CacheMap::new();
        };
        let mut entries = CacheMap::with_capacity(raw.len());
        for (description, value) in raw {
            let parsed = serde_json::from_value::<StructuredQuery>(value)
                .map_err(|err| err.to_string())
                .and_then(|query| query.normalized().map_err(|err| err.to_string()));
            match parsed {
                Ok(query) => {
                    entries.insert(description, query);
                }
                Err(err) => {
                    warn!(
                        %err,
                        cache = %self.label,
                        description = %description,
                        "skipping malformed cache entry"
                    );
                }
            }
        }
        entries
    }

    async fn write(&self, description: &str, query: &StructuredQuery) {
        let value = match serde_json::to_value(query) {
            Ok(value) => value,
            Err(err) => {
                warn!(%err, cache = %self.label, "failed to serialise cache entry");
                return;
            }
        };
        let mut entries: BTreeMap<String, Value> = self
            .read_raw()
            .await
            .map(|raw| raw.into_iter().collect())
            .unwrap_or_default();
        entries.insert(description.to_string(), value);

        match self.persist(&entries).await {
            Ok(()) => debug!(
                cache = %self.label,
                description = %description,
                query = %query,
                "query cache store"
            ),
            Err(err) => warn!(%err, path = %self.path.display(), "failed to write query cache"),
        }
    }
}

static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Write to a private temp file next to `path`, then rename it over `path`.
async fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let tmp = temp_path(path);
    let result = async {
        let mut file = fs::File::create(&tmp).await?;
        file.write_all(data).await?;
        file.flush().await?;
        drop(file);
        fs::rename(&tmp, path).await
    }
    .await;
    if result.is_err() {
        let _ = fs::remove_file(&tmp).await;
    }
    result
}

/// Unique per write so concurrent writers never share a temp file.
fn temp_path(path: &Path) -> PathBuf {
    let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cache".to_string());
    path.with_file_name(format!(".{name}.{}.{seq}.tmp", std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_paths_are_unique_siblings() {
        let path = Path::new("/tmp/scope/default.json");
        let first = temp_path(path);
        let second = temp_path(path);
        assert_ne!(first, second);
        assert_eq!(first.parent(), path.parent());
        assert!(first.to_string_lossy().ends_with(".tmp"));
    }
}
