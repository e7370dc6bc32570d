//! Description → structured query cache.
//!
//! A cache is best-effort: read failures degrade to an empty mapping and write failures are
//! logged, never raised. One backing file per logical scope.

pub mod api;
pub mod json_file;
pub mod memory;

pub use api::{CacheMap, QueryCache};
pub use json_file::JsonFileCache;
pub use memory::{DisabledCache, MemoryCache};
