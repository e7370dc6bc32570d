//! Resolution engine - natural-language descriptions to accessibility-first queries
//!
//! This crate implements the element resolution ladder:
//! - Description cache with existence-only validation
//! - Model classification over a simplified document, raced against a timeout
//! - Degraded retry over an aggressively simplified document
//! - Literal text fallback that never fails

pub mod context;
pub mod engine;
pub mod errors;
pub mod metrics;
pub mod parse;
pub mod prompt;
pub mod types;

pub use context::ResolutionContext;
pub use engine::ResolutionEngine;
pub use errors::LocatorError;
pub use parse::{parse_query_response, query_response_shape, QueryResponse};
pub use prompt::QueryPromptBuilder;
pub use types::{EngineConfig, Resolution, ResolutionSource};
