//! Locus command-line harness
//!
//! Exposes configuration and CLI modules for integration testing

pub mod cli;
pub mod config;

pub use config::{sanitize_scope, Config, DEFAULT_SCOPE};
