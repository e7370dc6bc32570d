//! Automation primitives - the boundary between Locus and a document automation engine
//!
//! This crate provides:
//! - `Page` / `Locator` traits modelled on accessibility-first query engines
//! - `query_locator`, mapping a structured query onto the matching `get_by_*` constructor
//! - `StaticPage`, an in-memory engine over a markup string with accessible role and name
//!   computation, used for dry runs and deterministic tests

pub mod errors;
pub mod page;
pub mod static_page;

pub use errors::*;
pub use page::*;
pub use static_page::{DispatchedAction, StaticPage};
