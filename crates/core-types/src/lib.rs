//! Shared primitives for the Locus resolution pipeline.
//!
//! Provides the closed query vocabulary (`StructuredQuery`, `QueryKind`, `AriaRole`) and the
//! action plan shape consumed by the execution loop. Everything here is pure data plus
//! validation; no crate in this module performs I/O.

pub mod errors;
pub mod plan;
pub mod query;
pub mod role;

pub use errors::QueryModelError;
pub use plan::{ActionPlan, ActionVerb, ElementIndex};
pub use query::{QueryKind, StructuredQuery};
pub use role::AriaRole;
