//! Structural perception for model prompts.
//!
//! Reduces a full document snapshot to a bounded, attribute-stripped representation that fits a
//! language-model context window. Two strengths are offered; both are deterministic for identical
//! input.

pub mod simplify;

pub use simplify::{truncate_chars, DocumentSimplifier, MarkupSimplifier, SimplifyStrength};
