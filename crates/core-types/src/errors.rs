use thiserror::Error;

/// Validation failures for structured queries and action plans.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryModelError {
    #[error("query has no parameters")]
    EmptyParams,

    #[error("unknown query kind: {0}")]
    UnknownKind(String),

    #[error("'{0}' is not a recognised semantic role")]
    UnknownRole(String),

    #[error("{kind} expects {expected} parameter(s), got {actual}")]
    Arity {
        kind: &'static str,
        expected: &'static str,
        actual: usize,
    },

    #[error("parameter {index} of {kind} is blank")]
    BlankParam { kind: &'static str, index: usize },

    #[error("action '{0}' requires a value")]
    MissingValue(&'static str),

    #[error("invalid element index {0}; expected -1 or a non-negative integer")]
    InvalidIndex(i64),

    #[error("target description is blank")]
    BlankTarget,
}
