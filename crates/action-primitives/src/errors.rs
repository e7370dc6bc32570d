//! Error types for automation primitives

use thiserror::Error;

/// Failures raised by the automation engine while counting or acting on elements
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// No element matched the locator
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// An action needs exactly one element but the locator matched several
    #[error("Strict mode violation: {locator} resolved to {count} elements")]
    StrictModeViolation { locator: String, count: usize },

    /// The matched element does not support the requested action
    #[error("Cannot {action} {locator}: {reason}")]
    NotApplicable {
        action: &'static str,
        locator: String,
        reason: String,
    },

    /// Element is disabled
    #[error("Element not enabled: {0}")]
    NotEnabled(String),

    /// Dropdown option was not found
    #[error("Option not found in dropdown: {0}")]
    OptionNotFound(String),

    /// Structured query could not be turned into a locator
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Driver or transport level failure
    #[error("Driver error: {0}")]
    Driver(String),
}

impl ActionError {
    pub fn not_applicable(
        action: &'static str,
        locator: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::NotApplicable {
            action,
            locator: locator.into(),
            reason: reason.into(),
        }
    }

    /// Whether the locator simply matched nothing
    pub fn is_not_found(&self) -> bool {
        matches!(self, ActionError::ElementNotFound(_))
    }
}
