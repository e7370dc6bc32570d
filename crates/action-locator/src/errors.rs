//! Error types for the resolution ladder

use locus_action_primitives::ActionError;
use locus_core_types::QueryModelError;
use locus_llm_gateway::GatewayError;
use thiserror::Error;

/// Failure of a single resolution attempt.
///
/// `ResolutionEngine::locate` never returns these; they drive the degrade ladder and are logged.
#[derive(Debug, Error, Clone)]
pub enum LocatorError {
    /// The automation engine could not produce a snapshot or a locator
    #[error("automation engine error: {0}")]
    Automation(#[from] ActionError),

    /// Transport, backend or timeout failure from the model gateway
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The reply did not contain a usable JSON object
    #[error("unparseable model response: {0}")]
    Parse(String),

    /// The reply parsed but violates the query model
    #[error("response violates the query model: {0}")]
    Schema(#[from] QueryModelError),
}

impl LocatorError {
    pub fn parse(message: impl Into<String>) -> Self {
        LocatorError::Parse(message.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, LocatorError::Gateway(err) if err.is_timeout())
    }

    /// Check if another attempt with the same prompt could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            LocatorError::Gateway(err) => !err.is_configuration(),
            LocatorError::Parse(_) | LocatorError::Schema(_) => true,
            LocatorError::Automation(_) => false,
        }
    }

    /// Short label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            LocatorError::Automation(_) => "automation",
            LocatorError::Gateway(err) if err.is_timeout() => "timeout",
            LocatorError::Gateway(_) => "gateway",
            LocatorError::Parse(_) => "parse",
            LocatorError::Schema(_) => "schema",
        }
    }
}
