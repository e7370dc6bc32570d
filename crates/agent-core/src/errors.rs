use locus_action_locator::LocatorError;
use locus_action_primitives::ActionError;
use locus_core_types::QueryModelError;
use locus_llm_gateway::GatewayError;
use thiserror::Error;

/// Errors emitted by the agent-core crate.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Raised when the document snapshot needed for planning is unavailable.
    #[error("document snapshot unavailable: {0}")]
    Snapshot(#[from] LocatorError),

    /// Raised when the model reply is not a valid action plan. Retryable.
    #[error("invalid action plan: {0}")]
    InvalidPlan(String),

    /// Raised when the gateway call for a plan fails. Retryable.
    #[error("plan request failed: {0}")]
    Gateway(#[from] GatewayError),

    /// Raised once the plan retry budget is spent.
    #[error("could not plan '{instruction}' after {attempts} attempt(s): {last_error}")]
    Exhausted {
        instruction: String,
        attempts: u32,
        last_error: String,
    },

    /// Raised when a plan for a value-taking verb carries no value. Terminal.
    #[error("'{action}' needs a value but the plan for '{instruction}' has none")]
    MissingValue {
        action: &'static str,
        instruction: String,
    },

    /// Raised when the resolved element rejects the action. Terminal.
    #[error("executing '{instruction}' failed: {source}")]
    Action {
        instruction: String,
        #[source]
        source: ActionError,
    },
}

impl AgentError {
    /// Helper for reply shape failures.
    pub fn invalid_plan(message: impl Into<String>) -> Self {
        Self::InvalidPlan(message.into())
    }

    /// Whether another plan request may fix the failure.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AgentError::InvalidPlan(_) | AgentError::Gateway(_))
    }
}

impl From<QueryModelError> for AgentError {
    fn from(err: QueryModelError) -> Self {
        Self::InvalidPlan(err.to_string())
    }
}
