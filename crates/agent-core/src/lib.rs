//! Action planner and execution loop.
//!
//! Turns a plain-English instruction into an [`ActionPlan`](locus_core_types::ActionPlan),
//! resolves its target through the resolution engine and dispatches the verb. Plan generation
//! is retried with the parse error fed back to the model, up to a fixed bound.

pub mod errors;
pub mod executor;
pub mod metrics;

pub use errors::AgentError;
pub use executor::{
    action_plan_shape, parse_action_plan, ActionExecutor, ExecutionReport, PlanPromptBuilder,
    DEFAULT_MAX_RETRIES,
};
