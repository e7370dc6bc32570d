use locus_action_locator::ResolutionSource;
use locus_core_types::{ActionPlan, StructuredQuery};
use serde::Serialize;

/// Outcome of a successful `ActionExecutor::execute` call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    pub plan: ActionPlan,
    /// Query the target description resolved to.
    pub query: StructuredQuery,
    pub source: ResolutionSource,
    /// Locator expression the action was dispatched through, index applied.
    pub locator: String,
    /// Plan requests made, including the successful one.
    pub attempts: u32,
}
