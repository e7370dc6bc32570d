//! Instruction execution with bounded plan retries.
//!
//! ```text
//! document = simplify(snapshot)
//! for attempt in 1..=max_retries + 1:
//!     plan = parse(llm(prompt))      // on failure: prompt += error, continue
//! locator = locate(plan.target)      // never fails
//! dispatch(plan.action, locator)     // failures propagate, no retry
//! ```

pub mod controller;
pub mod parse;
pub mod prompt;
pub mod types;

pub use controller::{ActionExecutor, DEFAULT_MAX_RETRIES};
pub use parse::{action_plan_shape, parse_action_plan};
pub use prompt::PlanPromptBuilder;
pub use types::ExecutionReport;
