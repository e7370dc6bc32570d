//! Plan, resolve, dispatch.

use std::sync::Arc;

use locus_action_locator::ResolutionEngine;
use locus_action_primitives::{ActionError, Locator};
use locus_core_types::{ActionPlan, ActionVerb, ElementIndex};
use locus_llm_gateway::{ExecuteOptions, LlmGateway};
use locus_perceiver_structural::SimplifyStrength;
use tracing::{debug, info, warn};

use super::parse::{action_plan_shape, parse_action_plan};
use super::prompt::PlanPromptBuilder;
use super::types::ExecutionReport;
use crate::errors::AgentError;
use crate::metrics::{self, PlanAttempt};

/// Additional plan requests after the first one fails.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

pub struct ActionExecutor {
    engine: Arc<ResolutionEngine>,
    gateway: LlmGateway,
    prompts: PlanPromptBuilder,
    max_retries: u32,
}

impl ActionExecutor {
    pub fn new(engine: Arc<ResolutionEngine>, gateway: LlmGateway) -> Self {
        Self {
            engine,
            gateway,
            prompts: PlanPromptBuilder::new(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Run one instruction end to end.
    pub async fn execute(&self, instruction: &str) -> Result<ExecutionReport, AgentError> {
        info!(instruction, "executing instruction");
        let document = self
            .engine
            .representation(SimplifyStrength::Standard)
            .await?;

        let (plan, index, attempts) = self.plan(instruction, &document).await?;
        let value = plan
            .required_value()
            .map_err(|_| AgentError::MissingValue {
                action: plan.action.as_str(),
                instruction: instruction.to_string(),
            })?
            .map(str::to_string);

        let resolution = self.engine.locate(&plan.target_description).await;
        let locator = match index {
            ElementIndex::Natural => resolution.locator.clone(),
            ElementIndex::Last => resolution.locator.last(),
            ElementIndex::Nth(n) => resolution.locator.nth(n),
        };
        debug!(
            locator = %locator.description(),
            stage = resolution.source.name(),
            "dispatching action"
        );

        dispatch(locator.as_ref(), plan.action, value.as_deref())
            .await
            .map_err(|source| AgentError::Action {
                instruction: instruction.to_string(),
                source,
            })?;
        info!(instruction, action = %plan.action, attempts, "instruction executed");

        Ok(ExecutionReport {
            locator: locator.description(),
            query: resolution.query,
            source: resolution.source,
            plan,
            attempts,
        })
    }

    async fn plan(
        &self,
        instruction: &str,
        document: &str,
    ) -> Result<(ActionPlan, ElementIndex, u32), AgentError> {
        let options = ExecuteOptions::new()
            .with_system_prompt(self.prompts.system_prompt())
            .with_response_shape(action_plan_shape())
            .with_prefill("{");
        let mut prompt = self.prompts.build_prompt(instruction, document);
        let budget = self.max_retries + 1;
        let mut last_error = String::new();

        for attempt in 1..=budget {
            let outcome = match self.gateway.execute(&prompt, &options).await {
                Ok(reply) => parse_action_plan(&reply),
                Err(err) => Err(AgentError::from(err)),
            };
            match outcome {
                Ok((plan, index)) => {
                    metrics::record_plan_attempt(PlanAttempt::Parsed);
                    debug!(attempt, action = %plan.action, target = %plan.target_description, "action plan parsed");
                    return Ok((plan, index, attempt));
                }
                Err(err) => {
                    metrics::record_plan_attempt(PlanAttempt::Rejected);
                    warn!(instruction, attempt, budget, error = %err, "action plan rejected");
                    last_error = err.to_string();
                    prompt = self.prompts.with_correction(&prompt, &last_error);
                }
            }
        }

        metrics::record_plan_attempt(PlanAttempt::Exhausted);
        Err(AgentError::Exhausted {
            instruction: instruction.to_string(),
            attempts: budget,
            last_error,
        })
    }
}

async fn dispatch(
    locator: &dyn Locator,
    action: ActionVerb,
    value: Option<&str>,
) -> Result<(), ActionError> {
    let value = value.unwrap_or_default();
    match action {
        ActionVerb::Click => locator.click().await,
        ActionVerb::Fill => locator.fill(value).await,
        ActionVerb::Check => locator.check().await,
        ActionVerb::Uncheck => locator.uncheck().await,
        ActionVerb::Select => locator.select_option(value).await,
        ActionVerb::Press => locator.press(value).await,
        ActionVerb::Hover => locator.hover().await,
        ActionVerb::Dblclick => locator.dblclick().await,
        ActionVerb::Focus => locator.focus().await,
        ActionVerb::Tap => locator.tap().await,
    }
}
