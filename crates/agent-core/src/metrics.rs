//! Planning counters, registered into the shared resolution registry.

use locus_action_locator::metrics::{register_counter, registry};
use once_cell::sync::OnceCell;
use prometheus::IntCounterVec;

static PLAN_ATTEMPTS: OnceCell<IntCounterVec> = OnceCell::new();
static REGISTER_ONCE: OnceCell<()> = OnceCell::new();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanAttempt {
    Parsed,
    Rejected,
    Exhausted,
}

impl PlanAttempt {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanAttempt::Parsed => "parsed",
            PlanAttempt::Rejected => "rejected",
            PlanAttempt::Exhausted => "exhausted",
        }
    }
}

pub fn register_metrics() {
    REGISTER_ONCE.get_or_init(|| {
        register_counter(
            registry(),
            &PLAN_ATTEMPTS,
            "locus_plan_attempts_total",
            "Action plan generation attempts by result",
            &["result"],
        );
    });
}

pub fn record_plan_attempt(result: PlanAttempt) {
    register_metrics();
    if let Some(counter) = PLAN_ATTEMPTS.get() {
        counter.with_label_values(&[result.as_str()]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_attempts_share_the_resolution_exposition() {
        record_plan_attempt(PlanAttempt::Rejected);
        let text = locus_action_locator::metrics::render();
        assert!(text.contains("locus_plan_attempts_total{result=\"rejected\"}"));
    }
}
