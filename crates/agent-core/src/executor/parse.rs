use locus_core_types::{ActionPlan, ElementIndex};
use locus_llm_gateway::{extract_json_object, ResponseShape};

use crate::errors::AgentError;

pub fn action_plan_shape() -> ResponseShape {
    ResponseShape::of::<ActionPlan>("action_plan")
}

/// Parse a model reply into a plan and its index selector.
///
/// Only shape defects are reported here; a missing value is checked at dispatch time.
pub fn parse_action_plan(raw: &str) -> Result<(ActionPlan, ElementIndex), AgentError> {
    let json = extract_json_object(raw)
        .ok_or_else(|| AgentError::invalid_plan("response contains no JSON object"))?;
    let plan: ActionPlan =
        serde_json::from_str(&json).map_err(|err| AgentError::invalid_plan(err.to_string()))?;
    let index = plan.validate_shape()?;
    Ok((plan, index))
}

#[cfg(test)]
mod tests {
    use locus_core_types::ActionVerb;

    use super::*;

    #[test]
    fn parses_submit_click() {
        let (plan, index) = parse_action_plan(
            r#"{"action":"click","targetDescription":"the submit button","value":null,"index":null}"#,
        )
        .unwrap();
        assert_eq!(plan.action, ActionVerb::Click);
        assert_eq!(plan.target_description, "the submit button");
        assert_eq!(index, ElementIndex::Natural);
    }

    #[test]
    fn maps_last_and_nth() {
        let (_, index) =
            parse_action_plan(r#"{"action":"hover","targetDescription":"row","index":-1}"#).unwrap();
        assert_eq!(index, ElementIndex::Last);
        let (_, index) =
            parse_action_plan(r#"{"action":"hover","targetDescription":"row","index":2}"#).unwrap();
        assert_eq!(index, ElementIndex::Nth(2));
    }

    #[test]
    fn shape_defects_are_retryable() {
        for raw in [
            "not json",
            r#"{"action":"navigate","targetDescription":"home"}"#,
            r#"{"action":"click","targetDescription":"  "}"#,
            r#"{"action":"click","targetDescription":"row","index":-3}"#,
        ] {
            let err = parse_action_plan(raw).unwrap_err();
            assert!(err.is_retryable(), "{raw}: {err}");
        }
    }

    #[test]
    fn missing_value_is_not_a_parse_error() {
        let (plan, _) =
            parse_action_plan(r#"{"action":"fill","targetDescription":"the email field"}"#).unwrap();
        assert!(plan.required_value().is_err());
    }
}
