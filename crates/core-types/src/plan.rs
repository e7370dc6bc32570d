//! Action plans produced by the planner and dispatched by the executor.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::QueryModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActionVerb {
    Click,
    Fill,
    Check,
    Uncheck,
    Select,
    Press,
    Hover,
    Dblclick,
    Focus,
    Tap,
}

impl ActionVerb {
    pub const ALL: [ActionVerb; 10] = [
        ActionVerb::Click,
        ActionVerb::Fill,
        ActionVerb::Check,
        ActionVerb::Uncheck,
        ActionVerb::Select,
        ActionVerb::Press,
        ActionVerb::Hover,
        ActionVerb::Dblclick,
        ActionVerb::Focus,
        ActionVerb::Tap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionVerb::Click => "click",
            ActionVerb::Fill => "fill",
            ActionVerb::Check => "check",
            ActionVerb::Uncheck => "uncheck",
            ActionVerb::Select => "select",
            ActionVerb::Press => "press",
            ActionVerb::Hover => "hover",
            ActionVerb::Dblclick => "dblclick",
            ActionVerb::Focus => "focus",
            ActionVerb::Tap => "tap",
        }
    }

    /// Verbs that cannot be dispatched without a value.
    pub fn requires_value(&self) -> bool {
        matches!(self, ActionVerb::Fill | ActionVerb::Select | ActionVerb::Press)
    }
}

impl fmt::Display for ActionVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of several matches an action applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementIndex {
    /// No selector; the query's natural match is used.
    Natural,
    Last,
    Nth(usize),
}

impl ElementIndex {
    pub fn from_raw(raw: Option<i64>) -> Result<Self, QueryModelError> {
        match raw {
            None => Ok(ElementIndex::Natural),
            Some(-1) => Ok(ElementIndex::Last),
            Some(n) if n >= 0 => Ok(ElementIndex::Nth(n as usize)),
            Some(n) => Err(QueryModelError::InvalidIndex(n)),
        }
    }
}

/// A single planned interaction.
///
/// Wire shape: `{"action": "fill", "targetDescription": "...", "value": "...", "index": null}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionPlan {
    pub action: ActionVerb,
    pub target_description: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub index: Option<i64>,
}

impl ActionPlan {
    pub fn new(action: ActionVerb, target_description: impl Into<String>) -> Self {
        Self {
            action,
            target_description: target_description.into(),
            value: None,
            index: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_index(mut self, index: i64) -> Self {
        self.index = Some(index);
        self
    }

    /// Shape checks that a corrected model reply could fix.
    pub fn validate_shape(&self) -> Result<ElementIndex, QueryModelError> {
        if self.target_description.trim().is_empty() {
            return Err(QueryModelError::BlankTarget);
        }
        ElementIndex::from_raw(self.index)
    }

    /// The value for verbs that need one.
    pub fn required_value(&self) -> Result<Option<&str>, QueryModelError> {
        if !self.action.requires_value() {
            return Ok(None);
        }
        self.value
            .as_deref()
            .map(Some)
            .ok_or(QueryModelError::MissingValue(self.action.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialises_wire_shape_with_nulls() {
        let plan: ActionPlan = serde_json::from_str(
            r#"{"action":"click","targetDescription":"the submit button","value":null,"index":null}"#,
        )
        .unwrap();
        assert_eq!(plan, ActionPlan::new(ActionVerb::Click, "the submit button"));
        assert_eq!(plan.validate_shape().unwrap(), ElementIndex::Natural);
    }

    #[test]
    fn unknown_verbs_fail_to_parse() {
        let result = serde_json::from_str::<ActionPlan>(
            r#"{"action":"navigate","targetDescription":"home"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn index_semantics() {
        assert_eq!(ElementIndex::from_raw(Some(-1)).unwrap(), ElementIndex::Last);
        assert_eq!(ElementIndex::from_raw(Some(2)).unwrap(), ElementIndex::Nth(2));
        assert_eq!(
            ElementIndex::from_raw(Some(-3)).unwrap_err(),
            QueryModelError::InvalidIndex(-3)
        );
    }

    #[test]
    fn value_is_required_only_for_text_verbs() {
        let fill = ActionPlan::new(ActionVerb::Fill, "the email field");
        assert_eq!(
            fill.required_value().unwrap_err(),
            QueryModelError::MissingValue("fill")
        );
        let fill = fill.with_value("a@b.c");
        assert_eq!(fill.required_value().unwrap(), Some("a@b.c"));

        let click = ActionPlan::new(ActionVerb::Click, "ok").with_value("ignored");
        assert_eq!(click.required_value().unwrap(), None);
    }

    #[test]
    fn blank_targets_are_shape_errors() {
        let plan = ActionPlan::new(ActionVerb::Hover, "   ");
        assert_eq!(plan.validate_shape().unwrap_err(), QueryModelError::BlankTarget);
    }
}
