//! Prompt templates for action planning.

use locus_core_types::ActionVerb;

const PLAN_SHAPE: &str = "{\"action\": string, \"targetDescription\": string, \"value\": string | null, \"index\": integer | null}";

pub struct PlanPromptBuilder;

impl PlanPromptBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn system_prompt(&self) -> &'static str {
        "You turn a single user instruction into exactly one browser action. Answer with one JSON object and nothing else."
    }

    pub fn build_prompt(&self, instruction: &str, document: &str) -> String {
        let verbs = ActionVerb::ALL
            .iter()
            .map(|verb| {
                if verb.requires_value() {
                    format!("{verb} (needs value)")
                } else {
                    verb.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        let sections = vec![
            format!("Available actions: {verbs}."),
            format!("Response shape:\n{PLAN_SHAPE}"),
            "targetDescription is a short natural-language description of the element to act on. \
             value is the text to fill, the option to select or the key to press. \
             index is null for the natural match, -1 for the last match, or a zero-based position."
                .to_string(),
            format!("Instruction: {}", instruction.trim()),
            format!("Document:\n{document}"),
        ];
        sections.join("\n\n")
    }

    /// Append the previous failure; corrections accumulate across attempts.
    pub fn with_correction(&self, prompt: &str, error: &str) -> String {
        format!(
            "{prompt}\n\nYour previous response was rejected: {error}\nReply again with a single JSON object matching the response shape."
        )
    }
}

impl Default for PlanPromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_lists_verbs_and_shape() {
        let prompt = PlanPromptBuilder::new().build_prompt("click submit", "<button>Submit</button>");
        assert!(prompt.contains("click, fill (needs value)"));
        assert!(prompt.contains("\"targetDescription\": string"));
        assert!(prompt.contains("Instruction: click submit"));
        assert!(prompt.ends_with("<button>Submit</button>"));
    }

    #[test]
    fn corrections_accumulate() {
        let builder = PlanPromptBuilder::new();
        let once = builder.with_correction("base", "first");
        let twice = builder.with_correction(&once, "second");
        assert!(twice.starts_with("base"));
        assert!(twice.contains("rejected: first"));
        assert!(twice.contains("rejected: second"));
    }
}
