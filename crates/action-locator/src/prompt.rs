//! Prompt templates for query classification.

use locus_core_types::AriaRole;

const RESPONSE_FORMAT: &str = "Respond with a single JSON object and nothing else:\n{\"query\": \"getByRole\" | \"getByLabel\" | \"getByPlaceholder\" | \"getByAltText\" | \"getByText\" | \"getByTestId\", \"params\": [string, ...]}\ngetByRole takes [role] or [role, accessible name]; every other query takes exactly one parameter.";

pub struct QueryPromptBuilder;

impl QueryPromptBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn system_prompt(&self) -> &'static str {
        "You translate natural-language descriptions of page elements into accessibility-first locator queries. You only answer with JSON that follows the requested shape, and you never invent roles outside the listed vocabulary."
    }

    /// Full prompt over the standard representation.
    pub fn primary_prompt(&self, description: &str, document: &str) -> String {
        let sections = vec![
            "Find the element described below in the document and express it as a structured locator query.".to_string(),
            format!("Description: {}", description.trim()),
            priority_rules(),
            RESPONSE_FORMAT.to_string(),
            format!("Document:\n{document}"),
        ];
        sections.join("\n\n")
    }

    /// Condensed prompt used after the primary attempt failed.
    pub fn simplified_prompt(&self, description: &str, document: &str) -> String {
        let sections = vec![
            format!("Description: {}", description.trim()),
            format!(
                "Prefer getByRole (role from: {}) > getByLabel > getByPlaceholder > getByAltText > getByText (complete text) > getByTestId.",
                AriaRole::vocabulary()
            ),
            RESPONSE_FORMAT.to_string(),
            format!("Document (simplified):\n{document}"),
        ];
        sections.join("\n\n")
    }
}

impl Default for QueryPromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn priority_rules() -> String {
    format!(
        "Choose the first query kind that identifies the element:\n\
         1. getByRole: a valid role plus the element's accessible name. Valid roles: {}.\n\
         2. getByLabel: the text of the label associated with a form control.\n\
         3. getByPlaceholder: the placeholder text of an input.\n\
         4. getByAltText: the alt text of an image.\n\
         5. getByText: the element's complete text content, never truncated.\n\
         6. getByTestId: the data-testid value, only as a last resort.\n\
         Never use a tag name (div, span, h1) as a role.",
        AriaRole::vocabulary()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_prompt_carries_rules_description_and_document() {
        let prompt = QueryPromptBuilder::new().primary_prompt(" the main heading ", "<h1>Hi</h1>");
        assert!(prompt.contains("Description: the main heading"));
        assert!(prompt.contains("heading, "));
        assert!(prompt.ends_with("Document:\n<h1>Hi</h1>"));
        let role = prompt.find("1. getByRole").unwrap();
        let test_id = prompt.find("6. getByTestId").unwrap();
        assert!(role < test_id);
    }

    #[test]
    fn simplified_prompt_is_shorter() {
        let builder = QueryPromptBuilder::new();
        let primary = builder.primary_prompt("x", "doc");
        let simplified = builder.simplified_prompt("x", "doc");
        assert!(simplified.len() < primary.len());
        assert!(simplified.contains("getByRole (role from:"));
    }
}
