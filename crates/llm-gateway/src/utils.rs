const FENCE: &str = "```";

/// Remove a fenced code block wrapper (with optional language tag) around the whole text.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix(FENCE) else {
        return trimmed;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    rest.strip_suffix(FENCE).unwrap_or(rest).trim()
}

/// Pull the first JSON object out of model output.
///
/// Accepts bare objects, fenced blocks anywhere in the text, and objects embedded in prose.
pub fn extract_json_object(raw: &str) -> Option<String> {
    let unfenced = strip_code_fence(raw);
    if unfenced.starts_with('{') && unfenced.ends_with('}') {
        return Some(unfenced.to_string());
    }

    if let Some(start) = raw.find(FENCE) {
        let after_fence = &raw[start + FENCE.len()..];
        let after_lang =
            after_fence.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '_');
        if let Some(end) = after_lang.find(FENCE) {
            if let Some(object) = balanced_object(&after_lang[..end]) {
                return Some(object.to_string());
            }
        }
    }

    balanced_object(raw).map(str::to_string)
}

/// First `{ .. }` span with balanced braces, ignoring braces inside JSON strings.
fn balanced_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_fenced_block() {
        let input = "Here is the query:\n```json\n{\"query\":\"getByText\"}\n```";
        let extracted = extract_json_object(input).expect("json");
        assert_eq!(extracted, "{\"query\":\"getByText\"}");
    }

    #[test]
    fn extracts_from_inline_object() {
        let input = "text { \"foo\": 1 } more";
        assert_eq!(extract_json_object(input).expect("json"), "{ \"foo\": 1 }");
    }

    #[test]
    fn braces_inside_strings_do_not_end_the_object() {
        let input = r#"sure: {"params": ["a } b", "c \" {"]} trailing }"#;
        assert_eq!(
            extract_json_object(input).expect("json"),
            r#"{"params": ["a } b", "c \" {"]}"#
        );
    }

    #[test]
    fn whole_text_fence_is_stripped() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn returns_none_when_missing() {
        assert!(extract_json_object("no braces").is_none());
        assert!(extract_json_object("{ unbalanced").is_none());
    }
}
