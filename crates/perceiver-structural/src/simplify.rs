use std::fmt;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimplifyStrength {
    Standard,
    Aggressive,
}

impl SimplifyStrength {
    /// Upper bound on the simplified output, in characters.
    pub fn budget(&self) -> usize {
        self.profile().max_chars
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SimplifyStrength::Standard => "standard",
            SimplifyStrength::Aggressive => "aggressive",
        }
    }

    fn profile(&self) -> &'static SimplifyProfile {
        match self {
            SimplifyStrength::Standard => &STANDARD,
            SimplifyStrength::Aggressive => &AGGRESSIVE,
        }
    }
}

impl fmt::Display for SimplifyStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait DocumentSimplifier: Send + Sync {
    /// Bounded representation of `html`; identical input yields identical output.
    fn simplify(&self, html: &str, strength: SimplifyStrength) -> String;
}

struct SimplifyProfile {
    max_chars: usize,
    drop_elements: &'static [&'static str],
    keep_attributes: &'static [&'static str],
    keep_aria: bool,
    max_attribute_chars: usize,
    unwrap_tags: &'static [&'static str],
}

const STANDARD: SimplifyProfile = SimplifyProfile {
    max_chars: 20_000,
    drop_elements: &["head", "script", "style", "svg", "noscript", "template", "iframe"],
    keep_attributes: &[
        "id",
        "name",
        "type",
        "role",
        "href",
        "alt",
        "title",
        "placeholder",
        "value",
        "for",
        "data-testid",
        "disabled",
        "checked",
        "selected",
        "hidden",
    ],
    keep_aria: true,
    max_attribute_chars: 80,
    unwrap_tags: &[],
};

const AGGRESSIVE: SimplifyProfile = SimplifyProfile {
    max_chars: 8_000,
    drop_elements: &[
        "head", "script", "style", "svg", "noscript", "template", "iframe", "canvas", "video",
        "audio", "picture", "map",
    ],
    keep_attributes: &[
        "id",
        "name",
        "type",
        "role",
        "alt",
        "placeholder",
        "for",
        "data-testid",
        "aria-label",
        "aria-labelledby",
    ],
    keep_aria: false,
    max_attribute_chars: 40,
    unwrap_tags: &["div", "span"],
};

static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static DECLARATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<![^>]*>|<\?[^>]*>").unwrap());
static METADATA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<(?:meta|link|base)\b[^>]*>").unwrap());
static START_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"<([a-zA-Z][a-zA-Z0-9-]*)((?:\s+[^\s=>/]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+))?)*)\s*(/?)>"#,
    )
    .unwrap()
});
static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s=>/]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+)))?"#).unwrap()
});
static BETWEEN_TAGS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r">\s+<").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static STANDARD_DROPS: Lazy<Vec<Regex>> = Lazy::new(|| drop_patterns(STANDARD.drop_elements));
static AGGRESSIVE_DROPS: Lazy<Vec<Regex>> = Lazy::new(|| drop_patterns(AGGRESSIVE.drop_elements));
static AGGRESSIVE_UNWRAP: Lazy<Regex> = Lazy::new(|| unwrap_pattern(AGGRESSIVE.unwrap_tags));

fn drop_patterns(tags: &[&str]) -> Vec<Regex> {
    tags.iter()
        .map(|tag| {
            Regex::new(&format!(
                r"(?is)<{tag}\b[^>]*?/>|<{tag}\b[^>]*>.*?</{tag}\s*>"
            ))
            .unwrap()
        })
        .collect()
}

fn unwrap_pattern(tags: &[&str]) -> Regex {
    Regex::new(&format!(r"(?i)</?(?:{})\b[^>]*>", tags.join("|"))).unwrap()
}

/// Longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

/// Regex-driven markup stripper.
///
/// Removes comments, declarations, non-content elements and presentation attributes, keeps the
/// attributes that feed accessible roles and names, collapses whitespace and truncates to the
/// strength's budget. The aggressive strength also unwraps generic containers.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkupSimplifier;

impl MarkupSimplifier {
    pub fn new() -> Self {
        Self
    }

    fn filter_attributes(profile: &SimplifyProfile, caps: &Captures<'_>) -> String {
        let tag = caps[1].to_ascii_lowercase();
        let mut out = format!("<{tag}");
        for attr in ATTR_RE.captures_iter(caps.get(2).map_or("", |m| m.as_str())) {
            let name = attr[1].to_ascii_lowercase();
            let keep = profile.keep_attributes.contains(&name.as_str())
                || (profile.keep_aria && name.starts_with("aria-"));
            if !keep {
                continue;
            }
            let value = attr
                .get(2)
                .or_else(|| attr.get(3))
                .or_else(|| attr.get(4))
                .map(|m| m.as_str());
            match value {
                Some(value) => {
                    let value = truncate_chars(value.trim(), profile.max_attribute_chars);
                    out.push_str(&format!(" {name}=\"{}\"", value.replace('"', "&quot;")));
                }
                None => {
                    out.push(' ');
                    out.push_str(&name);
                }
            }
        }
        if !caps[3].is_empty() {
            out.push_str(" /");
        }
        out.push('>');
        out
    }
}

impl DocumentSimplifier for MarkupSimplifier {
    fn simplify(&self, html: &str, strength: SimplifyStrength) -> String {
        let profile = strength.profile();
        let drops: &[Regex] = match strength {
            SimplifyStrength::Standard => &STANDARD_DROPS,
            SimplifyStrength::Aggressive => &AGGRESSIVE_DROPS,
        };

        let mut text = COMMENT_RE.replace_all(html, "").into_owned();
        text = DECLARATION_RE.replace_all(&text, "").into_owned();
        for pattern in drops {
            text = pattern.replace_all(&text, "").into_owned();
        }
        text = METADATA_RE.replace_all(&text, "").into_owned();
        text = START_TAG_RE
            .replace_all(&text, |caps: &Captures<'_>| Self::filter_attributes(profile, caps))
            .into_owned();
        if !profile.unwrap_tags.is_empty() {
            text = AGGRESSIVE_UNWRAP.replace_all(&text, " ").into_owned();
        }
        text = BETWEEN_TAGS_RE.replace_all(&text, "><").into_owned();
        text = WHITESPACE_RE.replace_all(&text, " ").into_owned();

        let simplified = truncate_chars(text.trim(), profile.max_chars).to_string();
        debug!(
            strength = %strength,
            input_chars = html.len(),
            output_chars = simplified.len(),
            "simplified document"
        );
        simplified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><title>Example</title><meta charset="utf-8"><style>h1 { color: red; }</style></head>
<body class="home" style="margin:0">
  <!-- navigation -->
  <div class="wrapper" id="root">
    <h1 class="title" data-track="x">Example   Domain</h1>
    <span class="hint">Welcome</span>
    <button type="submit" onclick="go()" aria-label="Send form" disabled>Send</button>
    <svg viewBox="0 0 10 10"><path d="M0 0"/></svg>
    <img src="/logo.png" alt="Logo"/>
    <script>window.tracking = true;</script>
  </div>
</body>
</html>"#;

    #[test]
    fn standard_strips_noise_and_keeps_semantics() {
        let out = MarkupSimplifier::new().simplify(PAGE, SimplifyStrength::Standard);
        assert!(!out.contains("<!--"));
        assert!(!out.contains("DOCTYPE"));
        assert!(!out.contains("<script"));
        assert!(!out.contains("<style"));
        assert!(!out.contains("<svg"));
        assert!(!out.contains("<title"));
        assert!(!out.contains("class="));
        assert!(!out.contains("onclick"));
        assert!(!out.contains("src="));
        assert!(out.contains(r#"<div id="root">"#));
        assert!(out.contains("<h1>Example Domain</h1>"));
        assert!(out.contains(r#"<button type="submit" aria-label="Send form" disabled>Send</button>"#));
        assert!(out.contains(r#"<img alt="Logo" />"#));
    }

    #[test]
    fn aggressive_unwraps_generic_containers() {
        let out = MarkupSimplifier::new().simplify(PAGE, SimplifyStrength::Aggressive);
        assert!(!out.contains("<div"));
        assert!(!out.contains("<span"));
        assert!(!out.contains("disabled"));
        assert!(out.contains("Welcome"));
        assert!(out.contains(r#"aria-label="Send form""#));
    }

    #[test]
    fn output_is_bounded_and_deterministic() {
        let big = "<p>lorem ipsum dolor</p>".repeat(5_000);
        let simplifier = MarkupSimplifier::new();
        for strength in [SimplifyStrength::Standard, SimplifyStrength::Aggressive] {
            let first = simplifier.simplify(&big, strength);
            assert!(first.chars().count() <= strength.budget());
            assert_eq!(first, simplifier.simplify(&big, strength));
        }
        assert!(SimplifyStrength::Aggressive.budget() < SimplifyStrength::Standard.budget());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn long_attribute_values_are_clipped() {
        let href = format!("/{}", "a".repeat(200));
        let html = format!(r#"<a href="{href}">x</a>"#);
        let out = MarkupSimplifier::new().simplify(&html, SimplifyStrength::Standard);
        assert!(out.len() < 120, "{out}");
    }
}
