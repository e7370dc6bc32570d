//! Implicit roles, accessible names and visibility for static documents.

use locus_core_types::AriaRole;

use super::dom::{Document, NodeId};

const HIDDEN_TAGS: &[&str] = &[
    "head", "script", "style", "template", "noscript", "title", "meta", "link",
];

const NON_TEXT_INPUTS: &[&str] = &[
    "button", "submit", "reset", "image", "checkbox", "radio", "hidden", "file", "range",
    "color",
];

pub(crate) fn normalize_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-insensitive substring match after whitespace normalisation.
pub(crate) fn loose_match(haystack: &str, needle: &str) -> bool {
    let needle = normalize_whitespace(needle).to_lowercase();
    normalize_whitespace(haystack).to_lowercase().contains(&needle)
}

fn input_type(doc: &Document, id: NodeId) -> String {
    doc.attr(id, "type")
        .map(|kind| kind.trim().to_ascii_lowercase())
        .filter(|kind| !kind.is_empty())
        .unwrap_or_else(|| "text".to_string())
}

fn hidden_by_style(style: &str) -> bool {
    let compact: String = style
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    compact.contains("display:none") || compact.contains("visibility:hidden")
}

/// Whether the element or any ancestor keeps it out of the accessibility tree.
pub(crate) fn is_hidden(doc: &Document, id: NodeId) -> bool {
    let mut current = Some(id);
    while let Some(node) = current {
        if let Some(tag) = doc.tag(node) {
            if HIDDEN_TAGS.contains(&tag)
                || doc.has_attr(node, "hidden")
                || doc
                    .attr(node, "aria-hidden")
                    .is_some_and(|value| value.eq_ignore_ascii_case("true"))
                || (tag == "input" && input_type(doc, node) == "hidden")
                || doc.attr(node, "style").is_some_and(hidden_by_style)
            {
                return true;
            }
        }
        current = doc.parent(node);
    }
    false
}

pub(crate) fn role_of(doc: &Document, id: NodeId) -> Option<AriaRole> {
    if let Some(explicit) = doc.attr(id, "role") {
        if let Some(role) = explicit
            .split_whitespace()
            .find_map(|token| token.parse::<AriaRole>().ok())
        {
            return Some(role);
        }
        if explicit
            .split_whitespace()
            .any(|token| matches!(token, "presentation" | "none"))
        {
            return None;
        }
    }

    let tag = doc.tag(id)?;
    let role = match tag {
        "a" | "area" if doc.has_attr(id, "href") => AriaRole::Link,
        "article" => AriaRole::Article,
        "aside" => AriaRole::Complementary,
        "button" => AriaRole::Button,
        "dialog" => AriaRole::Dialog,
        "fieldset" => AriaRole::Group,
        "figure" => AriaRole::Figure,
        "footer" => AriaRole::Contentinfo,
        "form" => AriaRole::Form,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => AriaRole::Heading,
        "header" => AriaRole::Banner,
        "hr" => AriaRole::Separator,
        "img" => {
            if doc.attr(id, "alt") == Some("") {
                return None;
            }
            AriaRole::Img
        }
        "input" => match input_type(doc, id).as_str() {
            "button" | "submit" | "reset" | "image" => AriaRole::Button,
            "checkbox" => AriaRole::Checkbox,
            "radio" => AriaRole::Radio,
            "range" => AriaRole::Slider,
            "number" => AriaRole::Spinbutton,
            "search" => AriaRole::Searchbox,
            "hidden" | "password" | "file" | "color" | "date" | "datetime-local" | "month"
            | "time" | "week" => return None,
            _ => AriaRole::Textbox,
        },
        "li" => AriaRole::Listitem,
        "main" => AriaRole::Main,
        "menu" | "ol" | "ul" => AriaRole::List,
        "nav" => AriaRole::Navigation,
        "option" => AriaRole::Option,
        "output" => AriaRole::Status,
        "progress" => AriaRole::Progressbar,
        "search" => AriaRole::Search,
        "section" if doc.has_attr(id, "aria-label") || doc.has_attr(id, "aria-labelledby") => {
            AriaRole::Region
        }
        "select" => {
            let sized = doc
                .attr(id, "size")
                .and_then(|size| size.trim().parse::<u32>().ok())
                .is_some_and(|size| size > 1);
            if doc.has_attr(id, "multiple") || sized {
                AriaRole::Listbox
            } else {
                AriaRole::Combobox
            }
        }
        "table" => AriaRole::Table,
        "tbody" | "thead" | "tfoot" => AriaRole::Rowgroup,
        "td" => AriaRole::Cell,
        "th" => AriaRole::Columnheader,
        "tr" => AriaRole::Row,
        "textarea" => AriaRole::Textbox,
        _ => return None,
    };
    Some(role)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(normalize_whitespace)
        .filter(|value| !value.is_empty())
}

fn labelledby_text(doc: &Document, id: NodeId) -> Option<String> {
    let ids = doc.attr(id, "aria-labelledby")?;
    let text = ids
        .split_whitespace()
        .filter_map(|target| doc.element_by_id(target))
        .map(|target| doc.text_with_alt(target))
        .collect::<Vec<_>>()
        .join(" ");
    non_blank(Some(&text))
}

/// Text of `<label for=..>` elements and any wrapping `<label>`.
fn associated_labels(doc: &Document, id: NodeId) -> Vec<String> {
    let mut labels = Vec::new();
    if let Some(control_id) = doc.attr(id, "id").filter(|value| !value.is_empty()) {
        for label in doc.elements() {
            if doc.tag(label) == Some("label") && doc.attr(label, "for") == Some(control_id) {
                if let Some(text) = non_blank(Some(&doc.text_with_alt(label))) {
                    labels.push(text);
                }
            }
        }
    }
    let mut current = doc.parent(id);
    while let Some(node) = current {
        if doc.tag(node) == Some("label") {
            if let Some(text) = non_blank(Some(&doc.text_with_alt(node))) {
                labels.push(text);
            }
            break;
        }
        current = doc.parent(node);
    }
    labels
}

fn first_child_text(doc: &Document, id: NodeId, tag: &str) -> Option<String> {
    doc.node(id)
        .children
        .iter()
        .copied()
        .find(|&child| doc.tag(child) == Some(tag))
        .and_then(|child| non_blank(Some(&doc.text_with_alt(child))))
}

/// Accessible name, simplified from the accname algorithm.
pub(crate) fn accessible_name(doc: &Document, id: NodeId, role: Option<AriaRole>) -> String {
    if let Some(name) = labelledby_text(doc, id) {
        return name;
    }
    if let Some(name) = non_blank(doc.attr(id, "aria-label")) {
        return name;
    }

    match doc.tag(id).unwrap_or_default() {
        "input" | "select" | "textarea" => {
            let kind = input_type(doc, id);
            if doc.tag(id) == Some("input") {
                match kind.as_str() {
                    "submit" | "reset" | "button" => {
                        if let Some(value) = non_blank(doc.attr(id, "value")) {
                            return value;
                        }
                        match kind.as_str() {
                            "submit" => return "Submit".to_string(),
                            "reset" => return "Reset".to_string(),
                            _ => {}
                        }
                    }
                    "image" => {
                        if let Some(alt) = non_blank(doc.attr(id, "alt")) {
                            return alt;
                        }
                    }
                    _ => {}
                }
            }
            let labels = associated_labels(doc, id);
            if !labels.is_empty() {
                return labels.join(" ");
            }
        }
        "img" | "area" => {
            if let Some(alt) = non_blank(doc.attr(id, "alt")) {
                return alt;
            }
        }
        "fieldset" => {
            if let Some(legend) = first_child_text(doc, id, "legend") {
                return legend;
            }
        }
        "table" => {
            if let Some(caption) = first_child_text(doc, id, "caption") {
                return caption;
            }
        }
        "figure" => {
            if let Some(caption) = first_child_text(doc, id, "figcaption") {
                return caption;
            }
        }
        _ => {}
    }

    if role.is_some_and(|role| role.names_from_content()) {
        if let Some(content) = non_blank(Some(&doc.text_with_alt(id))) {
            return content;
        }
    }
    if let Some(title) = non_blank(doc.attr(id, "title")) {
        return title;
    }
    non_blank(doc.attr(id, "placeholder")).unwrap_or_default()
}

/// Every label-like text attached to an element, for label lookups.
pub(crate) fn label_texts(doc: &Document, id: NodeId) -> Vec<String> {
    let mut texts = Vec::new();
    if let Some(text) = labelledby_text(doc, id) {
        texts.push(text);
    }
    if let Some(text) = non_blank(doc.attr(id, "aria-label")) {
        texts.push(text);
    }
    if matches!(doc.tag(id), Some("input" | "select" | "textarea")) {
        texts.extend(associated_labels(doc, id));
    }
    texts
}

pub(crate) fn is_editable(doc: &Document, id: NodeId) -> bool {
    if doc
        .attr(id, "contenteditable")
        .is_some_and(|value| !value.eq_ignore_ascii_case("false"))
    {
        return true;
    }
    match doc.tag(id) {
        Some("textarea") => true,
        Some("input") => !NON_TEXT_INPUTS.contains(&input_type(doc, id).as_str()),
        _ => false,
    }
}

pub(crate) fn is_checkable(doc: &Document, id: NodeId) -> bool {
    if doc.tag(id) == Some("input") && matches!(input_type(doc, id).as_str(), "checkbox" | "radio")
    {
        return true;
    }
    matches!(
        role_of(doc, id),
        Some(
            AriaRole::Checkbox
                | AriaRole::Radio
                | AriaRole::Switch
                | AriaRole::Menuitemcheckbox
                | AriaRole::Menuitemradio
        )
    )
}

pub(crate) fn is_disabled(doc: &Document, id: NodeId) -> bool {
    doc.has_attr(id, "disabled")
        || doc
            .attr(id, "aria-disabled")
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(doc: &Document, tag: &str) -> NodeId {
        doc.elements()
            .find(|&id| doc.tag(id) == Some(tag))
            .unwrap_or_else(|| panic!("missing <{tag}>"))
    }

    #[test]
    fn implicit_roles_follow_tag_and_type() {
        let doc = Document::parse(
            r#"<a href="/">Home</a><a>anchor</a><input type="password"><input type="email"><img alt=""><select><option>x</option></select>"#,
        );
        let roles: Vec<Option<AriaRole>> = doc.elements().map(|id| role_of(&doc, id)).collect();
        assert_eq!(
            roles,
            vec![
                Some(AriaRole::Link),
                None,
                None,
                Some(AriaRole::Textbox),
                None,
                Some(AriaRole::Combobox),
                Some(AriaRole::Option),
            ]
        );
    }

    #[test]
    fn explicit_role_wins() {
        let doc = Document::parse(r#"<div role="button">Go</div><button role="presentation">x</button>"#);
        assert_eq!(role_of(&doc, find(&doc, "div")), Some(AriaRole::Button));
        assert_eq!(role_of(&doc, find(&doc, "button")), None);
    }

    #[test]
    fn names_from_labels_and_content() {
        let doc = Document::parse(
            r#"<label for="mail">Email  address</label><input id="mail" type="email">
               <button aria-label="Close dialog">X</button>
               <h1>Example <em>Domain</em></h1>"#,
        );
        let input = find(&doc, "input");
        assert_eq!(
            accessible_name(&doc, input, role_of(&doc, input)),
            "Email address"
        );
        let button = find(&doc, "button");
        assert_eq!(accessible_name(&doc, button, Some(AriaRole::Button)), "Close dialog");
        let heading = find(&doc, "h1");
        assert_eq!(accessible_name(&doc, heading, Some(AriaRole::Heading)), "Example Domain");
    }

    #[test]
    fn hidden_detection_walks_ancestors() {
        let doc = Document::parse(
            r#"<div style="display: none"><button>a</button></div><p aria-hidden="true"><span>b</span></p><em>c</em>"#,
        );
        assert!(is_hidden(&doc, find(&doc, "button")));
        assert!(is_hidden(&doc, find(&doc, "span")));
        assert!(!is_hidden(&doc, find(&doc, "em")));
    }

    #[test]
    fn loose_matching_normalises_case_and_spacing() {
        assert!(loose_match("Sign   in to\nyour account", "sign in"));
        assert!(!loose_match("Sign up", "sign in"));
    }
}
