//! Tolerant markup tree used by the static page.
//!
//! Handles the subset real pages lean on: void and self-closing tags, raw-text elements,
//! comments, doctype, common entities and implicit closing of list items, options, paragraphs
//! and table cells. Unmatched closing tags are ignored.

pub type NodeId = usize;

#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_TAGS: &[&str] = &["script", "style", "textarea", "title"];

/// Tags that break inline text flow; text on either side is separated by a space.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "option", "p", "pre", "section", "table", "tbody", "td",
    "tfoot", "th", "thead", "tr", "ul",
];

/// Subtrees whose text never reaches the rendered document.
const NON_RENDERED_TAGS: &[&str] = &["script", "style", "template", "noscript", "head"];

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

struct StartTag {
    name: String,
    attrs: Vec<(String, String)>,
    self_closing: bool,
    consumed: usize,
}

impl Document {
    pub const ROOT: NodeId = 0;

    pub fn parse(html: &str) -> Self {
        let mut doc = Document {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        };
        let mut stack: Vec<NodeId> = vec![Self::ROOT];
        let mut pos = 0;

        while pos < html.len() {
            let rest = &html[pos..];
            let top = *stack.last().unwrap_or(&Self::ROOT);

            let Some(lt) = rest.find('<') else {
                doc.push_text(top, &decode_entities(rest));
                break;
            };
            if lt > 0 {
                doc.push_text(top, &decode_entities(&rest[..lt]));
                pos += lt;
                continue;
            }

            if rest.starts_with("<!--") {
                pos += rest.find("-->").map_or(rest.len(), |end| end + 3);
                continue;
            }
            if rest.starts_with("<!") || rest.starts_with("<?") {
                pos += rest.find('>').map_or(rest.len(), |end| end + 1);
                continue;
            }
            if let Some(after) = rest.strip_prefix("</") {
                let end = after.find('>').unwrap_or(after.len());
                let name = after[..end].trim().to_ascii_lowercase();
                doc.close_element(&mut stack, &name);
                pos = (pos + 2 + end + 1).min(html.len());
                continue;
            }

            let Some(tag) = parse_start_tag(rest) else {
                doc.push_text(top, "<");
                pos += 1;
                continue;
            };
            pos += tag.consumed;

            doc.auto_close(&mut stack, &tag.name);
            let parent = *stack.last().unwrap_or(&Self::ROOT);
            let is_void = VOID_TAGS.contains(&tag.name.as_str());
            let raw_text = RAW_TEXT_TAGS.contains(&tag.name.as_str());
            let name = tag.name.clone();
            let id = doc.push_element(parent, tag.name, tag.attrs);

            if is_void || tag.self_closing {
                continue;
            }
            if raw_text {
                let rest = &html[pos..];
                let close = rest.to_ascii_lowercase().find(&format!("</{name}"));
                let end = close.unwrap_or(rest.len());
                let body = &rest[..end];
                if name == "textarea" || name == "title" {
                    doc.push_text(id, &decode_entities(body));
                } else {
                    doc.push_text(id, body);
                }
                pos += end;
                if close.is_some() {
                    let after = &html[pos..];
                    pos += after.find('>').map_or(after.len(), |e| e + 1);
                }
                continue;
            }
            stack.push(id);
        }

        doc
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes.get(id)?.kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes.get(id)?.kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    /// Element ids in document order.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| matches!(node.kind, NodeKind::Element { .. }))
            .map(|(id, _)| id)
    }

    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut pending: Vec<NodeId> = self.nodes[id].children.iter().rev().copied().collect();
        while let Some(next) = pending.pop() {
            out.push(next);
            pending.extend(self.nodes[next].children.iter().rev().copied());
        }
        out
    }

    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    pub fn element_by_id(&self, value: &str) -> Option<NodeId> {
        self.elements().find(|&id| self.attr(id, "id") == Some(value))
    }

    /// Rendered text of a subtree, with block boundaries turned into spaces.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out, false);
        out
    }

    /// Like [`Document::text_content`] but image alt text contributes too.
    pub fn text_with_alt(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out, true);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String, include_alt: bool) {
        for &child in &self.nodes[id].children {
            match &self.nodes[child].kind {
                NodeKind::Text(text) => out.push_str(text),
                NodeKind::Element { tag, .. } => {
                    if NON_RENDERED_TAGS.contains(&tag.as_str())
                        || self.has_attr(child, "hidden")
                        || self.attr(child, "aria-hidden") == Some("true")
                    {
                        continue;
                    }
                    let block = BLOCK_TAGS.contains(&tag.as_str());
                    if block {
                        out.push(' ');
                    }
                    if include_alt && tag == "img" {
                        if let Some(alt) = self.attr(child, "alt") {
                            out.push(' ');
                            out.push_str(alt);
                            out.push(' ');
                        }
                    }
                    self.collect_text(child, out, include_alt);
                    if block {
                        out.push(' ');
                    }
                }
                NodeKind::Document => {}
            }
        }
    }

    fn push_node(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    fn push_element(&mut self, parent: NodeId, tag: String, attrs: Vec<(String, String)>) -> NodeId {
        self.push_node(parent, NodeKind::Element { tag, attrs })
    }

    fn push_text(&mut self, parent: NodeId, text: &str) {
        if !text.is_empty() {
            self.push_node(parent, NodeKind::Text(text.to_string()));
        }
    }

    fn close_element(&self, stack: &mut Vec<NodeId>, name: &str) {
        if let Some(position) = stack
            .iter()
            .rposition(|&id| id != Self::ROOT && self.tag(id) == Some(name))
        {
            stack.truncate(position);
        }
    }

    fn auto_close(&self, stack: &mut Vec<NodeId>, opening: &str) {
        let closes: &[&str] = match opening {
            "li" => &["li"],
            "option" => &["option"],
            "p" => &["p"],
            "dt" | "dd" => &["dt", "dd"],
            "tr" => &["tr", "td", "th"],
            "td" | "th" => &["td", "th"],
            _ => return,
        };
        while let Some(&top) = stack.last() {
            if top == Self::ROOT {
                break;
            }
            match self.tag(top) {
                Some(tag) if closes.contains(&tag) => {
                    stack.pop();
                }
                _ => break,
            }
        }
    }
}

fn parse_start_tag(rest: &str) -> Option<StartTag> {
    let bytes = rest.as_bytes();
    let len = bytes.len();
    let mut i = 1;
    if i >= len || !bytes[i].is_ascii_alphabetic() {
        return None;
    }
    while i < len && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-' || bytes[i] == b':') {
        i += 1;
    }
    let name = rest[1..i].to_ascii_lowercase();
    let mut attrs = Vec::new();
    let mut self_closing = false;

    loop {
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= len {
            break;
        }
        match bytes[i] {
            b'>' => {
                i += 1;
                break;
            }
            b'/' => {
                i += 1;
                if i < len && bytes[i] == b'>' {
                    self_closing = true;
                    i += 1;
                    break;
                }
                continue;
            }
            _ => {}
        }

        let start = i;
        while i < len && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        if start == i {
            i += 1;
            continue;
        }
        let attr_name = rest[start..i].to_ascii_lowercase();
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let mut value = String::new();
        if i < len && bytes[i] == b'=' {
            i += 1;
            while i < len && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i < len && (bytes[i] == b'"' || bytes[i] == b'\'') {
                let quote = bytes[i];
                i += 1;
                let value_start = i;
                while i < len && bytes[i] != quote {
                    i += 1;
                }
                value = decode_entities(&rest[value_start..i]);
                if i < len {
                    i += 1;
                }
            } else {
                let value_start = i;
                while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                value = decode_entities(&rest[value_start..i]);
            }
        }
        attrs.push((attr_name, value));
    }

    Some(StartTag {
        name,
        attrs,
        self_closing,
        consumed: i,
    })
}

pub(crate) fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let semi = tail
            .char_indices()
            .take(12)
            .find(|(_, ch)| *ch == ';')
            .map(|(idx, _)| idx);
        let decoded = semi.and_then(|semi| decode_entity(&tail[1..semi]).map(|ch| (ch, semi)));
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let numeric = entity.strip_prefix('#')?;
            let code = match numeric.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => numeric.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(doc: &Document, tag: &str) -> NodeId {
        doc.elements()
            .find(|&id| doc.tag(id) == Some(tag))
            .unwrap_or_else(|| panic!("missing <{tag}>"))
    }

    #[test]
    fn parses_nested_elements_and_attributes() {
        let doc = Document::parse(
            r#"<!doctype html><div id="main" class=wide><a href='/x' data-testid="go">Go <b>now</b></a></div>"#,
        );
        let link = first(&doc, "a");
        assert_eq!(doc.attr(link, "href"), Some("/x"));
        assert_eq!(doc.attr(link, "data-testid"), Some("go"));
        assert_eq!(doc.text_content(link), "Go now");
        let div = first(&doc, "div");
        assert_eq!(doc.attr(div, "class"), Some("wide"));
        assert!(doc.is_ancestor(div, link));
    }

    #[test]
    fn void_and_raw_text_elements() {
        let doc = Document::parse(
            "<p>a<br>b<img alt=\"logo\"></p><script>if (a < b) {}</script><textarea>x &amp; y</textarea>",
        );
        let p = first(&doc, "p");
        assert_eq!(doc.node(p).children.len(), 4);
        let script = first(&doc, "script");
        assert_eq!(doc.text_content(script), "if (a < b) {}");
        let textarea = first(&doc, "textarea");
        assert_eq!(doc.text_content(textarea), "x & y");
    }

    #[test]
    fn implicit_closing_of_list_items() {
        let doc = Document::parse("<ul><li>one<li>two</ul>");
        let ul = first(&doc, "ul");
        assert_eq!(doc.node(ul).children.len(), 2);
    }

    #[test]
    fn skips_comments_and_hidden_subtrees_in_text() {
        let doc = Document::parse("<div>a<!-- note --><style>.x{}</style><span hidden>b</span>c</div>");
        let div = first(&doc, "div");
        assert_eq!(doc.text_content(div), "ac");
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(decode_entities("a &lt;b&gt; &#65;&#x42; &bogus; &"), "a <b> AB &bogus; &");
    }
}
