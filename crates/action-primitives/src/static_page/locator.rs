use std::sync::Arc;

use async_trait::async_trait;
use locus_core_types::{ActionVerb, AriaRole};

use super::aria;
use super::dom::{Document, NodeId};
use super::{DispatchedAction, PageState};
use crate::errors::ActionError;
use crate::page::Locator;

#[derive(Debug, Clone)]
pub(crate) enum Selector {
    Role { role: AriaRole, name: Option<String> },
    Text { text: String, exact: bool },
    Label(String),
    Placeholder(String),
    TestId(String),
    AltText(String),
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Pick {
    All,
    Nth(usize),
    Last,
}

impl Selector {
    fn describe(&self) -> String {
        match self {
            Selector::Role { role, name: Some(name) } => {
                format!("getByRole({:?}, {{ name: {:?} }})", role.as_str(), name)
            }
            Selector::Role { role, name: None } => format!("getByRole({:?})", role.as_str()),
            Selector::Text { text, exact: true } => format!("getByText({text:?}, {{ exact: true }})"),
            Selector::Text { text, exact: false } => format!("getByText({text:?})"),
            Selector::Label(text) => format!("getByLabel({text:?})"),
            Selector::Placeholder(text) => format!("getByPlaceholder({text:?})"),
            Selector::TestId(id) => format!("getByTestId({id:?})"),
            Selector::AltText(text) => format!("getByAltText({text:?})"),
        }
    }

    fn matches(&self, doc: &Document) -> Vec<NodeId> {
        let visible: Vec<NodeId> = doc
            .elements()
            .filter(|&id| !aria::is_hidden(doc, id))
            .collect();

        match self {
            Selector::Role { role, name } => visible
                .into_iter()
                .filter(|&id| aria::role_of(doc, id) == Some(*role))
                .filter(|&id| match name {
                    Some(name) => aria::loose_match(&aria::accessible_name(doc, id, Some(*role)), name),
                    None => true,
                })
                .collect(),
            Selector::Text { text, exact } => {
                let wanted = aria::normalize_whitespace(text);
                let candidates: Vec<NodeId> = visible
                    .into_iter()
                    .filter(|&id| {
                        let content = aria::normalize_whitespace(&doc.text_content(id));
                        if *exact {
                            content == wanted
                        } else {
                            aria::loose_match(&content, &wanted)
                        }
                    })
                    .collect();
                // Only the innermost elements carrying the text count as matches.
                candidates
                    .iter()
                    .copied()
                    .filter(|&id| {
                        !candidates
                            .iter()
                            .any(|&other| other != id && doc.is_ancestor(id, other))
                    })
                    .collect()
            }
            Selector::Label(text) => visible
                .into_iter()
                .filter(|&id| {
                    aria::label_texts(doc, id)
                        .iter()
                        .any(|label| aria::loose_match(label, text))
                })
                .collect(),
            Selector::Placeholder(text) => visible
                .into_iter()
                .filter(|&id| {
                    doc.attr(id, "placeholder")
                        .is_some_and(|value| aria::loose_match(value, text))
                })
                .collect(),
            Selector::TestId(test_id) => visible
                .into_iter()
                .filter(|&id| doc.attr(id, "data-testid") == Some(test_id.as_str()))
                .collect(),
            Selector::AltText(text) => visible
                .into_iter()
                .filter(|&id| {
                    doc.attr(id, "alt")
                        .is_some_and(|value| aria::loose_match(value, text))
                })
                .collect(),
        }
    }
}

pub(crate) struct StaticLocator {
    state: Arc<PageState>,
    selector: Selector,
    pick: Pick,
}

impl StaticLocator {
    pub(crate) fn new(state: Arc<PageState>, selector: Selector, pick: Pick) -> Self {
        Self {
            state,
            selector,
            pick,
        }
    }

    fn with_pick(&self, pick: Pick) -> Arc<dyn Locator> {
        Arc::new(Self::new(Arc::clone(&self.state), self.selector.clone(), pick))
    }

    fn resolve(&self) -> (Arc<Document>, Vec<NodeId>) {
        let document = self.state.document();
        let all = self.selector.matches(&document);
        let picked = match self.pick {
            Pick::All => all,
            Pick::Nth(index) => all.get(index).copied().into_iter().collect(),
            Pick::Last => all.last().copied().into_iter().collect(),
        };
        (document, picked)
    }

    fn single(&self) -> Result<(Arc<Document>, NodeId), ActionError> {
        let (document, ids) = self.resolve();
        match ids.as_slice() {
            [] => Err(ActionError::ElementNotFound(self.description())),
            [id] => Ok((Arc::clone(&document), *id)),
            many => Err(ActionError::StrictModeViolation {
                locator: self.description(),
                count: many.len(),
            }),
        }
    }

    fn ensure_applicable(
        &self,
        doc: &Document,
        id: NodeId,
        action: ActionVerb,
        value: Option<&str>,
    ) -> Result<(), ActionError> {
        let locator = self.description();
        let needs_enabled = matches!(
            action,
            ActionVerb::Click
                | ActionVerb::Dblclick
                | ActionVerb::Tap
                | ActionVerb::Fill
                | ActionVerb::Check
                | ActionVerb::Uncheck
                | ActionVerb::Select
        );
        if needs_enabled && aria::is_disabled(doc, id) {
            return Err(ActionError::NotEnabled(locator));
        }

        let tag = doc.tag(id).unwrap_or_default();
        match action {
            ActionVerb::Fill if !aria::is_editable(doc, id) => Err(ActionError::not_applicable(
                "fill",
                locator,
                format!("<{tag}> is not an editable field"),
            )),
            ActionVerb::Check | ActionVerb::Uncheck if !aria::is_checkable(doc, id) => {
                Err(ActionError::not_applicable(
                    action.as_str(),
                    locator,
                    format!("<{tag}> is not a checkbox, radio or switch"),
                ))
            }
            ActionVerb::Select => {
                if tag != "select" {
                    return Err(ActionError::not_applicable(
                        "select",
                        locator,
                        format!("<{tag}> is not a <select> element"),
                    ));
                }
                let wanted = value.unwrap_or_default();
                let found = doc.descendants(id).into_iter().any(|option| {
                    doc.tag(option) == Some("option")
                        && (doc.attr(option, "value") == Some(wanted)
                            || aria::normalize_whitespace(&doc.text_content(option))
                                == aria::normalize_whitespace(wanted))
                });
                if found {
                    Ok(())
                } else {
                    Err(ActionError::OptionNotFound(wanted.to_string()))
                }
            }
            _ => Ok(()),
        }
    }

    fn interact(&self, action: ActionVerb, value: Option<&str>) -> Result<(), ActionError> {
        let (doc, id) = self.single()?;
        self.ensure_applicable(&doc, id, action, value)?;

        let role = aria::role_of(&doc, id);
        self.state.record(DispatchedAction {
            action,
            locator: self.description(),
            tag: doc.tag(id).unwrap_or_default().to_string(),
            role: role.map(|role| role.as_str().to_string()),
            name: aria::accessible_name(&doc, id, role),
            value: value.map(str::to_string),
        });
        Ok(())
    }
}

#[async_trait]
impl Locator for StaticLocator {
    fn description(&self) -> String {
        let base = self.selector.describe();
        match self.pick {
            Pick::All => base,
            Pick::Nth(index) => format!("{base}.nth({index})"),
            Pick::Last => format!("{base}.last()"),
        }
    }

    fn nth(&self, index: usize) -> Arc<dyn Locator> {
        self.with_pick(Pick::Nth(index))
    }

    fn last(&self) -> Arc<dyn Locator> {
        self.with_pick(Pick::Last)
    }

    async fn count(&self) -> Result<usize, ActionError> {
        Ok(self.resolve().1.len())
    }

    async fn click(&self) -> Result<(), ActionError> {
        self.interact(ActionVerb::Click, None)
    }

    async fn dblclick(&self) -> Result<(), ActionError> {
        self.interact(ActionVerb::Dblclick, None)
    }

    async fn tap(&self) -> Result<(), ActionError> {
        self.interact(ActionVerb::Tap, None)
    }

    async fn hover(&self) -> Result<(), ActionError> {
        self.interact(ActionVerb::Hover, None)
    }

    async fn focus(&self) -> Result<(), ActionError> {
        self.interact(ActionVerb::Focus, None)
    }

    async fn fill(&self, value: &str) -> Result<(), ActionError> {
        self.interact(ActionVerb::Fill, Some(value))
    }

    async fn check(&self) -> Result<(), ActionError> {
        self.interact(ActionVerb::Check, None)
    }

    async fn uncheck(&self) -> Result<(), ActionError> {
        self.interact(ActionVerb::Uncheck, None)
    }

    async fn select_option(&self, value: &str) -> Result<(), ActionError> {
        self.interact(ActionVerb::Select, Some(value))
    }

    async fn press(&self, key: &str) -> Result<(), ActionError> {
        self.interact(ActionVerb::Press, Some(key))
    }
}
