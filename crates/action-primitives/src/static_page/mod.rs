//! In-memory automation engine over a markup string.
//!
//! Locators are evaluated against the current document each time they are awaited. Actions do
//! not mutate the markup; they are validated and recorded so callers can inspect what would
//! have been dispatched to a live browser.

mod aria;
mod dom;
mod locator;

use std::sync::Arc;

use async_trait::async_trait;
use locus_core_types::{ActionVerb, AriaRole};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::debug;

use crate::errors::ActionError;
use crate::page::{Locator, Page};

pub use dom::{Document, NodeId};
use locator::{Pick, Selector, StaticLocator};

/// One action accepted by the static engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchedAction {
    pub action: ActionVerb,
    /// Locator expression that produced the element.
    pub locator: String,
    pub tag: String,
    pub role: Option<String>,
    /// Accessible name of the element at dispatch time.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

struct Snapshot {
    html: String,
    document: Arc<Document>,
}

pub(crate) struct PageState {
    snapshot: RwLock<Snapshot>,
    dispatched: Mutex<Vec<DispatchedAction>>,
}

impl PageState {
    pub(crate) fn document(&self) -> Arc<Document> {
        Arc::clone(&self.snapshot.read().document)
    }

    pub(crate) fn record(&self, action: DispatchedAction) {
        debug!(
            action = %action.action,
            locator = %action.locator,
            tag = %action.tag,
            "static page dispatch"
        );
        self.dispatched.lock().push(action);
    }
}

#[derive(Clone)]
pub struct StaticPage {
    state: Arc<PageState>,
}

impl StaticPage {
    pub fn new(html: impl Into<String>) -> Self {
        let html = html.into();
        let document = Arc::new(Document::parse(&html));
        Self {
            state: Arc::new(PageState {
                snapshot: RwLock::new(Snapshot { html, document }),
                dispatched: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Replace the document. Existing locators see the new content on their next evaluation.
    pub fn set_content(&self, html: impl Into<String>) {
        let html = html.into();
        let document = Arc::new(Document::parse(&html));
        *self.state.snapshot.write() = Snapshot { html, document };
    }

    /// Actions accepted so far, in dispatch order.
    pub fn dispatched(&self) -> Vec<DispatchedAction> {
        self.state.dispatched.lock().clone()
    }

    fn locator(&self, selector: Selector) -> Arc<dyn Locator> {
        Arc::new(StaticLocator::new(Arc::clone(&self.state), selector, Pick::All))
    }
}

impl std::fmt::Debug for StaticPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticPage")
            .field("bytes", &self.state.snapshot.read().html.len())
            .field("dispatched", &self.state.dispatched.lock().len())
            .finish()
    }
}

#[async_trait]
impl Page for StaticPage {
    async fn content(&self) -> Result<String, ActionError> {
        Ok(self.state.snapshot.read().html.clone())
    }

    fn get_by_role(&self, role: AriaRole, name: Option<&str>) -> Arc<dyn Locator> {
        self.locator(Selector::Role {
            role,
            name: name.map(str::to_string),
        })
    }

    fn get_by_text(&self, text: &str, exact: bool) -> Arc<dyn Locator> {
        self.locator(Selector::Text {
            text: text.to_string(),
            exact,
        })
    }

    fn get_by_label(&self, text: &str) -> Arc<dyn Locator> {
        self.locator(Selector::Label(text.to_string()))
    }

    fn get_by_placeholder(&self, text: &str) -> Arc<dyn Locator> {
        self.locator(Selector::Placeholder(text.to_string()))
    }

    fn get_by_test_id(&self, test_id: &str) -> Arc<dyn Locator> {
        self.locator(Selector::TestId(test_id.to_string()))
    }

    fn get_by_alt_text(&self, text: &str) -> Arc<dyn Locator> {
        self.locator(Selector::AltText(text.to_string()))
    }
}
