//! Automation engine boundary.
//!
//! A [`Page`] hands out lazy [`Locator`]s, one constructor per query kind. Locators are cheap
//! descriptions; nothing touches the document until `count` or an action is awaited.

use std::sync::Arc;

use async_trait::async_trait;
use locus_core_types::{AriaRole, QueryKind, StructuredQuery};

use crate::errors::ActionError;

#[async_trait]
pub trait Page: Send + Sync {
    /// Full document markup.
    async fn content(&self) -> Result<String, ActionError>;

    fn get_by_role(&self, role: AriaRole, name: Option<&str>) -> Arc<dyn Locator>;

    fn get_by_text(&self, text: &str, exact: bool) -> Arc<dyn Locator>;

    fn get_by_label(&self, text: &str) -> Arc<dyn Locator>;

    fn get_by_placeholder(&self, text: &str) -> Arc<dyn Locator>;

    fn get_by_test_id(&self, test_id: &str) -> Arc<dyn Locator>;

    fn get_by_alt_text(&self, text: &str) -> Arc<dyn Locator>;
}

#[async_trait]
pub trait Locator: Send + Sync {
    /// Human readable locator expression, used in logs and errors.
    fn description(&self) -> String;

    /// Zero-based nth match.
    fn nth(&self, index: usize) -> Arc<dyn Locator>;

    fn last(&self) -> Arc<dyn Locator>;

    async fn count(&self) -> Result<usize, ActionError>;

    async fn click(&self) -> Result<(), ActionError>;

    async fn dblclick(&self) -> Result<(), ActionError>;

    async fn tap(&self) -> Result<(), ActionError>;

    async fn hover(&self) -> Result<(), ActionError>;

    async fn focus(&self) -> Result<(), ActionError>;

    async fn fill(&self, value: &str) -> Result<(), ActionError>;

    async fn check(&self) -> Result<(), ActionError>;

    async fn uncheck(&self) -> Result<(), ActionError>;

    async fn select_option(&self, value: &str) -> Result<(), ActionError>;

    async fn press(&self, key: &str) -> Result<(), ActionError>;
}

/// Turn a structured query into an executable locator.
///
/// Text queries always match loosely (`exact = false`), mirroring how descriptions are phrased.
pub fn query_locator(
    page: &dyn Page,
    query: &StructuredQuery,
) -> Result<Arc<dyn Locator>, ActionError> {
    let first = query
        .params
        .first()
        .ok_or_else(|| ActionError::InvalidQuery(format!("{} has no parameters", query.kind)))?;

    let locator = match query.kind {
        QueryKind::Role => {
            let role = first
                .parse::<AriaRole>()
                .map_err(|err| ActionError::InvalidQuery(err.to_string()))?;
            page.get_by_role(role, query.params.get(1).map(String::as_str))
        }
        QueryKind::Text => page.get_by_text(first, false),
        QueryKind::Label => page.get_by_label(first),
        QueryKind::Placeholder => page.get_by_placeholder(first),
        QueryKind::TestId => page.get_by_test_id(first),
        QueryKind::AltText => page.get_by_alt_text(first),
    };
    Ok(locator)
}
