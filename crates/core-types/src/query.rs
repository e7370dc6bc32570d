//! Structured query model.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::QueryModelError;
use crate::role::AriaRole;

/// Query kinds, serialised with the automation engine's method names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum QueryKind {
    #[serde(rename = "getByRole")]
    Role,
    #[serde(rename = "getByText")]
    Text,
    #[serde(rename = "getByLabel")]
    Label,
    #[serde(rename = "getByPlaceholder")]
    Placeholder,
    #[serde(rename = "getByTestId")]
    TestId,
    #[serde(rename = "getByAltText")]
    AltText,
}

impl QueryKind {
    /// Kinds in preference order: semantic queries first, test ids last.
    pub const PRIORITY: [QueryKind; 6] = [
        QueryKind::Role,
        QueryKind::Label,
        QueryKind::Placeholder,
        QueryKind::AltText,
        QueryKind::Text,
        QueryKind::TestId,
    ];

    pub fn method_name(&self) -> &'static str {
        match self {
            QueryKind::Role => "getByRole",
            QueryKind::Text => "getByText",
            QueryKind::Label => "getByLabel",
            QueryKind::Placeholder => "getByPlaceholder",
            QueryKind::TestId => "getByTestId",
            QueryKind::AltText => "getByAltText",
        }
    }

    pub fn from_method_name(value: &str) -> Result<Self, QueryModelError> {
        Self::PRIORITY
            .iter()
            .copied()
            .find(|kind| kind.method_name() == value.trim())
            .ok_or_else(|| QueryModelError::UnknownKind(value.to_string()))
    }

    fn arity(&self) -> (usize, usize, &'static str) {
        match self {
            QueryKind::Role => (1, 2, "1 or 2"),
            _ => (1, 1, "1"),
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

/// A closed-vocabulary, parameterised description of how to find an element.
///
/// The serialised form doubles as the persisted cache value:
/// `{"queryName": "getByRole", "params": ["heading", "Example Domain"]}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructuredQuery {
    #[serde(rename = "queryName")]
    pub kind: QueryKind,
    pub params: Vec<String>,
}

impl StructuredQuery {
    /// Build a query, enforcing the query model.
    pub fn new(kind: QueryKind, params: Vec<String>) -> Result<Self, QueryModelError> {
        Self { kind, params }.normalized()
    }

    /// Validate, then rewrite a role parameter to its canonical spelling (`"HEADING"` becomes
    /// `"heading"`).
    pub fn normalized(mut self) -> Result<Self, QueryModelError> {
        self.validate()?;
        if let Some(role) = self.aria_role() {
            self.params[0] = role.as_str().to_string();
        }
        Ok(self)
    }

    pub fn role(role: AriaRole, name: Option<&str>) -> Self {
        let mut params = vec![role.as_str().to_string()];
        if let Some(name) = name {
            params.push(name.to_string());
        }
        Self {
            kind: QueryKind::Role,
            params,
        }
    }

    /// Last-resort text query wrapping the caller's description verbatim.
    ///
    /// This constructor skips validation: it is not a model-derived answer.
    pub fn literal_text(description: &str) -> Self {
        Self {
            kind: QueryKind::Text,
            params: vec![description.to_string()],
        }
    }

    pub fn validate(&self) -> Result<(), QueryModelError> {
        if self.params.is_empty() {
            return Err(QueryModelError::EmptyParams);
        }
        let (min, max, expected) = self.kind.arity();
        if self.params.len() < min || self.params.len() > max {
            return Err(QueryModelError::Arity {
                kind: self.kind.method_name(),
                expected,
                actual: self.params.len(),
            });
        }
        if let Some(index) = self.params.iter().position(|p| p.trim().is_empty()) {
            return Err(QueryModelError::BlankParam {
                kind: self.kind.method_name(),
                index,
            });
        }
        if self.kind == QueryKind::Role {
            self.params[0].parse::<AriaRole>()?;
        }
        Ok(())
    }

    /// Role of a role query, if the first parameter names a valid role.
    pub fn aria_role(&self) -> Option<AriaRole> {
        match self.kind {
            QueryKind::Role => self.params.first()?.parse().ok(),
            _ => None,
        }
    }

    /// First parameter for single-argument kinds, or the accessible name for role queries.
    pub fn primary_text(&self) -> Option<&str> {
        match self.kind {
            QueryKind::Role => self.params.get(1).map(String::as_str),
            _ => self.params.first().map(String::as_str),
        }
    }
}

impl fmt::Display for StructuredQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self
            .params
            .iter()
            .map(|p| format!("{p:?}"))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}({})", self.kind.method_name(), params)
    }
}
