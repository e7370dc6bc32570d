//! Model reply parsing for structured queries.

use locus_core_types::{QueryKind, StructuredQuery};
use locus_llm_gateway::{extract_json_object, ResponseShape};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::errors::LocatorError;

/// Reply shape requested from the model.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct QueryResponse {
    #[serde(alias = "queryName", alias = "kind")]
    pub query: QueryKind,
    pub params: Vec<String>,
}

pub fn query_response_shape() -> ResponseShape {
    ResponseShape::of::<QueryResponse>("structured_query")
}

/// Parse and validate a model reply into a structured query.
pub fn parse_query_response(raw: &str) -> Result<StructuredQuery, LocatorError> {
    let json = extract_json_object(raw)
        .ok_or_else(|| LocatorError::parse("response contains no JSON object"))?;
    let response: QueryResponse =
        serde_json::from_str(&json).map_err(|err| LocatorError::parse(err.to_string()))?;
    let params = response
        .params
        .into_iter()
        .map(|param| param.trim().to_string())
        .collect();
    Ok(StructuredQuery::new(response.query, params)?)
}
