use serde_json::Value;

use super::error::ValidationError;
use super::types::{SearchRequest, SearchType};
use crate::constants::{DEFAULT_MAX_RESULTS, MAX_RESULTS_LIMIT};

pub const MIN_QUERY_CHARS: usize = 2;
pub const MAX_QUERY_CHARS: usize = 1000;

const FORBIDDEN_CHARS: [char; 6] = ['<', '>', '{', '}', '"', '\''];

/// Validates a raw JSON search body. Checks run in a fixed order and the first failure
/// wins.
pub fn validate_search_params(body: &Value) -> Result<SearchRequest, ValidationError> {
    let fields = match body.as_object() {
        Some(fields) if !fields.is_empty() => fields,
        _ => return Err(ValidationError::MissingBody),
    };

    let raw_query = fields.get("query").ok_or(ValidationError::MissingQuery)?;
    let query = match raw_query {
        Value::String(s) => s.trim(),
        Value::Null => "",
        _ => return Err(ValidationError::QueryNotString),
    };

    let query = validate_query(query)?;

    let max_results = match fields.get("max_results") {
        None => DEFAULT_MAX_RESULTS,
        Some(value) => value
            .as_i64()
            .filter(|n| (1..=MAX_RESULTS_LIMIT as i64).contains(n))
            .map(|n| n as usize)
            .ok_or(ValidationError::InvalidMaxResults)?,
    };

    let search_type = match fields.get("search_type") {
        None => SearchType::All,
        Some(value) => value
            .as_str()
            .and_then(|s| s.parse().ok())
            .ok_or(ValidationError::InvalidSearchType)?,
    };

    Ok(SearchRequest {
        query,
        max_results,
        search_type,
    })
}

/// Checks an already-trimmed query.
pub fn validate_query(query: &str) -> Result<String, ValidationError> {
    if query.is_empty() {
        return Err(ValidationError::EmptyQuery);
    }

    let chars = query.chars().count();
    if chars < MIN_QUERY_CHARS {
        return Err(ValidationError::QueryTooShort);
    }
    if chars > MAX_QUERY_CHARS {
        return Err(ValidationError::QueryTooLong);
    }

    if query.contains(FORBIDDEN_CHARS) {
        return Err(ValidationError::InvalidCharacters);
    }

    Ok(query.to_string())
}
