use thiserror::Error;

use crate::vectordb::VectorDbError;

/// Request rejected before any search work.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("JSON data required")]
    MissingBody,

    #[error("Query parameter is required")]
    MissingQuery,

    #[error("Query must be a string")]
    QueryNotString,

    #[error("Query cannot be empty")]
    EmptyQuery,

    #[error("Query must be at least 2 characters long")]
    QueryTooShort,

    #[error("Query cannot exceed 1000 characters")]
    QueryTooLong,

    #[error("Query contains invalid characters")]
    InvalidCharacters,

    #[error("max_results must be an integer between 1 and 50")]
    InvalidMaxResults,

    #[error("search_type must be one of: all, semantic, keyword, hybrid")]
    InvalidSearchType,
}

/// Failure of one retrieval source.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("vector search failed: {0}")]
    VectorDb(#[from] VectorDbError),

    #[error("no retrieval source available: {message}")]
    BackendUnavailable { message: String },

    #[error("internal search error: {message}")]
    Internal { message: String },
}
