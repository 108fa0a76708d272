//! Request-level search: validation, the three approaches and their response shapes.
//!
//! [`SearchService`] owns the corpus-derived scorers and the vector backend capability.
//! Approaches run concurrently and fail independently; a failed approach is reported in
//! its own entry while the overall response still succeeds.

pub mod catalog;
pub mod error;
pub mod service;
pub mod types;
pub mod validate;


pub use catalog::{SAMPLE_QUERIES, suggestions};
pub use error::{SearchError, ValidationError};
pub use service::SearchService;
pub use types::{
    Approach, ApproachResponse, HealthReport, ResultItem, SearchRequest, SearchResponse,
    SearchType, SystemMetrics, SystemStatus,
};
pub use validate::validate_search_params;
