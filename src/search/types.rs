use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{CONTENT_PREVIEW_CHARS, DEFAULT_MAX_RESULTS};
use crate::corpus::Document;
use crate::vectordb::CollectionStats;

/// Which approaches a request runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    All,
    Semantic,
    Keyword,
    Hybrid,
}

impl SearchType {
    pub const VALID: [&'static str; 4] = ["all", "semantic", "keyword", "hybrid"];

    pub fn approaches(self) -> &'static [Approach] {
        match self {
            SearchType::All => &[Approach::Semantic, Approach::Keyword, Approach::Hybrid],
            SearchType::Semantic => &[Approach::Semantic],
            SearchType::Keyword => &[Approach::Keyword],
            SearchType::Hybrid => &[Approach::Hybrid],
        }
    }
}

impl FromStr for SearchType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(SearchType::All),
            "semantic" => Ok(SearchType::Semantic),
            "keyword" => Ok(SearchType::Keyword),
            "hybrid" => Ok(SearchType::Hybrid),
            _ => Err(()),
        }
    }
}

/// A single retrieval strategy as presented to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Approach {
    Semantic,
    Keyword,
    Hybrid,
}

impl Approach {
    pub fn key(self) -> &'static str {
        match self {
            Approach::Semantic => "semantic",
            Approach::Keyword => "keyword",
            Approach::Hybrid => "hybrid",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Approach::Semantic => "Semantic Search",
            Approach::Keyword => "Keyword Search",
            Approach::Hybrid => "Hybrid Search",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Approach::Semantic => "Dense vector similarity search",
            Approach::Keyword => "Traditional keyword-based search",
            Approach::Hybrid => "Combined semantic and keyword search",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Approach::Semantic => "#4F46E5",
            Approach::Keyword => "#DC2626",
            Approach::Hybrid => "#7C2D12",
        }
    }
}

/// A validated search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Trimmed query text.
    pub query: String,
    pub max_results: usize,
    pub search_type: SearchType,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: DEFAULT_MAX_RESULTS,
            search_type: SearchType::All,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = search_type;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub url: String,
    pub relevance: f64,
    pub timestamp: i64,
}

impl ResultItem {
    pub fn from_document(doc: &Document, relevance: f32) -> Self {
        Self {
            id: doc.id.clone(),
            title: if doc.title.is_empty() {
                "Untitled".to_string()
            } else {
                doc.title.clone()
            },
            content: truncate_content(&doc.content, CONTENT_PREVIEW_CHARS),
            url: doc.url.clone(),
            relevance: round_to(relevance as f64, 4),
            timestamp: doc.timestamp,
        }
    }
}

/// Result block for one approach. `error` is present only when the approach failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproachResponse {
    pub name: String,
    pub description: String,
    pub time_ms: f64,
    pub results: Vec<ResultItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub color: String,
}

impl ApproachResponse {
    pub fn success(approach: Approach, elapsed_ms: f64, results: Vec<ResultItem>) -> Self {
        Self {
            name: approach.name().to_string(),
            description: approach.description().to_string(),
            time_ms: round_to(elapsed_ms, 1),
            results,
            error: None,
            color: approach.color().to_string(),
        }
    }

    pub fn failure(approach: Approach, error: impl Into<String>) -> Self {
        Self {
            name: approach.name().to_string(),
            description: approach.description().to_string(),
            time_ms: 0.0,
            results: Vec::new(),
            error: Some(error.into()),
            color: approach.color().to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub approaches: BTreeMap<String, ApproachResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemStatus {
    pub qdrant_healthy: bool,
    pub model_loaded: bool,
    pub embeddings_loaded: bool,
    pub document_count: usize,
    pub collection_info: Option<CollectionStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemMetrics {
    pub cache_size: u64,
    pub document_count: usize,
    pub model_loaded: bool,
    pub qdrant_connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_metrics: Option<CollectionStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthComponents {
    pub vector_backend: bool,
    pub model_loaded: bool,
    pub cache_size: u64,
    pub document_count: usize,
}

/// `status` is `"healthy"` when at least one document is searchable.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: String,
    pub components: HealthComponents,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// First `max_chars` characters plus `...` when longer.
pub fn truncate_content(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &content[..byte_idx]),
        None => content.to_string(),
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
