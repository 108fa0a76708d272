use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::error::GatewayError;
use super::state::AppState;
use crate::corpus::Document;
use crate::search::{
    SAMPLE_QUERIES, SearchResponse, SystemMetrics, SystemStatus, suggestions,
    validate_search_params,
};
use crate::vectordb::VectorBackend;

#[derive(Serialize)]
pub struct SampleQueriesResponse {
    pub queries: &'static [&'static str],
}

#[derive(Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<&'static str>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestionParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Serialize)]
pub struct InfoResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub features: &'static [&'static str],
    pub technologies: &'static [&'static str],
    pub endpoints: Endpoints,
}

#[derive(Serialize)]
pub struct Endpoints {
    pub search: &'static str,
    pub health: &'static str,
    pub status: &'static str,
    pub sample_queries: &'static str,
}

/// `POST /api/search`.
///
/// The search runs on its own task so a panic inside an approach surfaces as a
/// generic 500 instead of tearing down the connection.
#[instrument(skip(state, body), fields(body_len = body.len()))]
pub async fn search_handler<B: VectorBackend>(
    State(state): State<AppState<B>>,
    body: Bytes,
) -> Result<Json<SearchResponse>, GatewayError> {
    let params: Value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    let request = validate_search_params(&params)?;

    debug!(query = %request.query, max_results = request.max_results, search_type = ?request.search_type, "Search request");

    let service = state.search.clone();
    let started = std::time::Instant::now();
    let response = tokio::spawn(async move { service.search(&request).await })
        .await
        .map_err(|e| GatewayError::SearchFailed(e.to_string()))?;

    info!(
        approaches = response.approaches.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Search completed"
    );
    Ok(Json(response))
}

#[instrument(skip(state))]
pub async fn document_handler<B: VectorBackend>(
    State(state): State<AppState<B>>,
    Path(doc_id): Path<String>,
) -> Result<Json<Document>, GatewayError> {
    state
        .search
        .document(&doc_id)
        .map(|doc| Json(doc.as_ref().clone()))
        .ok_or(GatewayError::DocumentNotFound)
}

#[instrument]
pub async fn sample_queries_handler() -> Json<SampleQueriesResponse> {
    Json(SampleQueriesResponse {
        queries: &SAMPLE_QUERIES,
    })
}

#[instrument]
pub async fn suggestions_handler(Query(params): Query<SuggestionParams>) -> Json<SuggestionsResponse> {
    Json(SuggestionsResponse {
        suggestions: suggestions(&params.q),
    })
}

/// 200 when healthy, 503 otherwise; the body is the same report either way.
#[instrument(skip(state))]
pub async fn health_handler<B: VectorBackend>(State(state): State<AppState<B>>) -> Response {
    let report = state.search.health().await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        warn!(documents = report.components.document_count, "Health check failed");
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report)).into_response()
}

#[instrument(skip(state))]
pub async fn status_handler<B: VectorBackend>(
    State(state): State<AppState<B>>,
) -> Json<SystemStatus> {
    Json(state.search.status().await)
}

#[instrument(skip(state))]
pub async fn metrics_handler<B: VectorBackend>(
    State(state): State<AppState<B>>,
) -> Json<SystemMetrics> {
    Json(state.search.metrics().await)
}

#[instrument]
pub async fn info_handler() -> Json<InfoResponse> {
    Json(InfoResponse {
        name: "muvera",
        version: env!("CARGO_PKG_VERSION"),
        description: env!("CARGO_PKG_DESCRIPTION"),
        features: &[
            "Semantic Search (Dense Vector)",
            "Keyword Search (Token Overlap)",
            "Hybrid Search (Weighted Fusion)",
            "Multi-Vector Indexing",
            "Per-Client Rate Limiting",
        ],
        technologies: &["Rust", "Axum", "Qdrant", "Candle", "Vespa"],
        endpoints: Endpoints {
            search: "/api/search",
            health: "/api/health",
            status: "/api/status",
            sample_queries: "/api/sample-queries",
        },
    })
}
