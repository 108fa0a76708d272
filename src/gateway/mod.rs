//! HTTP gateway (Axum) for search and system endpoints.
//!
//! This module is primarily used by the `muvera` server binary.

#![allow(missing_docs)]

pub mod error;
pub mod handler;
pub mod rate_limit;
pub mod state;

#[cfg(test)]
mod handler_tests;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::search_handler;
pub use rate_limit::RouteLimit;
pub use state::AppState;

use crate::constants::{METRICS_RATE_LIMIT_PER_MINUTE, STATUS_RATE_LIMIT_PER_MINUTE};
use crate::vectordb::VectorBackend;
use handler::{
    document_handler, health_handler, info_handler, metrics_handler, sample_queries_handler,
    status_handler, suggestions_handler,
};
use rate_limit::enforce_rate_limit;

pub fn create_router_with_state<B: VectorBackend>(state: AppState<B>) -> Router {
    let limiter = state.limiter.clone();
    let limited = move |limit: u32| {
        middleware::from_fn_with_state(RouteLimit::new(limiter.clone(), limit), enforce_rate_limit)
    };
    let search_limit = state.search_rate_limit;

    Router::new()
        .route(
            "/api/search",
            post(search_handler::<B>).layer(limited(search_limit)),
        )
        .route("/api/document/{doc_id}", get(document_handler::<B>))
        .route("/api/sample-queries", get(sample_queries_handler))
        .route("/api/search-suggestions", get(suggestions_handler))
        .route("/api/health", get(health_handler::<B>))
        .route(
            "/api/status",
            get(status_handler::<B>).layer(limited(STATUS_RATE_LIMIT_PER_MINUTE)),
        )
        .route("/api/info", get(info_handler))
        .route(
            "/api/metrics",
            get(metrics_handler::<B>).layer(limited(METRICS_RATE_LIMIT_PER_MINUTE)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
