use std::sync::Arc;
use std::time::Duration;

use axum::{Router, body::Body, http::Request, http::StatusCode, response::IntoResponse};
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::corpus::{Corpus, Document};
use crate::embedding::EmbeddingProvider;
use crate::gateway::create_router_with_state;
use crate::gateway::error::GatewayError;
use crate::gateway::rate_limit::{
    RATE_LIMIT_LIMIT_HEADER, RATE_LIMIT_REMAINING_HEADER, RATE_LIMIT_RESET_HEADER,
};
use crate::gateway::state::AppState;
use crate::ratelimit::RateLimiter;
use crate::search::{SearchService, ValidationError};
use crate::vectordb::{MockVectorBackend, VectorBackendClient};

const DIM: usize = 16;
const TEST_COLLECTION_NAME: &str = "handler_test_collection";

fn test_corpus() -> Corpus {
    [
        Document::new("A", "Quantum Computing Basics", "An introduction to qubits")
            .with_url("https://example.com/a"),
        Document::new("B", "Cooking", "Recipes for pasta"),
    ]
    .into_iter()
    .collect()
}

async fn setup_state(corpus: Corpus, limiter: RateLimiter) -> AppState<MockVectorBackend> {
    let vectors =
        VectorBackendClient::connect(MockVectorBackend::new(), TEST_COLLECTION_NAME, DIM as u64)
            .await;
    let embedder = Arc::new(EmbeddingProvider::fallback(DIM, Duration::from_secs(5)));
    let service = SearchService::new(Arc::new(corpus), embedder, vectors);
    AppState::new(Arc::new(service), Arc::new(limiter))
}

async fn create_test_router() -> Router {
    create_router_with_state(setup_state(test_corpus(), RateLimiter::new()).await)
}

async fn send_search(router: &Router, body: Body) -> axum::response::Response {
    let request = Request::builder()
        .method("POST")
        .uri("/api/search")
        .header("Content-Type", "application/json")
        .body(body)
        .unwrap();

    router.clone().oneshot(request).await.unwrap()
}

async fn send_get(router: &Router, uri: &str) -> axum::response::Response {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    router.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json(value: serde_json::Value) -> Body {
    Body::from(serde_json::to_string(&value).unwrap())
}

#[tokio::test]
async fn test_search_all_approaches() {
    let router = create_test_router().await;

    let response = send_search(&router, json(serde_json::json!({"query": "quantum computing"}))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["query"], "quantum computing");

    let approaches = body["approaches"].as_object().unwrap();
    assert_eq!(approaches.len(), 3);
    for key in ["semantic", "keyword", "hybrid"] {
        let entry = &approaches[key];
        assert!(entry["name"].is_string());
        assert!(entry["color"].is_string());
        assert!(entry["time_ms"].is_number());
        assert!(entry.get("error").is_none());
    }

    let keyword = &approaches["keyword"]["results"];
    assert_eq!(keyword[0]["id"], "A");
    assert_eq!(keyword[0]["relevance"], 1.0);

    let hybrid = &approaches["hybrid"]["results"];
    assert_eq!(hybrid[0]["id"], "A");
    assert_eq!(hybrid[0]["relevance"], 0.3);
}

#[tokio::test]
async fn test_search_single_type_and_max_results() {
    let router = create_test_router().await;

    let response = send_search(
        &router,
        json(serde_json::json!({"query": "quantum", "search_type": "semantic", "max_results": 1})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let approaches = body["approaches"].as_object().unwrap();
    assert_eq!(approaches.len(), 1);
    assert_eq!(approaches["semantic"]["name"], "Semantic Search");
    assert!(approaches["semantic"]["results"].as_array().unwrap().len() <= 1);
}

#[tokio::test]
async fn test_search_missing_body() {
    let router = create_test_router().await;

    let response = send_search(&router, Body::empty()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "JSON data required");

    let response = send_search(&router, Body::from("not json")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "JSON data required");
}

#[tokio::test]
async fn test_search_validation_errors() {
    let router = create_test_router().await;

    let cases = [
        (serde_json::json!({"max_results": 5}), "Query parameter is required"),
        (serde_json::json!({"query": "a"}), "Query must be at least 2 characters long"),
        (serde_json::json!({"query": "{bad}"}), "Query contains invalid characters"),
        (
            serde_json::json!({"query": "fine", "max_results": 51}),
            "max_results must be an integer between 1 and 50",
        ),
        (
            serde_json::json!({"query": "fine", "search_type": "vector"}),
            "search_type must be one of: all, semantic, keyword, hybrid",
        ),
    ];

    for (body, message) in cases {
        let response = send_search(&router, json(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], message);
        assert_eq!(body["code"], 400);
    }
}

#[tokio::test]
async fn test_search_rate_limited() {
    let state = setup_state(test_corpus(), RateLimiter::new())
        .await
        .with_search_rate_limit(2);
    let router = create_router_with_state(state);
    let body = || json(serde_json::json!({"query": "quantum computing", "search_type": "keyword"}));

    let first = send_search(&router, body()).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.headers()[RATE_LIMIT_LIMIT_HEADER], "2");
    assert_eq!(first.headers()[RATE_LIMIT_REMAINING_HEADER], "1");
    assert!(first.headers().contains_key(RATE_LIMIT_RESET_HEADER));

    let second = send_search(&router, body()).await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(second.headers()[RATE_LIMIT_REMAINING_HEADER], "0");

    let third = send_search(&router, body()).await;
    assert_eq!(third.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(third.headers()[RATE_LIMIT_REMAINING_HEADER], "0");
    let body = json_body(third).await;
    assert_eq!(body["error"], "Rate limit exceeded");
    assert_eq!(body["message"], "Maximum 2 requests per minute allowed");
}

#[tokio::test]
async fn test_rate_limit_keys_on_forwarded_for() {
    let state = setup_state(test_corpus(), RateLimiter::new())
        .await
        .with_search_rate_limit(1);
    let router = create_router_with_state(state);

    let send_from = |ip: &'static str| {
        let router = router.clone();
        async move {
            let request = Request::builder()
                .method("POST")
                .uri("/api/search")
                .header("Content-Type", "application/json")
                .header("X-Forwarded-For", ip)
                .body(json(serde_json::json!({"query": "pasta", "search_type": "keyword"})))
                .unwrap();
            router.oneshot(request).await.unwrap().status()
        }
    };

    assert_eq!(send_from("10.0.0.1").await, StatusCode::OK);
    assert_eq!(send_from("10.0.0.1, 172.16.0.1").await, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(send_from("10.0.0.2").await, StatusCode::OK);
}

#[tokio::test]
async fn test_disabled_limiter_never_blocks() {
    let state = setup_state(test_corpus(), RateLimiter::disabled())
        .await
        .with_search_rate_limit(1);
    let router = create_router_with_state(state);

    for _ in 0..3 {
        let response =
            send_search(&router, json(serde_json::json!({"query": "pasta", "search_type": "keyword"})))
                .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[RATE_LIMIT_REMAINING_HEADER], "1");
    }
}

#[tokio::test]
async fn test_metrics_rate_limit_is_ten_per_minute() {
    let router = create_test_router().await;

    for _ in 0..10 {
        assert_eq!(send_get(&router, "/api/metrics").await.status(), StatusCode::OK);
    }
    let response = send_get(&router, "/api/metrics").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()[RATE_LIMIT_LIMIT_HEADER], "10");
}

#[tokio::test]
async fn test_document_endpoint() {
    let router = create_test_router().await;

    let response = send_get(&router, "/api/document/A").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["id"], "A");
    assert_eq!(body["url"], "https://example.com/a");

    let response = send_get(&router, "/api/document/missing").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "Document not found");
}

#[tokio::test]
async fn test_sample_queries_and_suggestions() {
    let router = create_test_router().await;

    let body = json_body(send_get(&router, "/api/sample-queries").await).await;
    assert_eq!(body["queries"].as_array().unwrap().len(), 20);

    let body = json_body(send_get(&router, "/api/search-suggestions?q=Mac").await).await;
    assert_eq!(body["suggestions"], serde_json::json!(["machine learning"]));

    let body = json_body(send_get(&router, "/api/search-suggestions").await).await;
    assert_eq!(body["suggestions"], serde_json::json!([]));
}

#[tokio::test]
async fn test_health_endpoint() {
    let router = create_test_router().await;

    let response = send_get(&router, "/api/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["components"]["document_count"], 2);
    assert_eq!(body["components"]["vector_backend"], true);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_health_endpoint_empty_corpus() {
    let router =
        create_router_with_state(setup_state(Corpus::new(), RateLimiter::new()).await);

    let response = send_get(&router, "/api/health").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["status"], "unhealthy");
}

#[tokio::test]
async fn test_status_and_info_endpoints() {
    let router = create_test_router().await;

    let response = send_get(&router, "/api/status").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[RATE_LIMIT_LIMIT_HEADER], "30");
    let body = json_body(response).await;
    assert_eq!(body["qdrant_healthy"], true);
    assert_eq!(body["model_loaded"], false);
    assert_eq!(body["document_count"], 2);

    let body = json_body(send_get(&router, "/api/info").await).await;
    assert_eq!(body["name"], "muvera");
    assert_eq!(body["endpoints"]["search"], "/api/search");
}

#[test]
fn test_gateway_error_statuses() {
    let cases = [
        (
            GatewayError::InvalidRequest(ValidationError::EmptyQuery),
            StatusCode::BAD_REQUEST,
        ),
        (GatewayError::DocumentNotFound, StatusCode::NOT_FOUND),
        (
            GatewayError::RateLimited { limit: 5 },
            StatusCode::TOO_MANY_REQUESTS,
        ),
        (
            GatewayError::SearchFailed("panic".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (
            GatewayError::InternalError("oops".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (error, status) in cases {
        assert_eq!(error.into_response().status(), status);
    }
}

#[tokio::test]
async fn test_search_failure_body_is_generic() {
    let response = GatewayError::SearchFailed("task panicked: secret detail".to_string()).into_response();
    let body = json_body(response).await;
    assert_eq!(body["error"], "Search failed");
    assert!(!body.to_string().contains("secret"));
}
