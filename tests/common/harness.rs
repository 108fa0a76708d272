//! Test server harness.

use muvera::corpus::{Corpus, Document, sample_corpus};
use muvera::embedding::EmbeddingProvider;
use muvera::gateway::{AppState, create_router_with_state};
use muvera::ratelimit::RateLimiter;
use muvera::search::SearchService;
use muvera::vectordb::{MockVectorBackend, QdrantClient, VectorBackend, VectorBackendClient};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;
const TEST_COLLECTION_NAME: &str = "muvera_test";
const TEST_EMBEDDING_DIM: usize = 32;

#[derive(Debug, Clone)]
pub struct TestServerConfig {
    pub port: u16,
    pub collection_name: Option<String>,
    pub documents: Option<Vec<Document>>,
    pub search_rate_limit: u32,
    pub rate_limit_enabled: bool,
    pub index_on_start: bool,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            port: 0,
            collection_name: None,
            documents: None,
            search_rate_limit: 60,
            rate_limit_enabled: true,
            index_on_start: false,
        }
    }
}

impl TestServerConfig {
    pub fn with_documents(mut self, documents: Vec<Document>) -> Self {
        self.documents = Some(documents);
        self
    }

    pub fn with_search_rate_limit(mut self, limit: u32) -> Self {
        self.search_rate_limit = limit;
        self
    }

    pub fn without_rate_limit(mut self) -> Self {
        self.rate_limit_enabled = false;
        self
    }

    pub fn indexed(mut self) -> Self {
        self.index_on_start = true;
        self
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

/// Spawns a server with an in-memory vector backend and the hash-fallback embedder.
///
/// No external services are needed. Documents default to the built-in sample corpus.
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let collection_name = config
        .collection_name
        .clone()
        .unwrap_or_else(|| TEST_COLLECTION_NAME.to_string());

    let vectors = VectorBackendClient::connect(
        MockVectorBackend::new(),
        &collection_name,
        TEST_EMBEDDING_DIM as u64,
    )
    .await;
    if !vectors.is_connected() {
        return Err(ServerStartupError::StartupFailed(
            "mock backend did not connect".to_string(),
        ));
    }

    spawn_with_backend(config, vectors).await
}

/// Spawns a server against a **real Qdrant** at `MUVERA_QDRANT_URL`
/// (default `http://localhost:6334`).
///
/// The embedder is still the hash fallback. Fails if Qdrant is unreachable rather than
/// silently falling back to brute force.
pub async fn spawn_real_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let url = std::env::var("MUVERA_QDRANT_URL")
        .unwrap_or_else(|_| muvera::config::DEFAULT_QDRANT_URL.to_string());
    let collection_name = config
        .collection_name
        .clone()
        .unwrap_or_else(|| format!("{}_{}", TEST_COLLECTION_NAME, std::process::id()));

    let client = QdrantClient::new(&url, Duration::from_secs(10))
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
    let vectors =
        VectorBackendClient::connect(client, &collection_name, TEST_EMBEDDING_DIM as u64).await;
    if !vectors.is_connected() {
        return Err(ServerStartupError::StartupFailed(format!(
            "Qdrant unreachable at {}",
            url
        )));
    }

    spawn_with_backend(config, vectors).await
}

async fn spawn_with_backend<B: VectorBackend>(
    config: TestServerConfig,
    vectors: VectorBackendClient<B>,
) -> Result<TestServer, ServerStartupError> {
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    let corpus: Corpus = match config.documents {
        Some(documents) => documents.into_iter().collect(),
        None => sample_corpus(),
    };

    let embedder = Arc::new(EmbeddingProvider::fallback(
        TEST_EMBEDDING_DIM,
        Duration::from_secs(5),
    ));
    let service = SearchService::new(Arc::new(corpus), embedder, vectors)
        .with_timeout(Duration::from_secs(5));

    if config.index_on_start {
        let report = service.index_documents().await;
        if report.failed > 0 {
            return Err(ServerStartupError::StartupFailed(format!(
                "{} documents failed to index",
                report.failed
            )));
        }
    }

    let limiter = if config.rate_limit_enabled {
        RateLimiter::new()
    } else {
        RateLimiter::disabled()
    };

    let state = AppState::new(Arc::new(service), Arc::new(limiter))
        .with_search_rate_limit(config.search_rate_limit);
    let app = create_router_with_state(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        })
        .await
        .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}
