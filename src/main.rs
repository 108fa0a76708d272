//! Muvera HTTP server entrypoint.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use muvera::config::Config;
use muvera::corpus::load_or_sample;
use muvera::embedding::EmbeddingProvider;
use muvera::evaluation::{
    DEFAULT_MAX_QUERIES, EVALUATION_RESULTS_FILE, Evaluator, load_or_default_queries,
};
use muvera::fusion::{FusionEngine, FusionWeights};
use muvera::gateway::{AppState, create_router_with_state};
use muvera::multivector::{MultiVectorEncoder, TensorIndexer, VespaClient};
use muvera::ratelimit::RateLimiter;
use muvera::search::SearchService;
use muvera::vectordb::{QdrantClient, VectorBackendClient};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check().await);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;
    let index_mode = std::env::args().any(|arg| arg == "--index");
    let evaluate_mode = std::env::args().any(|arg| arg == "--evaluate");

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        index_mode,
        evaluate_mode,
        "Muvera starting"
    );

    let corpus = Arc::new(load_or_sample(&config.data_dir));
    let embedder = Arc::new(EmbeddingProvider::load(
        config.model_path.as_deref(),
        config.vector_size,
        config.search_timeout(),
    ));

    let vectors = match QdrantClient::new(&config.qdrant_url, config.search_timeout()) {
        Ok(client) => {
            VectorBackendClient::connect(
                client,
                &config.collection_name,
                config.vector_size as u64,
            )
            .await
        }
        Err(e) => {
            tracing::warn!(error = %e, url = %config.qdrant_url, "Could not build Qdrant client");
            VectorBackendClient::absent()
        }
    };

    let weights = FusionWeights::new(config.semantic_weight, config.lexical_weight)
        .ok_or_else(|| anyhow::anyhow!("fusion weights must be finite and non-negative"))?;

    let service = Arc::new(
        SearchService::new(corpus.clone(), embedder, vectors)
            .with_fusion(FusionEngine::new(weights))
            .with_timeout(config.search_timeout()),
    );

    if index_mode {
        return run_indexing(&config, &service).await;
    }
    if evaluate_mode {
        return run_evaluation(&config, &service).await;
    }

    let limiter = if config.rate_limit_enabled {
        RateLimiter::new()
    } else {
        tracing::warn!("Rate limiting disabled");
        RateLimiter::disabled()
    };

    let state = AppState::new(service, Arc::new(limiter))
        .with_search_rate_limit(config.rate_limit_per_minute);
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, documents = corpus.len(), "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Muvera shutdown complete");
    Ok(())
}

async fn run_indexing(
    config: &Config,
    service: &SearchService<QdrantClient>,
) -> anyhow::Result<()> {
    if service.vectors().is_connected() {
        let report = service.index_documents().await;
        tracing::info!(indexed = report.indexed, failed = report.failed, "Dense vectors indexed");
    } else {
        tracing::warn!("Vector backend absent, skipping dense indexing");
    }

    match &config.tensor_url {
        Some(url) => {
            let client = VespaClient::new(url, config.search_timeout())?;
            let indexer = TensorIndexer::new(MultiVectorEncoder::default(), client);
            let report = indexer.index_corpus(service.corpus()).await;
            tracing::info!(indexed = report.indexed, failed = report.failed, "Multi-vectors indexed");
        }
        None => tracing::info!("No tensor backend configured, skipping multi-vector indexing"),
    }

    Ok(())
}

async fn run_evaluation(
    config: &Config,
    service: &SearchService<QdrantClient>,
) -> anyhow::Result<()> {
    let queries = load_or_default_queries(&config.data_dir);
    let max_queries = match arg_value("--max-queries") {
        Some(value) => value.parse::<usize>()?,
        None => DEFAULT_MAX_QUERIES,
    };

    let tensors = match &config.tensor_url {
        Some(url) => Some(TensorIndexer::new(
            MultiVectorEncoder::default(),
            VespaClient::new(url, config.search_timeout())?,
        )),
        None => {
            tracing::info!("No tensor backend configured, evaluating without multi-vector search");
            None
        }
    };

    let mut evaluator = Evaluator::new(service);
    if let Some(tensors) = &tensors {
        evaluator = evaluator.with_tensors(tensors);
    }

    let report = evaluator.run(&queries, max_queries).await;
    report.log_summary();
    report.save(Path::new(EVALUATION_RESULTS_FILE))?;
    tracing::info!(path = EVALUATION_RESULTS_FILE, "Evaluation results saved");
    Ok(())
}

fn arg_value(flag: &str) -> Option<String> {
    let mut args = std::env::args();
    args.find(|arg| arg == flag)?;
    args.next()
}

async fn run_health_check() -> i32 {
    let port = std::env::var("MUVERA_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/api/health", port);

    let Ok(client) = reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    else {
        return 1;
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
