use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use super::bert::BertEmbeddingModel;
use super::cache::EmbeddingCache;
use super::device::select_device;
use super::error::EmbeddingError;
use super::fallback::fallback_embedding;
use super::TextEmbedder;
use crate::constants::validate_embedding_dim;
use crate::hashing::{hash_text, normalize_text};

enum EmbedderBackend {
    Model(Arc<dyn TextEmbedder>),
    Fallback,
}

/// Text to dense vector, with a process-lifetime cache and a deterministic fallback.
///
/// [`EmbeddingProvider::encode`] never fails. Model errors, timeouts and dimension
/// mismatches are logged and answered with [`fallback_embedding`].
pub struct EmbeddingProvider {
    backend: EmbedderBackend,
    cache: EmbeddingCache,
    dim: usize,
    timeout: Duration,
}

impl std::fmt::Debug for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingProvider")
            .field(
                "backend",
                &match self.backend {
                    EmbedderBackend::Model(_) => "Model",
                    EmbedderBackend::Fallback => "Fallback",
                },
            )
            .field("dim", &self.dim)
            .field("timeout", &self.timeout)
            .field("cache", &self.cache)
            .finish()
    }
}

impl EmbeddingProvider {
    /// Loads the model at `model_path`, or runs in fallback mode when it is unset or
    /// fails to load.
    pub fn load(model_path: Option<&Path>, dim: usize, timeout: Duration) -> Self {
        let Some(path) = model_path else {
            info!(dim, "No embedding model configured, using hash fallback");
            return Self::fallback(dim, timeout);
        };

        let loaded = select_device().and_then(|device| BertEmbeddingModel::load(path, &device));
        match loaded {
            Ok(model) => Self::with_embedder(Arc::new(model), dim, timeout),
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Embedding model unavailable, using hash fallback");
                Self::fallback(dim, timeout)
            }
        }
    }

    /// Provider that only ever uses the deterministic fallback.
    pub fn fallback(dim: usize, timeout: Duration) -> Self {
        Self {
            backend: EmbedderBackend::Fallback,
            cache: EmbeddingCache::new(),
            dim,
            timeout,
        }
    }

    pub fn with_embedder(embedder: Arc<dyn TextEmbedder>, dim: usize, timeout: Duration) -> Self {
        Self {
            backend: EmbedderBackend::Model(embedder),
            cache: EmbeddingCache::new(),
            dim,
            timeout,
        }
    }

    /// Embeds `text`. Same input, same output, for the lifetime of the provider.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn encode(&self, text: &str) -> Vec<f32> {
        let normalized = normalize_text(text);

        let embedder = match &self.backend {
            EmbedderBackend::Model(embedder) => embedder,
            EmbedderBackend::Fallback => return fallback_embedding(&normalized, self.dim),
        };

        let key = hash_text(&normalized);
        if let Some(hit) = self.cache.get(&key) {
            debug!("Embedding cache hit");
            return hit.as_ref().clone();
        }

        match self.encode_with_model(embedder.clone(), normalized.clone()).await {
            Ok(vector) => self.cache.insert(key, vector).as_ref().clone(),
            Err(e) => {
                warn!(error = %e, "Embedding model failed, using hash fallback");
                fallback_embedding(&normalized, self.dim)
            }
        }
    }

    /// Deterministic embedding regardless of backend.
    pub fn encode_fallback(&self, text: &str) -> Vec<f32> {
        fallback_embedding(&normalize_text(text), self.dim)
    }

    async fn encode_with_model(
        &self,
        embedder: Arc<dyn TextEmbedder>,
        text: String,
    ) -> Result<Vec<f32>, EmbeddingError> {
        let task = tokio::task::spawn_blocking(move || embedder.embed(&text));

        let vector = tokio::time::timeout(self.timeout, task)
            .await
            .map_err(|_| EmbeddingError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            })?
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("embedding task failed: {}", e),
            })??;

        validate_embedding_dim(vector.len(), self.dim).map_err(|_| {
            EmbeddingError::DimensionMismatch {
                expected: self.dim,
                actual: vector.len(),
            }
        })?;

        Ok(vector)
    }

    pub fn is_model_loaded(&self) -> bool {
        matches!(self.backend, EmbedderBackend::Model(_))
    }

    pub fn embedding_dim(&self) -> usize {
        self.dim
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }
}
