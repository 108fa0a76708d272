use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use chrono::Utc;
use futures_util::future::join_all;
use tracing::{debug, info, instrument, warn};

use super::error::SearchError;
use super::types::{
    Approach, ApproachResponse, HealthComponents, HealthReport, ResultItem, SearchRequest,
    SearchResponse, SystemMetrics, SystemStatus,
};
use crate::constants::DEFAULT_SEARCH_TIMEOUT_SECS;
use crate::corpus::{Corpus, Document, IndexReport};
use crate::embedding::EmbeddingProvider;
use crate::fusion::{FusedHit, FusionEngine, HitSource, ScoredHit};
use crate::lexical::LexicalScorer;
use crate::vectordb::{
    BruteForceIndex, DocumentPoint, SearchResult, VectorBackend, VectorBackendClient,
    VectorDbError,
};

/// Points sent per upsert call during bulk indexing.
pub const INDEX_BATCH_SIZE: usize = 64;

/// Runs the semantic, keyword and hybrid approaches over one corpus.
pub struct SearchService<B> {
    corpus: Arc<Corpus>,
    embedder: Arc<EmbeddingProvider>,
    lexical: LexicalScorer,
    vectors: VectorBackendClient<B>,
    brute_force: OnceLock<Arc<BruteForceIndex>>,
    fusion: FusionEngine,
    timeout: Duration,
}

impl<B: VectorBackend> SearchService<B> {
    pub fn new(
        corpus: Arc<Corpus>,
        embedder: Arc<EmbeddingProvider>,
        vectors: VectorBackendClient<B>,
    ) -> Self {
        Self {
            lexical: LexicalScorer::new(corpus.clone()),
            corpus,
            embedder,
            vectors,
            brute_force: OnceLock::new(),
            fusion: FusionEngine::default(),
            timeout: Duration::from_secs(DEFAULT_SEARCH_TIMEOUT_SECS),
        }
    }

    pub fn with_fusion(mut self, fusion: FusionEngine) -> Self {
        self.fusion = fusion;
        self
    }

    /// Upper bound on one approach, and on each source inside hybrid.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn corpus(&self) -> &Arc<Corpus> {
        &self.corpus
    }

    pub fn embedder(&self) -> &Arc<EmbeddingProvider> {
        &self.embedder
    }

    pub fn vectors(&self) -> &VectorBackendClient<B> {
        &self.vectors
    }

    /// Runs every approach `request.search_type` selects, concurrently.
    ///
    /// Never fails: an approach that errors is reported with an `error` field and no
    /// results.
    #[instrument(skip(self, request), fields(query_len = request.query.len(), search_type = ?request.search_type))]
    pub async fn search(&self, request: &SearchRequest) -> SearchResponse {
        let runs = request
            .search_type
            .approaches()
            .iter()
            .map(|&approach| self.run_approach(approach, &request.query, request.max_results));

        let approaches = join_all(runs)
            .await
            .into_iter()
            .map(|(approach, response)| (approach.key().to_string(), response))
            .collect();

        SearchResponse {
            query: request.query.clone(),
            approaches,
        }
    }

    async fn run_approach(
        &self,
        approach: Approach,
        query: &str,
        k: usize,
    ) -> (Approach, ApproachResponse) {
        let start = Instant::now();

        let outcome = match approach {
            Approach::Semantic => self
                .search_semantic(query, k)
                .await
                .map(|hits| scored_items(&hits)),
            Approach::Keyword => Ok(scored_items(&self.search_keyword(query, k))),
            Approach::Hybrid => Ok(fused_items(&self.search_hybrid(query, k).await)),
        };

        let response = match outcome {
            Ok(results) => {
                let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
                debug!(approach = approach.key(), hits = results.len(), elapsed_ms, "Approach finished");
                ApproachResponse::success(approach, elapsed_ms, results)
            }
            Err(e) => {
                warn!(approach = approach.key(), error = %e, "Approach failed");
                ApproachResponse::failure(approach, e.to_string())
            }
        };

        (approach, response)
    }

    /// Top `k` documents by dense similarity, bounded by the service timeout.
    pub async fn search_semantic(&self, query: &str, k: usize) -> Result<Vec<ScoredHit>, SearchError> {
        tokio::time::timeout(self.timeout, self.semantic_hits(query, k))
            .await
            .map_err(|_| SearchError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            })
    }

    pub fn search_keyword(&self, query: &str, k: usize) -> Vec<ScoredHit> {
        self.lexical.search(query, k)
    }

    /// Fuses `2k` semantic and `2k` lexical hits into `k`.
    ///
    /// A semantic source that fails or runs past the deadline contributes nothing; the
    /// lexical hits are still fused.
    pub async fn search_hybrid(&self, query: &str, k: usize) -> Vec<FusedHit> {
        let fetch = k.saturating_mul(2);
        let deadline = tokio::time::Instant::now() + self.timeout;

        let (semantic, lexical) = tokio::join!(
            tokio::time::timeout_at(deadline, self.semantic_hits(query, fetch)),
            async { self.lexical.search(query, fetch) },
        );

        let semantic = semantic.unwrap_or_else(|_| {
            warn!(timeout_ms = self.timeout.as_millis() as u64, "Semantic source timed out, fusing lexical only");
            Vec::new()
        });

        self.fusion.fuse(&semantic, &lexical, k)
    }

    /// Dense hits from the vector backend, or the brute-force scan when it cannot answer.
    async fn semantic_hits(&self, query: &str, k: usize) -> Vec<ScoredHit> {
        if self.vectors.is_connected() {
            let vector = self.embedder.encode(query).await;
            let queried = tokio::time::timeout(self.timeout, self.vectors.query(vector, k))
                .await
                .unwrap_or(Err(VectorDbError::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                }));

            match queried {
                Ok(results) => return self.backend_hits(results),
                Err(VectorDbError::Timeout { timeout_ms }) => {
                    warn!(timeout_ms, "Vector query timed out, using brute-force scan");
                }
                Err(VectorDbError::InvalidDimension { expected, actual }) => {
                    warn!(expected, actual, "Query vector dimension mismatch, using brute-force scan");
                }
                Err(e) => {
                    warn!(error = %e, "Vector query failed, using brute-force scan");
                }
            }
        } else {
            debug!("No vector backend, using brute-force scan");
        }

        self.brute_force_hits(query, k)
    }

    fn backend_hits(&self, results: Vec<SearchResult>) -> Vec<ScoredHit> {
        results
            .into_iter()
            .map(|result| {
                let document = self
                    .corpus
                    .get(&result.document.id)
                    .cloned()
                    .unwrap_or_else(|| Arc::new(result.document));
                ScoredHit::new(document, result.score, HitSource::Semantic)
            })
            .collect()
    }

    fn brute_force_hits(&self, query: &str, k: usize) -> Vec<ScoredHit> {
        let index = self.brute_force.get_or_init(|| {
            info!(documents = self.corpus.len(), "Building brute-force index");
            Arc::new(BruteForceIndex::build(
                &self.corpus,
                self.embedder.embedding_dim(),
            ))
        });

        let query_vector = self.embedder.encode_fallback(query);
        index
            .search(&query_vector, k)
            .into_iter()
            .map(|(document, score)| ScoredHit::new(document, score, HitSource::Semantic))
            .collect()
    }

    pub fn document(&self, id: &str) -> Option<Arc<Document>> {
        self.corpus.get(id).cloned()
    }

    /// Embeds every corpus document and upserts it in batches of [`INDEX_BATCH_SIZE`].
    ///
    /// A failed batch counts each of its documents as failed; indexing continues.
    #[instrument(skip(self), fields(documents = self.corpus.len()))]
    pub async fn index_documents(&self) -> IndexReport {
        let mut report = IndexReport::default();
        let documents: Vec<&Arc<Document>> = self.corpus.iter().collect();

        for batch in documents.chunks(INDEX_BATCH_SIZE) {
            let mut points = Vec::with_capacity(batch.len());
            for doc in batch {
                let vector = self.embedder.encode(&doc.searchable_text()).await;
                points.push(DocumentPoint::from_document(doc, vector));
            }

            let ok = match self.vectors.upsert_many(points).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, batch = batch.len(), "Vector upsert failed");
                    false
                }
            };
            for _ in batch.iter() {
                report.record(ok);
            }
        }

        info!(indexed = report.indexed, failed = report.failed, "Vector indexing finished");
        report
    }

    pub async fn health(&self) -> HealthReport {
        let document_count = self.corpus.len();
        HealthReport {
            status: if document_count > 0 { "healthy" } else { "unhealthy" },
            timestamp: Utc::now().to_rfc3339(),
            components: HealthComponents {
                vector_backend: self.vectors.is_healthy().await,
                model_loaded: self.embedder.is_model_loaded(),
                cache_size: self.embedder.cache().len(),
                document_count,
            },
        }
    }

    pub async fn status(&self) -> SystemStatus {
        let collection_info = self.collection_stats().await;
        let embeddings_loaded = collection_info
            .as_ref()
            .is_some_and(|stats| stats.points_count > 0)
            || self.brute_force.get().is_some();

        SystemStatus {
            qdrant_healthy: self.vectors.is_healthy().await,
            model_loaded: self.embedder.is_model_loaded(),
            embeddings_loaded,
            document_count: self.corpus.len(),
            collection_info,
        }
    }

    pub async fn metrics(&self) -> SystemMetrics {
        SystemMetrics {
            cache_size: self.embedder.cache().len(),
            document_count: self.corpus.len(),
            model_loaded: self.embedder.is_model_loaded(),
            qdrant_connected: self.vectors.is_connected(),
            collection_metrics: self.collection_stats().await,
        }
    }

    async fn collection_stats(&self) -> Option<crate::vectordb::CollectionStats> {
        if !self.vectors.is_connected() {
            return None;
        }
        match self.vectors.stats().await {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!(error = %e, "Failed to read collection stats");
                None
            }
        }
    }
}

fn scored_items(hits: &[ScoredHit]) -> Vec<ResultItem> {
    hits.iter()
        .map(|hit| ResultItem::from_document(&hit.document, hit.score))
        .collect()
}

fn fused_items(hits: &[FusedHit]) -> Vec<ResultItem> {
    hits.iter()
        .map(|hit| ResultItem::from_document(&hit.document, hit.hybrid_score))
        .collect()
}
