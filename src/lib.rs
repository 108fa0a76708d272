//! Muvera library crate (used by the server binary and integration tests).
//!
//! # Public API Surface
//!
//! ## Retrieval
//! - [`EmbeddingProvider`], [`EmbeddingCache`] - Text embedding with a deterministic fallback
//! - [`LexicalScorer`] - Token-overlap keyword relevance
//! - [`VectorBackendClient`], [`QdrantClient`] - Dense vector search, or `Absent`
//! - [`FusionEngine`] - Weighted hybrid fusion
//! - [`SearchService`] - The three approaches behind one request
//!
//! ## Indexing
//! - [`MultiVectorEncoder`], [`TensorIndexer`], [`VespaClient`] - Per-token tensors
//!
//! ## Evaluation
//! - [`Evaluator`], [`EvaluationReport`] - Single- vs multi-vector comparison runs
//!
//! ## Serving
//! - [`Config`], [`ConfigError`] - Environment configuration
//! - [`RateLimiter`] - Per-client sliding-window admission
//! - [`gateway`] - Axum router and handlers
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod corpus;
pub mod embedding;
pub mod evaluation;
pub mod fusion;
pub mod gateway;
pub mod hashing;
pub mod lexical;
pub mod multivector;
pub mod ratelimit;
pub mod search;
pub mod vectordb;

pub use config::{Config, ConfigError};
pub use constants::{DimValidationError, validate_embedding_dim};
pub use corpus::{Corpus, CorpusError, Document, IndexReport};
pub use embedding::{EmbeddingCache, EmbeddingError, EmbeddingProvider, fallback_embedding};
pub use evaluation::{EvalQuery, EvaluationError, EvaluationReport, Evaluator};
pub use fusion::{FusedHit, FusionEngine, FusionWeights, HitSource, ScoredHit};
pub use hashing::{hash_text, hash_to_u64};
pub use lexical::LexicalScorer;
#[cfg(any(test, feature = "mock"))]
pub use multivector::MockTensorBackend;
pub use multivector::{
    MultiVector, MultiVectorEncoder, TensorBackend, TensorBackendError, TensorIndexer,
    VespaClient, dequantize, quantize,
};
pub use ratelimit::RateLimiter;
pub use search::{SearchError, SearchRequest, SearchResponse, SearchService, SearchType};
#[cfg(any(test, feature = "mock"))]
pub use vectordb::MockVectorBackend;
pub use vectordb::{
    QdrantClient, SearchResult, VectorBackend, VectorBackendClient, VectorDbError,
};
