//! Dense text embeddings.
//!
//! - [`EmbeddingProvider`] is the entry point used by search and indexing.
//! - [`bert`] runs a sentence-transformer checkpoint through candle.
//! - [`fallback`] produces deterministic vectors when no model is usable.

/// BERT sentence embedder.
pub mod bert;
pub mod cache;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
pub mod fallback;
pub mod provider;
/// Tokenizer loading helpers.
pub mod utils;


pub use bert::BertEmbeddingModel;
pub use cache::EmbeddingCache;
pub use error::EmbeddingError;
pub use fallback::{SeededGenerator, fallback_embedding, l2_normalize};
pub use provider::EmbeddingProvider;

/// Synchronous text embedder. Called from a blocking thread.
pub trait TextEmbedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}
