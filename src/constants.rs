//! Cross-cutting, shared constants.
//!
//! Prefer deriving secondary constants from primary ones to avoid drift.
//!
//! # Dimension Invariants
//!
//! The dense embedding dimension is fixed for the lifetime of a deployment: query vectors,
//! fallback vectors and the vector backend collection must all agree. Use
//! [`validate_embedding_dim`] at module boundaries (model output, backend upsert) to catch
//! mismatches before they reach similarity math.

use std::time::Duration;

/// Dense embedding dimension (sentence-transformers MiniLM family).
pub const DEFAULT_EMBEDDING_DIM: usize = 384;
pub const DEFAULT_VECTOR_SIZE_U64: u64 = DEFAULT_EMBEDDING_DIM as u64;

/// Tokenizer truncation for the embedding model.
pub const DEFAULT_MAX_SEQ_LEN: usize = 256;

/// Per-token vector dimension for multi-vector encoding.
pub const DEFAULT_TOKEN_DIM: usize = 128;

/// Max tokens kept per document/query in multi-vector encoding.
pub const DEFAULT_MAX_TOKENS: usize = 32;

/// Scale used by the int8 tensor encoding.
pub const INT8_SCALE: f32 = 127.0;

pub const DEFAULT_SEMANTIC_WEIGHT: f32 = 0.7;
pub const DEFAULT_LEXICAL_WEIGHT: f32 = 0.3;

/// Trailing window used by the rate limiter.
pub const RATE_WINDOW: Duration = Duration::from_secs(60);
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 60;
pub const STATUS_RATE_LIMIT_PER_MINUTE: u32 = 30;
pub const METRICS_RATE_LIMIT_PER_MINUTE: u32 = 10;

pub const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_MAX_RESULTS: usize = 10;
pub const MAX_RESULTS_LIMIT: usize = 50;

/// Characters of content shown in a search result before the ellipsis.
pub const CONTENT_PREVIEW_CHARS: usize = 200;

/// Error returned when dimension validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimValidationError {
    /// Embedding dimension cannot be zero.
    ZeroDimension,
    /// Runtime dimension does not match expected dimension.
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for DimValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDimension => write!(f, "embedding dimension cannot be zero"),
            Self::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "dimension mismatch: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for DimValidationError {}

/// Validates that a runtime embedding dimension matches the expected dimension.
///
/// # Example
///
/// ```
/// use muvera::constants::{validate_embedding_dim, DEFAULT_EMBEDDING_DIM};
///
/// validate_embedding_dim(384, DEFAULT_EMBEDDING_DIM).unwrap();
/// ```
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if expected == 0 {
        return Err(DimValidationError::ZeroDimension);
    }
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
