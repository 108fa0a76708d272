use crate::constants::{DEFAULT_MAX_TOKENS, DEFAULT_TOKEN_DIM};
use crate::embedding::SeededGenerator;
use crate::hashing::seed_from_token;
use crate::lexical::tokenize;

use super::error::TensorBackendError;

const TOKEN_SEED_DOMAIN: &str = "multivector-token";

/// One token's vector.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenVector {
    pub token_index: usize,
    pub values: Vec<f32>,
}

/// Per-token matrix of a text: `rows x dim`, never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiVector {
    dim: usize,
    tokens: Vec<TokenVector>,
}

impl MultiVector {
    /// A single all-zero row, used for texts without tokens.
    pub fn zero(dim: usize) -> Self {
        Self {
            dim,
            tokens: vec![TokenVector {
                token_index: 0,
                values: vec![0.0; dim],
            }],
        }
    }

    /// Builds from explicit rows; falls back to [`MultiVector::zero`] when `rows` is empty.
    pub fn from_rows(rows: Vec<TokenVector>) -> Self {
        let dim = rows.first().map(|r| r.values.len()).unwrap_or(0);
        if rows.is_empty() {
            return Self::zero(dim);
        }
        Self { dim, tokens: rows }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn num_tokens(&self) -> usize {
        self.tokens.len()
    }

    pub fn tokens(&self) -> &[TokenVector] {
        &self.tokens
    }

    pub fn is_zero(&self) -> bool {
        self.tokens
            .iter()
            .all(|t| t.values.iter().all(|&v| v == 0.0))
    }
}

/// Token-level encoder. Each token maps to a hash-seeded unit vector, so the same token
/// always yields the same row.
#[derive(Debug, Clone, Copy)]
pub struct MultiVectorEncoder {
    dim: usize,
    max_tokens: usize,
}

impl Default for MultiVectorEncoder {
    fn default() -> Self {
        Self {
            dim: DEFAULT_TOKEN_DIM,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl MultiVectorEncoder {
    pub fn new(dim: usize, max_tokens: usize) -> Result<Self, TensorBackendError> {
        if dim == 0 || max_tokens == 0 {
            return Err(TensorBackendError::InvalidConfig {
                reason: format!(
                    "dim ({}) and max_tokens ({}) must be greater than 0",
                    dim, max_tokens
                ),
            });
        }
        Ok(Self { dim, max_tokens })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Encodes the first `max_tokens` tokens of `text`.
    pub fn encode(&self, text: &str) -> MultiVector {
        let tokens: Vec<TokenVector> = tokenize(text)
            .iter()
            .take(self.max_tokens)
            .enumerate()
            .map(|(token_index, token)| TokenVector {
                token_index,
                values: self.token_vector(token),
            })
            .collect();

        if tokens.is_empty() {
            return MultiVector::zero(self.dim);
        }

        MultiVector {
            dim: self.dim,
            tokens,
        }
    }

    fn token_vector(&self, token: &str) -> Vec<f32> {
        SeededGenerator::new(seed_from_token(TOKEN_SEED_DOMAIN, token)).unit_vector(self.dim)
    }
}

/// Late-interaction score: for each query row, the best dot product over document rows,
/// summed.
pub fn max_sim(query: &MultiVector, doc: &MultiVector) -> f32 {
    query
        .tokens()
        .iter()
        .map(|q| {
            doc.tokens()
                .iter()
                .map(|d| q.values.iter().zip(&d.values).map(|(a, b)| a * b).sum::<f32>())
                .fold(f32::NEG_INFINITY, f32::max)
        })
        .filter(|s| s.is_finite())
        .sum()
}
