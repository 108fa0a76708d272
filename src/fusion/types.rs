use std::sync::Arc;

use serde::Serialize;

use crate::constants::{DEFAULT_LEXICAL_WEIGHT, DEFAULT_SEMANTIC_WEIGHT};
use crate::corpus::Document;

/// Which retrieval strategy produced a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HitSource {
    Semantic,
    Lexical,
}

/// A single strategy's scored document. Lives for one request.
#[derive(Debug, Clone)]
pub struct ScoredHit {
    pub document: Arc<Document>,
    pub score: f32,
    pub source: HitSource,
}

impl ScoredHit {
    pub fn new(document: Arc<Document>, score: f32, source: HitSource) -> Self {
        Self {
            document,
            score,
            source,
        }
    }

    pub fn doc_id(&self) -> &str {
        &self.document.id
    }
}

/// Output of fusion. Per-source scores are not retained.
#[derive(Debug, Clone)]
pub struct FusedHit {
    pub document: Arc<Document>,
    pub hybrid_score: f32,
}

/// Linear fusion weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    pub semantic: f32,
    pub lexical: f32,
}

impl FusionWeights {
    /// Returns `None` unless both weights are finite and non-negative.
    pub fn new(semantic: f32, lexical: f32) -> Option<Self> {
        let valid = |w: f32| w.is_finite() && w >= 0.0;
        (valid(semantic) && valid(lexical)).then_some(Self { semantic, lexical })
    }
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            semantic: DEFAULT_SEMANTIC_WEIGHT,
            lexical: DEFAULT_LEXICAL_WEIGHT,
        }
    }
}
