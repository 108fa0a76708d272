use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::types::{FusedHit, FusionWeights, ScoredHit};
use crate::corpus::Document;

struct Candidate {
    document: Arc<Document>,
    semantic: Option<f32>,
    lexical: Option<f32>,
}

/// Weighted linear fusion of a semantic and a lexical hit list.
#[derive(Debug, Clone, Copy, Default)]
pub struct FusionEngine {
    weights: FusionWeights,
}

impl FusionEngine {
    pub fn new(weights: FusionWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> FusionWeights {
        self.weights
    }

    /// Merges both lists into at most `k` results.
    ///
    /// `hybrid = semantic * w_s + lexical * w_l`, with a missing source counting as 0.
    /// Relevances are clamped to `[0, 1]` first. Ties keep first-seen order, semantic
    /// list before lexical list. Within one list only the first hit per document counts.
    pub fn fuse(&self, semantic: &[ScoredHit], lexical: &[ScoredHit], k: usize) -> Vec<FusedHit> {
        let mut order: Vec<Candidate> = Vec::with_capacity(semantic.len() + lexical.len());
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(order.capacity());

        for hit in semantic {
            let slot = candidate_slot(&mut order, &mut index, hit);
            order[slot].semantic.get_or_insert(clamp_relevance(hit.score));
        }

        for hit in lexical {
            let slot = candidate_slot(&mut order, &mut index, hit);
            order[slot].lexical.get_or_insert(clamp_relevance(hit.score));
        }

        let mut fused: Vec<FusedHit> = order
            .into_iter()
            .map(|c| FusedHit {
                hybrid_score: c.semantic.unwrap_or(0.0) * self.weights.semantic
                    + c.lexical.unwrap_or(0.0) * self.weights.lexical,
                document: c.document,
            })
            .collect();

        // Stable sort: equal scores stay in first-seen order.
        fused.sort_by(|a, b| {
            b.hybrid_score
                .partial_cmp(&a.hybrid_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        fused.truncate(k);

        debug!(
            semantic = semantic.len(),
            lexical = lexical.len(),
            fused = fused.len(),
            "Fused hit lists"
        );

        fused
    }
}

fn candidate_slot<'a>(
    order: &mut Vec<Candidate>,
    index: &mut HashMap<&'a str, usize>,
    hit: &'a ScoredHit,
) -> usize {
    *index.entry(hit.doc_id()).or_insert_with(|| {
        order.push(Candidate {
            document: hit.document.clone(),
            semantic: None,
            lexical: None,
        });
        order.len() - 1
    })
}

#[inline]
fn clamp_relevance(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}
