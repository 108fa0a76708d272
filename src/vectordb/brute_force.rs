use std::sync::Arc;

use crate::corpus::{Corpus, Document};
use crate::embedding::fallback_embedding;

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

/// Fallback-embedding vectors for every corpus document, scanned linearly.
///
/// Used when the vector backend is absent or failing. Document vectors are hash-seeded,
/// so queries must be embedded with the same fallback for scores to mean anything.
pub struct BruteForceIndex {
    entries: Vec<(Arc<Document>, Vec<f32>)>,
}

impl BruteForceIndex {
    pub fn build(corpus: &Corpus, dim: usize) -> Self {
        let entries = corpus
            .iter()
            .map(|doc| {
                let text = crate::hashing::normalize_text(&doc.searchable_text());
                (doc.clone(), fallback_embedding(&text, dim))
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top `limit` documents by cosine similarity; ties keep corpus order.
    pub fn search(&self, query: &[f32], limit: usize) -> Vec<(Arc<Document>, f32)> {
        let mut scored: Vec<(Arc<Document>, f32)> = self
            .entries
            .iter()
            .map(|(doc, vector)| (doc.clone(), cosine_similarity(query, vector)))
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        scored
    }
}
