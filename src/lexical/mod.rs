//! Token-overlap relevance over the in-memory corpus.
//!
//! `score = |query_tokens ∩ doc_tokens| / |query_tokens|` over distinct tokens. The
//! score is not normalized by document length, so long documents are favored for short
//! queries.


use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::corpus::Corpus;
use crate::fusion::{HitSource, ScoredHit};

/// Lowercases and splits on every non-alphanumeric character. No stemming, no stopwords.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Distinct tokens of `text`.
pub fn token_set(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}

/// Overlap of `query_tokens` with `doc_tokens`, divided by the query token count.
pub fn overlap_score(query_tokens: &HashSet<String>, doc_tokens: &HashSet<String>) -> f32 {
    if query_tokens.is_empty() {
        return 0.0;
    }
    let shared = query_tokens.intersection(doc_tokens).count();
    shared as f32 / query_tokens.len() as f32
}

/// Precomputed token sets for every corpus document, in corpus order.
pub struct LexicalScorer {
    corpus: Arc<Corpus>,
    doc_tokens: Vec<HashSet<String>>,
}

impl LexicalScorer {
    pub fn new(corpus: Arc<Corpus>) -> Self {
        let doc_tokens = corpus
            .iter()
            .map(|doc| token_set(&doc.searchable_text()))
            .collect();
        Self { corpus, doc_tokens }
    }

    /// Best `limit` documents with a non-zero score, descending; ties keep corpus order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<ScoredHit> {
        let query_tokens = token_set(query);
        if query_tokens.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut hits: Vec<ScoredHit> = self
            .corpus
            .iter()
            .zip(&self.doc_tokens)
            .filter_map(|(doc, tokens)| {
                let score = overlap_score(&query_tokens, tokens);
                (score > 0.0).then(|| ScoredHit::new(doc.clone(), score, HitSource::Lexical))
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);

        debug!(query_tokens = query_tokens.len(), hits = hits.len(), "Lexical search");
        hits
    }

    pub fn corpus(&self) -> &Arc<Corpus> {
        &self.corpus
    }
}
