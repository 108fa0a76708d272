//! Document corpus held in memory for lexical scoring and brute-force fallback.

pub mod document;
pub mod error;
pub mod loader;


pub use document::{Corpus, Document};
pub use error::CorpusError;
pub use loader::{SAMPLE_TOPICS, load_jsonl, load_or_sample, sample_corpus};

/// Outcome of a bulk indexing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexReport {
    /// Documents accepted by the backend.
    pub indexed: usize,
    /// Documents that failed to embed or upload.
    pub failed: usize,
}

impl IndexReport {
    pub fn record(&mut self, ok: bool) {
        if ok {
            self.indexed += 1;
        } else {
            self.failed += 1;
        }
    }
}
