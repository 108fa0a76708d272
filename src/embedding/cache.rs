use std::sync::Arc;

use moka::sync::Cache;

/// Content-addressed embedding memo, keyed by the BLAKE3 hash of normalized text.
///
/// Unbounded and without TTL: entries live for the process lifetime. Concurrent
/// writers for the same key converge on the first stored vector.
#[derive(Clone)]
pub struct EmbeddingCache {
    entries: Cache<[u8; 32], Arc<Vec<f32>>>,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().build(),
        }
    }

    #[inline]
    pub fn get(&self, key: &[u8; 32]) -> Option<Arc<Vec<f32>>> {
        self.entries.get(key)
    }

    /// Stores `vector` unless the key is already present; returns the cached value.
    pub fn insert(&self, key: [u8; 32], vector: Vec<f32>) -> Arc<Vec<f32>> {
        self.entries
            .entry(key)
            .or_insert(Arc::new(vector))
            .into_value()
    }

    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EmbeddingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingCache")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}
