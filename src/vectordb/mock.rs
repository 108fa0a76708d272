use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::vectordb::{
    CollectionStats, DocumentPoint, SearchResult, VectorBackend, VectorDbError, WriteConsistency,
    cosine_similarity,
};

/// In-memory [`VectorBackend`] with exact cosine search.
#[derive(Default)]
pub struct MockVectorBackend {
    collections: std::sync::RwLock<HashMap<String, MockCollection>>,
    failing: AtomicBool,
    unreachable: AtomicBool,
}

#[derive(Default, Clone)]
struct MockCollection {
    vector_size: u64,
    points: HashMap<u64, DocumentPoint>,
}

impl MockVectorBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose health check fails, as if the service were down.
    pub fn unreachable() -> Self {
        let backend = Self::default();
        backend.unreachable.store(true, Ordering::SeqCst);
        backend
    }

    /// Makes every subsequent search and upsert fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn point_count(&self, collection: &str) -> Option<usize> {
        self.collections
            .read()
            .ok()?
            .get(collection)
            .map(|c| c.points.len())
    }

    fn check_failing(&self, collection: &str) -> Result<(), VectorDbError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(VectorDbError::SearchFailed {
                collection: collection.to_string(),
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

impl VectorBackend for MockVectorBackend {
    async fn health_check(&self) -> Result<(), VectorDbError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(VectorDbError::ConnectionFailed {
                url: "mock://".to_string(),
                message: "unreachable".to_string(),
            });
        }
        Ok(())
    }

    async fn ensure_collection(&self, name: &str, vector_size: u64) -> Result<(), VectorDbError> {
        let mut collections =
            self.collections
                .write()
                .map_err(|_| VectorDbError::CreateCollectionFailed {
                    collection: name.to_string(),
                    message: "lock poisoned".to_string(),
                })?;

        collections
            .entry(name.to_string())
            .or_insert(MockCollection {
                vector_size,
                points: HashMap::new(),
            });

        Ok(())
    }

    async fn upsert_points(
        &self,
        collection: &str,
        points: Vec<DocumentPoint>,
        _consistency: WriteConsistency,
    ) -> Result<(), VectorDbError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(VectorDbError::UpsertFailed {
                collection: collection.to_string(),
                message: "injected failure".to_string(),
            });
        }

        let mut collections =
            self.collections
                .write()
                .map_err(|_| VectorDbError::UpsertFailed {
                    collection: collection.to_string(),
                    message: "lock poisoned".to_string(),
                })?;

        let coll =
            collections
                .get_mut(collection)
                .ok_or_else(|| VectorDbError::CollectionNotFound {
                    collection: collection.to_string(),
                })?;

        for point in points {
            if point.vector.len() as u64 != coll.vector_size {
                return Err(VectorDbError::InvalidDimension {
                    expected: coll.vector_size as usize,
                    actual: point.vector.len(),
                });
            }
            coll.points.insert(point.id, point);
        }

        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<SearchResult>, VectorDbError> {
        self.check_failing(collection)?;

        let collections = self
            .collections
            .read()
            .map_err(|_| VectorDbError::SearchFailed {
                collection: collection.to_string(),
                message: "lock poisoned".to_string(),
            })?;

        let coll =
            collections
                .get(collection)
                .ok_or_else(|| VectorDbError::CollectionNotFound {
                    collection: collection.to_string(),
                })?;

        let mut results: Vec<SearchResult> = coll
            .points
            .values()
            .map(|p| SearchResult {
                id: p.id,
                score: cosine_similarity(&query, &p.vector),
                document: p.document.clone(),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.document.id.cmp(&b.document.id))
        });

        results.truncate(limit as usize);
        Ok(results)
    }

    async fn collection_stats(&self, collection: &str) -> Result<CollectionStats, VectorDbError> {
        let points = self.point_count(collection).ok_or_else(|| {
            VectorDbError::CollectionNotFound {
                collection: collection.to_string(),
            }
        })? as u64;

        Ok(CollectionStats {
            name: collection.to_string(),
            status: "green".to_string(),
            points_count: points,
            indexed_vectors_count: points,
        })
    }
}
