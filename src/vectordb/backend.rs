use tracing::{info, instrument, warn};

use super::client::VectorBackend;
use super::error::VectorDbError;
use super::model::{CollectionStats, DocumentPoint, SearchResult};
use super::WriteConsistency;
use crate::corpus::Document;

/// Vector backend capability, resolved once at startup.
///
/// `Absent` means no reachable backend: queries return [`VectorDbError::Unavailable`]
/// and the caller takes its brute-force path.
pub enum VectorBackendClient<B> {
    Connected {
        backend: B,
        collection: String,
        vector_size: u64,
    },
    Absent,
}

impl<B: VectorBackend> VectorBackendClient<B> {
    /// Probes `backend` and ensures the collection exists; `Absent` if either fails.
    pub async fn connect(backend: B, collection: &str, vector_size: u64) -> Self {
        if let Err(e) = backend.health_check().await {
            warn!(error = %e, "Vector backend unreachable, semantic search will use brute force");
            return Self::Absent;
        }

        if let Err(e) = backend.ensure_collection(collection, vector_size).await {
            warn!(error = %e, collection, "Failed to ensure collection, semantic search will use brute force");
            return Self::Absent;
        }

        info!(collection, vector_size, "Vector backend connected");
        Self::Connected {
            backend,
            collection: collection.to_string(),
            vector_size,
        }
    }

    pub fn absent() -> Self {
        Self::Absent
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }

    pub fn collection(&self) -> Option<&str> {
        match self {
            Self::Connected { collection, .. } => Some(collection),
            Self::Absent => None,
        }
    }

    /// Top-`k` hits by similarity.
    #[instrument(skip(self, vector), fields(dim = vector.len()))]
    pub async fn query(&self, vector: Vec<f32>, k: usize) -> Result<Vec<SearchResult>, VectorDbError> {
        match self {
            Self::Connected {
                backend,
                collection,
                vector_size,
            } => {
                if vector.len() as u64 != *vector_size {
                    return Err(VectorDbError::InvalidDimension {
                        expected: *vector_size as usize,
                        actual: vector.len(),
                    });
                }
                backend.search(collection, vector, k as u64).await
            }
            Self::Absent => Err(VectorDbError::Unavailable),
        }
    }

    /// Stores one document vector. Upserting the same document id twice overwrites it.
    pub async fn upsert(&self, doc: &Document, vector: Vec<f32>) -> Result<(), VectorDbError> {
        self.upsert_many(vec![DocumentPoint::from_document(doc, vector)])
            .await
    }

    pub async fn upsert_many(&self, points: Vec<DocumentPoint>) -> Result<(), VectorDbError> {
        match self {
            Self::Connected {
                backend,
                collection,
                ..
            } => {
                backend
                    .upsert_points(collection, points, WriteConsistency::Strong)
                    .await
            }
            Self::Absent => Err(VectorDbError::Unavailable),
        }
    }

    pub async fn is_healthy(&self) -> bool {
        match self {
            Self::Connected { backend, .. } => backend.health_check().await.is_ok(),
            Self::Absent => false,
        }
    }

    pub async fn stats(&self) -> Result<CollectionStats, VectorDbError> {
        match self {
            Self::Connected {
                backend,
                collection,
                ..
            } => backend.collection_stats(collection).await,
            Self::Absent => Err(VectorDbError::Unavailable),
        }
    }
}
