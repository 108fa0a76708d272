//! Dense vector search: Qdrant client, backend capability and brute-force fallback.

pub mod backend;
pub mod brute_force;
pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;


pub use backend::VectorBackendClient;
pub use brute_force::{BruteForceIndex, cosine_similarity};
pub use client::{QdrantClient, VectorBackend};
pub use error::VectorDbError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockVectorBackend;
pub use model::{CollectionStats, DocumentPoint, SearchResult};

pub const DEFAULT_VECTOR_SIZE: u64 = crate::constants::DEFAULT_VECTOR_SIZE_U64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteConsistency {
    /// Wait for the operation to be indexed and searchable. Maps to `wait=true`.
    Strong,
    /// Return once the server acknowledges receipt. Maps to `wait=false`.
    Eventual,
}

impl From<WriteConsistency> for bool {
    fn from(c: WriteConsistency) -> bool {
        matches!(c, WriteConsistency::Strong)
    }
}
