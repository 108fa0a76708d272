//! Token-level multi-vector encoding for tensor-capable backends.
//!
//! Documents become one vector per token ([`MultiVectorEncoder`]), serialized as
//! parallel float and int8 cell lists ([`DocumentTensors`]) and stored through a
//! [`TensorBackend`]. Ranking (MaxSim over tokens) is done by the backend.

pub mod backend;
pub mod encoder;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod quantize;
pub mod tensor;

#[cfg(test)]
mod tests;

pub use backend::{TensorBackend, TensorHit, TensorIndexer, VespaClient, parse_search_hits};
pub use encoder::{MultiVector, MultiVectorEncoder, TokenVector, max_sim};
pub use error::TensorBackendError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockTensorBackend;
pub use quantize::{dequantize, quantize};
pub use tensor::{CellAddress, DocumentTensors, TensorCell, TensorFeed, format_query_tensor};
