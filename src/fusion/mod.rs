//! Hybrid score fusion across retrieval strategies.

pub mod engine;
pub mod types;


pub use engine::FusionEngine;
pub use types::{FusedHit, FusionWeights, HitSource, ScoredHit};
