//! Deterministic hash-seeded embeddings.
//!
//! Output depends only on the input bytes: identical across runs, processes and call order.

use crate::hashing::seed_from_text;

/// 64-bit LCG producing uniform values in `[-1, 1]`.
#[derive(Debug, Clone)]
pub struct SeededGenerator {
    state: u64,
}

impl SeededGenerator {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    #[inline]
    pub fn next_value(&mut self) -> f32 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1);
        ((self.state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0
    }

    /// Draws `dim` values and L2-normalizes them.
    pub fn unit_vector(&mut self, dim: usize) -> Vec<f32> {
        let raw = (0..dim).map(|_| self.next_value()).collect();
        l2_normalize(raw)
    }
}

/// Normalizes to unit length; the zero vector is returned unchanged.
pub fn l2_normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

/// Unit vector of `dim` values seeded from `text`.
pub fn fallback_embedding(text: &str, dim: usize) -> Vec<f32> {
    SeededGenerator::new(seed_from_text(text)).unit_vector(dim)
}
