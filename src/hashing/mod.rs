//! BLAKE3 helpers for content addressing and deterministic seeding.

use blake3::Hasher;

/// Canonical form of a text before hashing: trimmed, internal whitespace collapsed.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Full 256-bit content key of a text (after [`normalize_text`]).
#[inline]
pub fn hash_text(text: &str) -> [u8; 32] {
    *blake3::hash(normalize_text(text).as_bytes()).as_bytes()
}

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// With 64 bits the birthday bound sits near 4.3 billion items, far beyond any corpus
/// this service holds. Use [`hash_text`] when the full digest is needed.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// Seed for the deterministic generators. Depends only on the text bytes, so it is
/// stable across processes and platforms.
#[inline]
pub fn seed_from_text(text: &str) -> u64 {
    hash_to_u64(text.as_bytes())
}

/// Seed for a single token vector; `domain` separates token hashing from text hashing.
#[inline]
pub fn seed_from_token(domain: &str, token: &str) -> u64 {
    let mut hasher = Hasher::new();
    hasher.update(domain.as_bytes());
    hasher.update(b"|");
    hasher.update(token.as_bytes());

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hasher.finalize().as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// Numeric point id for a string document id.
#[inline]
pub fn point_id_for(doc_id: &str) -> u64 {
    hash_to_u64(doc_id.as_bytes())
}
