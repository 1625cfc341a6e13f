//! # Hashing
//!
//! Keccak-256 for anything that must be reproducible by an EVM verifier
//! (fingerprints, proof digests, function selectors) and BLAKE3 for local
//! identifier derivation.

use sha3::{Digest, Keccak256};

/// 256-bit hash output.
pub type Hash = [u8; 32];

/// Streaming Keccak-256 hasher.
#[derive(Clone, Default)]
pub struct Keccak256Hasher {
    inner: Keccak256,
}

impl Keccak256Hasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: Keccak256::new(),
        }
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finalize and return hash.
    pub fn finalize(self) -> Hash {
        self.inner.finalize().into()
    }
}

/// Keccak-256 of a single input.
pub fn keccak256(data: &[u8]) -> Hash {
    Keccak256::digest(data).into()
}

/// Keccak-256 over the concatenation of several inputs.
pub fn keccak256_many(inputs: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256Hasher::new();
    for input in inputs {
        hasher.update(input);
    }
    hasher.finalize()
}

/// Domain-separated BLAKE3 derivation.
///
/// `context` must be a hardcoded, globally unique string.
pub fn blake3_derive(context: &str, material: &[u8]) -> Hash {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(material);
    *hasher.finalize().as_bytes()
}
