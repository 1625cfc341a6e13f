//! # Shared Crypto
//!
//! Hashing and signature primitives used by the aggregation engine and its
//! adapters.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | Keccak-256 | Binding fingerprints, proof digests, selectors |
//! | `hashing` | BLAKE3 | Ciphertext handle derivation |
//! | `ecdsa` | secp256k1 | Decryption committee signatures |
//!
//! ## Security Properties
//!
//! - **Keccak-256**: EVM-compatible, collision resistant
//! - **secp256k1**: RFC 6979 deterministic nonces, low-S normalization

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;

// Re-exports
pub use ecdsa::{Secp256k1KeyPair, Secp256k1PublicKey, Secp256k1Signature, SIGNATURE_LEN};
pub use errors::CryptoError;
pub use hashing::{blake3_derive, keccak256, keccak256_many, Hash, Keccak256Hasher};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
