//! # Algorithms Module
//!
//! Homomorphic folding, fingerprint binding and the cleartext codec.

pub mod aggregation;
pub mod cleartext;
pub mod fingerprint;

pub use aggregation::{aggregate_handles, fold_score};
pub use cleartext::{decode_total, decode_words, encode_cleartexts, WORD_LEN};
pub use fingerprint::{
    binding_fingerprint, callback_selector, decryption_digest, CALLBACK_SIGNATURE, PROOF_DOMAIN,
};
