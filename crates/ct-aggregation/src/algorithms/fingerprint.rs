//! # Fingerprints
//!
//! Keccak-256 bindings between a decryption request and its callback.

use crate::domain::{Address, CallbackSelector, Fingerprint, RequestId};
use shared_crypto::{keccak256, Keccak256Hasher};

/// Callback the oracle invokes on fulfillment.
pub const CALLBACK_SIGNATURE: &str = "onAggregationResult(uint256,bytes,bytes)";

/// Domain separator for committee signatures.
pub const PROOF_DOMAIN: &[u8] = b"ct-aggregation/decryption/v1";

/// Binding fingerprint over an ordered handle list plus the engine identity.
///
/// The list length is hashed first so that `[a, b]` and `[a ‖ b]`-style
/// concatenations cannot collide.
pub fn binding_fingerprint(handles: &[[u8; 32]], contract: &Address) -> Fingerprint {
    let mut hasher = Keccak256Hasher::new();
    hasher.update(&(handles.len() as u64).to_be_bytes());
    for handle in handles {
        hasher.update(handle);
    }
    hasher.update(contract.as_bytes());
    Fingerprint(hasher.finalize())
}

/// Message the decryption committee signs for a fulfillment.
pub fn decryption_digest(contract: &Address, request_id: RequestId, cleartexts: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256Hasher::new();
    hasher
        .update(PROOF_DOMAIN)
        .update(contract.as_bytes())
        .update(&request_id.to_be_bytes())
        .update(&keccak256(cleartexts));
    hasher.finalize()
}

/// Selector of [`CALLBACK_SIGNATURE`].
pub fn callback_selector() -> CallbackSelector {
    let digest = keccak256(CALLBACK_SIGNATURE.as_bytes());
    CallbackSelector([digest[0], digest[1], digest[2], digest[3]])
}
