//! # CT Aggregation
//!
//! Encrypted batch aggregation with oracle-bound decryption.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Providers submit opaque ciphertext fragments into a bounded batch. The
//! engine folds them into a running encrypted total without ever seeing a
//! plaintext, then asks an external oracle to decrypt the total. The oracle
//! callback is accepted only if:
//! - the request id is pending (at-most-once finalization),
//! - the batch aggregate still hashes to the fingerprint stored at request
//!   time (no stale or substituted ciphertext),
//! - the committee proof over `(engine, request id, cleartexts)` verifies.
//!
//! ## Security Features
//!
//! | Defense | Description |
//! |---------|-------------|
//! | Role gates | Owner/provider checks before any mutation |
//! | Pause switch | Owner halts batch and fragment operations |
//! | Cooldowns | Per-caller, per-action-class minimum interval |
//! | Fingerprint rebind | Callback recomputes the binding hash from current state |
//! | Threshold proof | `t`-of-`n` secp256k1 committee signatures |
//! | Request expiry | Stuck requests can be abandoned and re-requested |
//!
//! ## Module Structure
//!
//! ```text
//! ct-aggregation/
//! ├── domain/          # AccessControl, CooldownLedger, BatchRegistry, entities, errors
//! ├── algorithms/      # Homomorphic fold, binding fingerprint, cleartext codec
//! ├── ports/           # AggregatorApi (inbound) + FHE/oracle/verifier/clock (outbound)
//! ├── adapters/        # In-memory FHE, oracle, committee verifier, relayer
//! ├── application/     # FragmentAggregator, DecryptionCoordinator, engine, service
//! ├── events.rs        # AggregatorEvent
//! └── config.rs        # AggregatorConfig, CommitteeConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod events;
pub mod ports;

// Re-exports
pub use adapters::{
    CommitteeProofVerifier, DecryptionCommittee, DecryptionRequest, InMemoryDecryptionOracle,
    InMemoryFheExecutor, LocalRelayer, OracleResponse, RelayOutcome,
};
pub use algorithms::{
    binding_fingerprint, callback_selector, decode_total, decryption_digest, encode_cleartexts,
};
pub use application::{
    AggregationEngine, AggregationService, DecryptionCoordinator, FragmentAggregator,
    ServiceStats,
};
pub use config::{AggregatorConfig, CommitteeConfig};
pub use domain::{
    AccessControl, ActionClass, Address, AggregatorError, Batch, BatchId, BatchRegistry,
    BatchState, CallContext, CallbackSelector, CiphertextHandle, ContextStatus, CooldownLedger,
    CooldownPolicy, DecryptionContext, EncryptedTotal, ErrorKind, FheError, Fingerprint, Fragment,
    FragmentId, ModelVersion, OracleError, ProofError, RequestId, Timestamp,
};
pub use events::AggregatorEvent;
pub use ports::{
    AggregationTicket, AggregatorApi, DecryptionOracle, FheExecutor, FragmentReceipt,
    ManualTimeSource, ProofVerifier, SystemTimeSource, TimeSource,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
