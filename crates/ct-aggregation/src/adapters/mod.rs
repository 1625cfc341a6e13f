//! # Adapters Layer (Hexagonal Architecture)
//!
//! In-memory implementations of the outbound ports, for local nodes and
//! tests: a plaintext-shadowed FHE executor, a queue-backed decryption
//! oracle with a signing committee, the matching threshold proof verifier,
//! and a relayer that closes the request/callback loop.

mod committee_verifier;
mod decryption_oracle;
mod in_memory_fhe;
mod relayer;

pub use committee_verifier::CommitteeProofVerifier;
pub use decryption_oracle::{
    DecryptionCommittee, DecryptionRequest, InMemoryDecryptionOracle, OracleResponse,
};
pub use in_memory_fhe::InMemoryFheExecutor;
pub use relayer::{LocalRelayer, RelayOutcome};
