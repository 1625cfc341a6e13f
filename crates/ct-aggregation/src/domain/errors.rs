//! # Domain Errors
//!
//! Every failure aborts the attempted operation. Apart from the cooldown
//! slot consumed under `CooldownPolicy::ChargeOnAttempt`, a rejected call
//! leaves all engine state untouched.

use super::value_objects::{ActionClass, BatchId, CiphertextHandle, RequestId};
use thiserror::Error;

/// Coarse error categories, for callers that route on class rather than
/// on the exact variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Role or pause gate rejected the caller.
    Authorization,
    /// Cooldown still active.
    RateLimit,
    /// Wrong batch lifecycle state for the requested transition.
    BatchLifecycle,
    /// Decryption request/callback protocol violation.
    DecryptionProtocol,
    /// Rejected configuration value.
    Configuration,
    /// Failure reported by an external capability.
    Capability,
}

/// Aggregation engine error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregatorError {
    /// Caller is not the owner.
    #[error("Caller is not the owner")]
    NotOwner,

    /// Caller is not a registered provider.
    #[error("Caller is not a provider")]
    NotProvider,

    /// Mutating operations are paused.
    #[error("Engine is paused")]
    Paused,

    /// Pause requested while already paused.
    #[error("Engine is already paused")]
    AlreadyPaused,

    /// Same action class repeated too soon.
    #[error("Cooldown active for {action}: {remaining_secs}s remaining")]
    CooldownActive {
        /// Rate-limited action class
        action: ActionClass,
        /// Seconds until the next attempt is allowed
        remaining_secs: u64,
    },

    /// A batch is already open.
    #[error("Batch {0} is still open")]
    BatchAlreadyOpen(BatchId),

    /// Current batch no longer accepts fragments.
    #[error("Batch {0} is closed")]
    BatchClosed(BatchId),

    /// Current batch reached its fragment ceiling.
    #[error("Batch {batch_id} is full ({max} fragments)")]
    BatchFull {
        /// Full batch
        batch_id: BatchId,
        /// Configured ceiling
        max: u64,
    },

    /// No batch, or wrong state for the requested transition.
    #[error("Invalid batch state: {0}")]
    InvalidBatch(String),

    /// Aggregation requested on a batch that never received a fragment.
    #[error("Batch {0} has no encrypted aggregate")]
    AggregateUninitialized(BatchId),

    /// Unknown, already processed or expired request id.
    #[error("Invalid decryption request: {0}")]
    InvalidRequest(RequestId),

    /// Ciphertext state drifted since the request was issued.
    #[error("Ciphertext state changed since request {0}")]
    InvalidState(RequestId),

    /// Oracle proof did not verify.
    #[error("Decryption proof verification failed: {0}")]
    ProofVerificationFailed(#[from] ProofError),

    /// Cleartext payload does not decode to the expected words.
    #[error("Malformed cleartexts: {0}")]
    MalformedCleartexts(String),

    /// Expiry attempted before the request timeout elapsed.
    #[error("Request {request_id} not expired: {remaining_secs}s remaining")]
    RequestNotExpired {
        /// Pending request
        request_id: RequestId,
        /// Seconds until it may be expired
        remaining_secs: u64,
    },

    /// Rejected configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// FHE capability failure.
    #[error("FHE capability error: {0}")]
    Fhe(#[from] FheError),

    /// Decryption oracle failure.
    #[error("Decryption oracle error: {0}")]
    Oracle(#[from] OracleError),
}

impl AggregatorError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotOwner | Self::NotProvider | Self::Paused | Self::AlreadyPaused => {
                ErrorKind::Authorization
            }
            Self::CooldownActive { .. } => ErrorKind::RateLimit,
            Self::BatchAlreadyOpen(_)
            | Self::BatchClosed(_)
            | Self::BatchFull { .. }
            | Self::InvalidBatch(_)
            | Self::AggregateUninitialized(_) => ErrorKind::BatchLifecycle,
            Self::InvalidRequest(_)
            | Self::InvalidState(_)
            | Self::ProofVerificationFailed(_)
            | Self::MalformedCleartexts(_)
            | Self::RequestNotExpired { .. } => ErrorKind::DecryptionProtocol,
            Self::InvalidConfig(_) => ErrorKind::Configuration,
            Self::Fhe(_) | Self::Oracle(_) => ErrorKind::Capability,
        }
    }
}

/// Errors raised by the homomorphic encryption capability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FheError {
    /// Handle not known to the executor.
    #[error("Unknown ciphertext handle {0}")]
    UnknownHandle(CiphertextHandle),

    /// Executor unavailable.
    #[error("FHE executor unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by the decryption oracle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// The oracle refused the request.
    #[error("Decryption request rejected: {0}")]
    Rejected(String),

    /// The oracle handed out an id that already has a context.
    #[error("Duplicate request id {0}")]
    DuplicateRequestId(RequestId),

    /// Empty handle list.
    #[error("Decryption request carries no handles")]
    EmptyRequest,
}

/// Errors raised while checking an oracle decryption proof.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProofError {
    /// Proof bytes are not a whole number of signatures.
    #[error("Malformed proof: {0}")]
    Malformed(String),

    /// Not enough distinct committee members signed.
    #[error("Insufficient signatures: {valid}/{threshold}")]
    InsufficientSignatures {
        /// Distinct valid signers found
        valid: usize,
        /// Required signers
        threshold: usize,
    },
}
