//! # Domain Value Objects
//!
//! Immutable value types for the aggregation engine. These are defined by
//! their value, not identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Batch identifier. Monotonically increasing, first batch is 1.
pub type BatchId = u64;

/// Per-batch fragment identifier. 1-based, sequential, never reused.
pub type FragmentId = u64;

/// Oracle-assigned decryption request identifier.
pub type RequestId = u64;

/// Aggregation model / version number captured at request time.
pub type ModelVersion = u32;

/// Seconds since the Unix epoch, as supplied by the execution environment.
pub type Timestamp = u64;

// =============================================================================
// ADDRESS (20 bytes)
// =============================================================================

/// A 20-byte caller identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an address from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{}...{}",
            hex::encode(&self.0[..4]),
            hex::encode(&self.0[18..])
        )
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

// =============================================================================
// CIPHERTEXT HANDLE (32 bytes)
// =============================================================================

/// Opaque reference to an encrypted value held by the FHE capability.
///
/// Arithmetic on a handle is always delegated; the engine never decrypts.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CiphertextHandle(pub [u8; 32]);

impl CiphertextHandle {
    /// Creates a handle from raw bytes.
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ct:0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ct:0x{}..", hex::encode(&self.0[..6]))
    }
}

// =============================================================================
// FINGERPRINT (32 bytes)
// =============================================================================

/// Collision-resistant digest binding ciphertext handles to a point in time.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{}...{}",
            hex::encode(&self.0[..4]),
            hex::encode(&self.0[28..])
        )
    }
}

// =============================================================================
// CALLBACK SELECTOR (4 bytes)
// =============================================================================

/// First four bytes of the Keccak-256 of the callback signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallbackSelector(pub [u8; 4]);

// =============================================================================
// ENCRYPTED TOTAL
// =============================================================================

/// Running encrypted aggregate of a batch.
///
/// A batch starts `Uninitialized`; the first admitted fragment seeds it with
/// an encrypted zero before folding. An empty batch therefore never reports
/// an encrypted zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncryptedTotal {
    /// No fragment has been folded yet.
    #[default]
    Uninitialized,
    /// Handle of the current encrypted sum.
    Value(CiphertextHandle),
}

impl EncryptedTotal {
    /// Whether the aggregate has been seeded.
    pub fn is_initialized(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Current handle, if any.
    pub fn handle(&self) -> Option<CiphertextHandle> {
        match self {
            Self::Uninitialized => None,
            Self::Value(handle) => Some(*handle),
        }
    }
}

// =============================================================================
// ACTION CLASS / COOLDOWN POLICY
// =============================================================================

/// Rate-limited action classes. Each has its own per-caller timestamps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionClass {
    /// Fragment submission, keyed by player.
    Submission,
    /// Aggregation request, keyed by the requesting provider.
    AggregationRequest,
}

impl fmt::Display for ActionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submission => write!(f, "submission"),
            Self::AggregationRequest => write!(f, "aggregation-request"),
        }
    }
}

/// When a cooldown slot is consumed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CooldownPolicy {
    /// Record the timestamp as soon as the cooldown check passes, even if a
    /// later step of the same call fails.
    #[default]
    ChargeOnAttempt,
    /// Check up front, record only when the gated operation commits.
    ChargeOnSuccess,
}

// =============================================================================
// CALL CONTEXT
// =============================================================================

/// Implicit execution context of a call: who is calling, and when.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallContext {
    /// Caller identity.
    pub caller: Address,
    /// Wall-clock time of the call.
    pub now: Timestamp,
}

impl CallContext {
    /// Create a new call context.
    pub fn new(caller: Address, now: Timestamp) -> Self {
        Self { caller, now }
    }
}
