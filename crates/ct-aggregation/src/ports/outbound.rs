//! # Outbound Ports
//!
//! Capabilities the engine consumes but does not implement: homomorphic
//! arithmetic, the decryption oracle, proof verification and the clock.

use crate::domain::{
    Address, CallbackSelector, CiphertextHandle, FheError, OracleError, ProofError, RequestId,
    Timestamp,
};
use std::sync::atomic::{AtomicU64, Ordering};

/// Homomorphic encryption capability - outbound port.
///
/// Only additive aggregation is required.
pub trait FheExecutor: Send + Sync {
    /// Encrypted additive identity.
    fn zero(&self) -> Result<CiphertextHandle, FheError>;

    /// Encrypted `lhs + rhs`.
    fn add(
        &self,
        lhs: &CiphertextHandle,
        rhs: &CiphertextHandle,
    ) -> Result<CiphertextHandle, FheError>;

    /// Whether `handle` refers to a live ciphertext.
    fn is_initialized(&self, handle: &CiphertextHandle) -> bool;

    /// Public, fixed-size representation of a handle, safe to publish and
    /// to hand to the decryption oracle.
    fn to_fingerprint(&self, handle: &CiphertextHandle) -> [u8; 32];
}

/// Decryption oracle - outbound port.
///
/// The call returns a request id synchronously; fulfillment arrives later
/// through the engine's callback entry point.
pub trait DecryptionOracle: Send + Sync {
    /// Queue a decryption of `handles` on behalf of `requester`.
    fn request_decryption(
        &self,
        requester: Address,
        handles: &[[u8; 32]],
        callback: CallbackSelector,
    ) -> Result<RequestId, OracleError>;
}

/// Oracle proof verification - outbound port.
///
/// The sole trust boundary for the unauthenticated callback.
pub trait ProofVerifier: Send + Sync {
    /// Verify `proof` over the decryption `digest`.
    fn verify(&self, digest: &[u8; 32], proof: &[u8]) -> Result<(), ProofError>;
}

/// Wall-clock source - outbound port.
pub trait TimeSource: Send + Sync {
    /// Seconds since the Unix epoch.
    fn now(&self) -> Timestamp;
}

/// System clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Manually driven clock for tests and local simulations.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    time: AtomicU64,
}

impl ManualTimeSource {
    /// Start at `initial`.
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: AtomicU64::new(initial),
        }
    }

    /// Move forward by `secs`.
    pub fn advance(&self, secs: u64) {
        self.time.fetch_add(secs, Ordering::SeqCst);
    }

    /// Jump to `time`.
    pub fn set(&self, time: Timestamp) {
        self.time.store(time, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        self.time.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_time_source() {
        // After 2020-01-01.
        assert!(SystemTimeSource.now() > 1_577_836_800);
    }

    #[test]
    fn test_manual_time_source() {
        let clock = ManualTimeSource::new(0);
        clock.advance(61);
        assert_eq!(clock.now(), 61);
        clock.set(10);
        assert_eq!(clock.now(), 10);
    }
}
