//! In-Memory FHE Executor
//!
//! Implements `FheExecutor` by shadowing every ciphertext with its
//! plaintext. Handles are opaque BLAKE3-derived identifiers, so the engine
//! sees exactly what it would see against a real coprocessor.
//!
//! Local development and tests only: anyone holding the executor can read
//! plaintexts.

use crate::domain::{CiphertextHandle, FheError};
use crate::ports::FheExecutor;
use parking_lot::RwLock;
use shared_crypto::blake3_derive;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::trace;

const HANDLE_CONTEXT: &str = "ct-aggregation 2024 in-memory fhe handle v1";

/// Plaintext-shadowed FHE executor over `u64` (wrapping arithmetic, like a
/// 64-bit encrypted integer).
pub struct InMemoryFheExecutor {
    plaintexts: RwLock<HashMap<CiphertextHandle, u64>>,
    nonce: AtomicU64,
    operations: AtomicU64,
    available: AtomicBool,
}

impl InMemoryFheExecutor {
    /// Create an empty executor.
    pub fn new() -> Self {
        Self {
            plaintexts: RwLock::new(HashMap::new()),
            nonce: AtomicU64::new(0),
            operations: AtomicU64::new(0),
            available: AtomicBool::new(true),
        }
    }

    /// Client-side encryption of an input value.
    pub fn encrypt(&self, value: u64) -> CiphertextHandle {
        self.store(b'i', value)
    }

    /// Plaintext behind a handle. Only the local oracle should call this.
    pub fn plaintext(&self, handle: &CiphertextHandle) -> Option<u64> {
        self.plaintexts.read().get(handle).copied()
    }

    /// Number of homomorphic operations (`zero` and `add`) performed.
    pub fn operation_count(&self) -> u64 {
        self.operations.load(Ordering::SeqCst)
    }

    /// Simulate a coprocessor outage.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), FheError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(FheError::Unavailable("executor offline".to_string()));
        }
        Ok(())
    }

    fn store(&self, tag: u8, value: u64) -> CiphertextHandle {
        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        let mut material = [0u8; 9];
        material[0] = tag;
        material[1..].copy_from_slice(&nonce.to_be_bytes());
        let handle = CiphertextHandle::new(blake3_derive(HANDLE_CONTEXT, &material));
        self.plaintexts.write().insert(handle, value);
        handle
    }
}

impl Default for InMemoryFheExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl FheExecutor for InMemoryFheExecutor {
    fn zero(&self) -> Result<CiphertextHandle, FheError> {
        self.ensure_available()?;
        self.operations.fetch_add(1, Ordering::SeqCst);
        Ok(self.store(b'z', 0))
    }

    fn add(
        &self,
        lhs: &CiphertextHandle,
        rhs: &CiphertextHandle,
    ) -> Result<CiphertextHandle, FheError> {
        self.ensure_available()?;
        let (a, b) = {
            let table = self.plaintexts.read();
            let a = *table.get(lhs).ok_or(FheError::UnknownHandle(*lhs))?;
            let b = *table.get(rhs).ok_or(FheError::UnknownHandle(*rhs))?;
            (a, b)
        };
        self.operations.fetch_add(1, Ordering::SeqCst);
        let sum = self.store(b'a', a.wrapping_add(b));
        trace!(%lhs, %rhs, %sum, "fhe add");
        Ok(sum)
    }

    fn is_initialized(&self, handle: &CiphertextHandle) -> bool {
        self.plaintexts.read().contains_key(handle)
    }

    fn to_fingerprint(&self, handle: &CiphertextHandle) -> [u8; 32] {
        handle.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_produces_distinct_handles() {
        let fhe = InMemoryFheExecutor::new();
        let a = fhe.encrypt(7);
        let b = fhe.encrypt(7);
        assert_ne!(a, b);
        assert_eq!(fhe.plaintext(&a), Some(7));
        assert_eq!(fhe.operation_count(), 0);
    }

    #[test]
    fn test_add() {
        let fhe = InMemoryFheExecutor::new();
        let sum = fhe.add(&fhe.encrypt(10), &fhe.encrypt(5)).unwrap();
        assert_eq!(fhe.plaintext(&sum), Some(15));
    }

    #[test]
    fn test_add_wraps() {
        let fhe = InMemoryFheExecutor::new();
        let sum = fhe.add(&fhe.encrypt(u64::MAX), &fhe.encrypt(2)).unwrap();
        assert_eq!(fhe.plaintext(&sum), Some(1));
    }

    #[test]
    fn test_zero_is_additive_identity() {
        let fhe = InMemoryFheExecutor::new();
        let zero = fhe.zero().unwrap();
        let sum = fhe.add(&zero, &fhe.encrypt(42)).unwrap();
        assert_eq!(fhe.plaintext(&sum), Some(42));
    }

    #[test]
    fn test_unknown_handle() {
        let fhe = InMemoryFheExecutor::new();
        let bogus = CiphertextHandle::new([1u8; 32]);
        assert!(!fhe.is_initialized(&bogus));
        assert_eq!(
            fhe.add(&bogus, &fhe.encrypt(1)),
            Err(FheError::UnknownHandle(bogus))
        );
    }

    #[test]
    fn test_unavailable_executor() {
        let fhe = InMemoryFheExecutor::new();
        fhe.set_available(false);
        assert!(matches!(fhe.zero(), Err(FheError::Unavailable(_))));
        fhe.set_available(true);
        assert!(fhe.zero().is_ok());
    }

    #[test]
    fn test_fingerprint_is_handle_bytes() {
        let fhe = InMemoryFheExecutor::new();
        let handle = fhe.encrypt(3);
        assert_eq!(fhe.to_fingerprint(&handle), handle.0);
    }
}
