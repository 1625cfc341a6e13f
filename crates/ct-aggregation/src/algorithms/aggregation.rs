//! # Homomorphic Aggregation
//!
//! Folding encrypted scores into a batch total without decrypting.

use crate::domain::{AggregatorError, Batch, CiphertextHandle, EncryptedTotal, FheError};
use crate::ports::FheExecutor;

/// Fold `score` into `total`.
///
/// An uninitialized total is seeded with an encrypted zero first, so the
/// seed happens exactly once per batch, on the first admitted fragment.
pub fn fold_score<F: FheExecutor + ?Sized>(
    fhe: &F,
    total: &EncryptedTotal,
    score: &CiphertextHandle,
) -> Result<CiphertextHandle, FheError> {
    let base = match total {
        EncryptedTotal::Uninitialized => fhe.zero()?,
        EncryptedTotal::Value(handle) => *handle,
    };
    fhe.add(&base, score)
}

/// Handles whose decryption yields the batch result: exactly the total.
pub fn aggregate_handles(batch: &Batch) -> Result<Vec<CiphertextHandle>, AggregatorError> {
    match batch.total {
        EncryptedTotal::Value(handle) => Ok(vec![handle]),
        EncryptedTotal::Uninitialized => Err(AggregatorError::AggregateUninitialized(batch.id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryFheExecutor;

    #[test]
    fn test_fold_seeds_uninitialized_total() {
        let fhe = InMemoryFheExecutor::new();
        let score = fhe.encrypt(10);

        let total = fold_score(&fhe, &EncryptedTotal::Uninitialized, &score).unwrap();
        assert_eq!(fhe.plaintext(&total), Some(10));
        // Seed zero + score: one zero and one sum were produced.
        assert_eq!(fhe.operation_count(), 2);
    }

    #[test]
    fn test_fold_onto_existing_total_does_not_reseed() {
        let fhe = InMemoryFheExecutor::new();
        let first = fold_score(&fhe, &EncryptedTotal::Uninitialized, &fhe.encrypt(10)).unwrap();
        let before = fhe.operation_count();

        let second = fold_score(&fhe, &EncryptedTotal::Value(first), &fhe.encrypt(5)).unwrap();
        assert_eq!(fhe.plaintext(&second), Some(15));
        assert_eq!(fhe.operation_count(), before + 1);
    }

    #[test]
    fn test_fold_unknown_score_fails() {
        let fhe = InMemoryFheExecutor::new();
        let bogus = CiphertextHandle::new([0xEE; 32]);
        assert_eq!(
            fold_score(&fhe, &EncryptedTotal::Uninitialized, &bogus),
            Err(FheError::UnknownHandle(bogus))
        );
    }

    #[test]
    fn test_aggregate_handles() {
        let mut batch = Batch::new(2, 0);
        assert_eq!(
            aggregate_handles(&batch),
            Err(AggregatorError::AggregateUninitialized(2))
        );

        let handle = CiphertextHandle::new([9u8; 32]);
        batch.total = EncryptedTotal::Value(handle);
        assert_eq!(aggregate_handles(&batch), Ok(vec![handle]));
    }
}
