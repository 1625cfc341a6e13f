//! # Fragment Aggregator
//!
//! Admits fragments into the open batch and keeps its running homomorphic
//! sum. Batch storage itself belongs to [`BatchRegistry`].

use crate::algorithms::fold_score;
use crate::domain::{
    Address, AggregatorError, BatchRegistry, CiphertextHandle, FheError, Fingerprint, Timestamp,
};
use crate::ports::{FheExecutor, FragmentReceipt};
use shared_crypto::keccak256;
use std::sync::Arc;
use tracing::debug;

/// Homomorphic folding over the current batch.
pub struct FragmentAggregator<F: FheExecutor> {
    fhe: Arc<F>,
}

impl<F: FheExecutor> FragmentAggregator<F> {
    /// Create an aggregator over `fhe`.
    pub fn new(fhe: Arc<F>) -> Self {
        Self { fhe }
    }

    /// The FHE capability.
    pub fn fhe(&self) -> &F {
        &self.fhe
    }

    /// Public audit digest of a submitted handle.
    pub fn score_fingerprint(&self, score: &CiphertextHandle) -> Fingerprint {
        Fingerprint(keccak256(&self.fhe.to_fingerprint(score)))
    }

    /// Admit a fragment into the current batch.
    ///
    /// Every check and the fold run before the registry is touched, so a
    /// failure leaves the batch exactly as it was.
    pub fn admit(
        &self,
        registry: &mut BatchRegistry,
        player: Address,
        score: CiphertextHandle,
        clue: CiphertextHandle,
        now: Timestamp,
    ) -> Result<FragmentReceipt, AggregatorError> {
        let batch = registry.ensure_accepting()?;
        let batch_id = batch.id;

        for handle in [&score, &clue] {
            if !self.fhe.is_initialized(handle) {
                return Err(FheError::UnknownHandle(*handle).into());
            }
        }

        let new_total = fold_score(&*self.fhe, &batch.total, &score)?;
        let fragment_id = registry.admit_fragment(player, score, clue, new_total, now)?;

        debug!(batch_id, fragment_id, %player, "fragment folded");
        Ok(FragmentReceipt {
            batch_id,
            fragment_id,
            score_fingerprint: self.score_fingerprint(&score),
        })
    }
}
