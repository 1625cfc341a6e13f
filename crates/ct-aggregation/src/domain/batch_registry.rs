//! # Batch Registry
//!
//! Owns every batch and its fragments. Exactly one batch sits under the
//! `current_batch_id` pointer; earlier batches are immutable history apart
//! from aggregation bookkeeping.

use super::entities::{Batch, BatchState, Fragment};
use super::errors::AggregatorError;
use super::invariants::{invariant_capacity, invariant_positive_setting};
use super::value_objects::{
    Address, BatchId, CiphertextHandle, EncryptedTotal, FragmentId, Timestamp,
};
use std::collections::{BTreeMap, HashMap};

/// Batch table.
#[derive(Clone, Debug)]
pub struct BatchRegistry {
    batches: BTreeMap<BatchId, Batch>,
    fragments: HashMap<(BatchId, FragmentId), Fragment>,
    current_batch_id: Option<BatchId>,
    max_batch_size: u64,
}

impl BatchRegistry {
    /// Create an empty registry. `max_batch_size` must be strictly positive.
    pub fn new(max_batch_size: u64) -> Result<Self, AggregatorError> {
        invariant_positive_setting("max_batch_size", max_batch_size)?;
        Ok(Self {
            batches: BTreeMap::new(),
            fragments: HashMap::new(),
            current_batch_id: None,
            max_batch_size,
        })
    }

    /// Fragment ceiling per batch.
    pub fn max_batch_size(&self) -> u64 {
        self.max_batch_size
    }

    /// Replace the fragment ceiling. Applies to the current batch too; a
    /// batch already above the new ceiling simply admits nothing more.
    pub fn set_max_batch_size(&mut self, max_batch_size: u64) -> Result<(), AggregatorError> {
        invariant_positive_setting("max_batch_size", max_batch_size)?;
        self.max_batch_size = max_batch_size;
        Ok(())
    }

    /// Id of the current batch, if any batch was ever opened.
    pub fn current_batch_id(&self) -> Option<BatchId> {
        self.current_batch_id
    }

    /// Number of batches ever created.
    pub fn total_batches(&self) -> u64 {
        self.batches.len() as u64
    }

    /// The current batch.
    pub fn current(&self) -> Option<&Batch> {
        self.current_batch_id.and_then(|id| self.batches.get(&id))
    }

    /// Any batch by id.
    pub fn get(&self, batch_id: BatchId) -> Option<&Batch> {
        self.batches.get(&batch_id)
    }

    /// A stored fragment.
    pub fn fragment(&self, batch_id: BatchId, fragment_id: FragmentId) -> Option<&Fragment> {
        self.fragments.get(&(batch_id, fragment_id))
    }

    /// Check that a new batch may be opened.
    pub fn ensure_can_open(&self) -> Result<(), AggregatorError> {
        match self.current() {
            Some(batch) if batch.is_open() => Err(AggregatorError::BatchAlreadyOpen(batch.id)),
            _ => Ok(()),
        }
    }

    /// Allocate the next id and open it.
    pub fn open(&mut self, now: Timestamp) -> Result<BatchId, AggregatorError> {
        self.ensure_can_open()?;
        let batch_id = self.current_batch_id.map_or(1, |id| id + 1);
        self.batches.insert(batch_id, Batch::new(batch_id, now));
        self.current_batch_id = Some(batch_id);
        Ok(batch_id)
    }

    /// Close the current batch.
    pub fn close(&mut self, now: Timestamp) -> Result<BatchId, AggregatorError> {
        let batch = self.current_mut().ok_or_else(|| {
            AggregatorError::InvalidBatch("no batch to close".to_string())
        })?;
        if !batch.is_open() {
            return Err(AggregatorError::InvalidBatch(format!(
                "batch {} already closed",
                batch.id
            )));
        }
        batch.transition_to(BatchState::Closed)?;
        batch.closed_at = Some(now);
        Ok(batch.id)
    }

    /// The current batch, if it is open and below capacity.
    pub fn ensure_accepting(&self) -> Result<&Batch, AggregatorError> {
        let batch = self
            .current()
            .ok_or_else(|| AggregatorError::InvalidBatch("no batch opened yet".to_string()))?;
        if !batch.is_open() {
            return Err(AggregatorError::BatchClosed(batch.id));
        }
        invariant_capacity(batch.id, batch.fragment_count, self.max_batch_size)?;
        Ok(batch)
    }

    /// The current batch, if it is closed.
    pub fn ensure_current_closed(&self) -> Result<&Batch, AggregatorError> {
        let batch = self
            .current()
            .ok_or_else(|| AggregatorError::InvalidBatch("no batch opened yet".to_string()))?;
        if !batch.is_closed() {
            return Err(AggregatorError::InvalidBatch(format!(
                "batch {} is still open",
                batch.id
            )));
        }
        Ok(batch)
    }

    /// Store a fragment in the current batch and install the new aggregate.
    ///
    /// Callers compute `new_total` first and only call this once nothing
    /// else can fail, so admission is all-or-nothing.
    pub fn admit_fragment(
        &mut self,
        player: Address,
        score: CiphertextHandle,
        clue: CiphertextHandle,
        new_total: CiphertextHandle,
        now: Timestamp,
    ) -> Result<FragmentId, AggregatorError> {
        self.ensure_accepting()?;
        let batch = self
            .current_mut()
            .ok_or_else(|| AggregatorError::InvalidBatch("no batch opened yet".to_string()))?;

        let fragment_id = batch.fragment_count + 1;
        batch.fragment_count = fragment_id;
        batch.total = EncryptedTotal::Value(new_total);
        let batch_id = batch.id;

        self.fragments.insert(
            (batch_id, fragment_id),
            Fragment {
                id: fragment_id,
                batch_id,
                player,
                score,
                clue,
                initialized: true,
                submitted_at: now,
            },
        );
        Ok(fragment_id)
    }

    /// Record that a decryption was requested for `batch_id`.
    pub fn mark_aggregation_requested(&mut self, batch_id: BatchId) -> Result<(), AggregatorError> {
        let batch = self.get_mut(batch_id)?;
        if batch.state == BatchState::AggregationCompleted {
            return Ok(());
        }
        batch.transition_to(BatchState::AggregationRequested)
    }

    /// Record a validated plaintext total.
    pub fn complete_aggregation(
        &mut self,
        batch_id: BatchId,
        total: u64,
    ) -> Result<(), AggregatorError> {
        let batch = self.get_mut(batch_id)?;
        batch.transition_to(BatchState::AggregationCompleted)?;
        batch.revealed_total = Some(total);
        Ok(())
    }

    fn current_mut(&mut self) -> Option<&mut Batch> {
        let id = self.current_batch_id?;
        self.batches.get_mut(&id)
    }

    fn get_mut(&mut self, batch_id: BatchId) -> Result<&mut Batch, AggregatorError> {
        self.batches
            .get_mut(&batch_id)
            .ok_or_else(|| AggregatorError::InvalidBatch(format!("unknown batch {batch_id}")))
    }
}
