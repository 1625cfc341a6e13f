//! # Domain Entities
//!
//! Batches, fragments and decryption contexts.

use super::errors::AggregatorError;
use super::value_objects::{
    Address, BatchId, CiphertextHandle, EncryptedTotal, Fingerprint, FragmentId, ModelVersion,
    RequestId, Timestamp,
};
use serde::{Deserialize, Serialize};

/// Batch lifecycle.
///
/// `Open → Closed → AggregationRequested → AggregationCompleted`. A batch is
/// never reopened or deleted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchState {
    /// Accepting fragments.
    #[default]
    Open,
    /// No more fragments; eligible for an aggregation request.
    Closed,
    /// At least one decryption request issued.
    AggregationRequested,
    /// A decryption callback was accepted.
    AggregationCompleted,
}

impl BatchState {
    /// Check if transition is valid.
    ///
    /// Re-requesting is allowed from both post-request states; completion
    /// never moves back to `AggregationRequested`.
    pub fn can_transition_to(&self, next: BatchState) -> bool {
        match (self, next) {
            (Self::Open, Self::Closed) => true,
            (Self::Closed, Self::AggregationRequested) => true,
            (Self::AggregationRequested, Self::AggregationRequested) => true,
            (Self::AggregationRequested, Self::AggregationCompleted) => true,
            (Self::AggregationCompleted, Self::AggregationCompleted) => true,
            _ => false,
        }
    }

    /// Whether the batch has been closed (any post-open state).
    pub fn is_closed(&self) -> bool {
        !matches!(self, Self::Open)
    }
}

/// A bounded collection of fragments aggregated into one encrypted total.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Batch {
    /// Batch id.
    pub id: BatchId,
    /// Number of admitted fragments.
    pub fragment_count: u64,
    /// Running encrypted aggregate.
    pub total: EncryptedTotal,
    /// Lifecycle state.
    pub state: BatchState,
    /// When the owner opened the batch.
    pub opened_at: Timestamp,
    /// When the owner closed the batch.
    pub closed_at: Option<Timestamp>,
    /// Plaintext total accepted from the last validated callback.
    pub revealed_total: Option<u64>,
}

impl Batch {
    /// Create a new open batch with no fragments.
    pub fn new(id: BatchId, opened_at: Timestamp) -> Self {
        Self {
            id,
            fragment_count: 0,
            total: EncryptedTotal::Uninitialized,
            state: BatchState::Open,
            opened_at,
            closed_at: None,
            revealed_total: None,
        }
    }

    /// Whether the batch still accepts fragments.
    pub fn is_open(&self) -> bool {
        self.state == BatchState::Open
    }

    /// Whether the batch has been closed.
    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    /// Transition to new state.
    pub fn transition_to(&mut self, new_state: BatchState) -> Result<(), AggregatorError> {
        if !self.state.can_transition_to(new_state) {
            return Err(AggregatorError::InvalidBatch(format!(
                "batch {}: {:?} -> {:?}",
                self.id, self.state, new_state
            )));
        }
        self.state = new_state;
        Ok(())
    }
}

/// One encrypted submission. Owned by exactly one batch, immutable.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Fragment {
    /// Per-batch id, starting at 1.
    pub id: FragmentId,
    /// Owning batch.
    pub batch_id: BatchId,
    /// Player the fragment was submitted for.
    pub player: Address,
    /// Encrypted score handle (folded into the aggregate).
    pub score: CiphertextHandle,
    /// Encrypted auxiliary value handle.
    pub clue: CiphertextHandle,
    /// Set on creation; a stored fragment is always initialized.
    pub initialized: bool,
    /// Submission time.
    pub submitted_at: Timestamp,
}

/// Lifecycle of a decryption context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContextStatus {
    /// Awaiting the oracle callback.
    #[default]
    Pending,
    /// A validated callback was accepted. Terminal.
    Processed,
    /// Abandoned after the request timeout. Terminal.
    Expired,
}

impl ContextStatus {
    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Processed | Self::Expired)
    }
}

/// State snapshotted when an aggregation is requested.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecryptionContext {
    /// Oracle-assigned request id.
    pub request_id: RequestId,
    /// Batch covered by the request.
    pub batch_id: BatchId,
    /// Model version in effect at request time.
    pub model_version: ModelVersion,
    /// Binding fingerprint over the requested handles.
    pub fingerprint: Fingerprint,
    /// Status.
    pub status: ContextStatus,
    /// Provider that issued the request.
    pub requested_by: Address,
    /// Request time.
    pub requested_at: Timestamp,
}

impl DecryptionContext {
    /// Whether the context has been finalized by a validated callback.
    pub fn is_processed(&self) -> bool {
        self.status == ContextStatus::Processed
    }

    /// Whether a callback may still be accepted.
    pub fn is_pending(&self) -> bool {
        self.status == ContextStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_new_is_open_and_uninitialized() {
        let batch = Batch::new(1, 1000);
        assert!(batch.is_open());
        assert!(!batch.is_closed());
        assert_eq!(batch.fragment_count, 0);
        assert!(!batch.total.is_initialized());
        assert!(batch.revealed_total.is_none());
    }

    #[test]
    fn test_batch_state_forward_transitions() {
        assert!(BatchState::Open.can_transition_to(BatchState::Closed));
        assert!(BatchState::Closed.can_transition_to(BatchState::AggregationRequested));
        assert!(BatchState::AggregationRequested
            .can_transition_to(BatchState::AggregationCompleted));
    }

    #[test]
    fn test_batch_state_never_reopens() {
        assert!(!BatchState::Closed.can_transition_to(BatchState::Open));
        assert!(!BatchState::AggregationCompleted.can_transition_to(BatchState::Open));
        assert!(!BatchState::AggregationCompleted
            .can_transition_to(BatchState::AggregationRequested));
    }

    #[test]
    fn test_batch_state_cannot_skip_close() {
        assert!(!BatchState::Open.can_transition_to(BatchState::AggregationRequested));
        assert!(!BatchState::Closed.can_transition_to(BatchState::AggregationCompleted));
    }

    #[test]
    fn test_batch_invalid_transition_errors() {
        let mut batch = Batch::new(4, 0);
        let err = batch
            .transition_to(BatchState::AggregationCompleted)
            .unwrap_err();
        assert!(matches!(err, AggregatorError::InvalidBatch(_)));
        assert_eq!(batch.state, BatchState::Open);
    }

    #[test]
    fn test_closed_covers_post_request_states() {
        assert!(BatchState::Closed.is_closed());
        assert!(BatchState::AggregationRequested.is_closed());
        assert!(BatchState::AggregationCompleted.is_closed());
    }

    #[test]
    fn test_context_status_terminal() {
        assert!(!ContextStatus::Pending.is_terminal());
        assert!(ContextStatus::Processed.is_terminal());
        assert!(ContextStatus::Expired.is_terminal());
    }
}
