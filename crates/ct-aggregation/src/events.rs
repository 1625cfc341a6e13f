//! # Aggregator Events
//!
//! Observable state transitions, consumable by an indexer or UI. Events
//! carry identifiers and public fingerprints only, never plaintext inputs.
//! The revealed batch total is the one plaintext value published, and only
//! after its decryption proof has been accepted.

use crate::domain::{Address, BatchId, Fingerprint, FragmentId, ModelVersion, RequestId};
use serde::{Deserialize, Serialize};

/// Event emitted by a committed engine call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AggregatorEvent {
    /// A fragment was admitted into the current batch.
    FragmentSubmitted {
        /// Batch the fragment joined
        batch_id: BatchId,
        /// Per-batch fragment id
        fragment_id: FragmentId,
        /// Player the fragment belongs to
        player: Address,
        /// Public digest of the score handle
        score_fingerprint: Fingerprint,
    },
    /// A new batch was opened.
    BatchOpened {
        /// New batch id
        batch_id: BatchId,
    },
    /// The current batch was closed.
    BatchClosed {
        /// Closed batch id
        batch_id: BatchId,
        /// Fragments admitted before closing
        fragment_count: u64,
    },
    /// A decryption of a batch aggregate was requested.
    AggregationRequested {
        /// Covered batch
        batch_id: BatchId,
        /// Oracle request id
        request_id: RequestId,
        /// Binding fingerprint stored with the context
        fingerprint: Fingerprint,
        /// Model version captured in the context
        model_version: ModelVersion,
    },
    /// A validated callback revealed the batch total.
    AggregationCompleted {
        /// Covered batch
        batch_id: BatchId,
        /// Fulfilled request id
        request_id: RequestId,
        /// Decrypted total
        total: u64,
    },
    /// A pending request was abandoned after its timeout.
    AggregationRequestExpired {
        /// Covered batch
        batch_id: BatchId,
        /// Expired request id
        request_id: RequestId,
    },
    /// A provider was registered.
    ProviderAdded {
        /// New provider
        provider: Address,
    },
    /// A provider was deregistered.
    ProviderRemoved {
        /// Removed provider
        provider: Address,
    },
    /// Mutating operations were paused.
    Paused {
        /// Owner that paused
        by: Address,
    },
    /// Mutating operations were resumed.
    Unpaused {
        /// Owner that unpaused
        by: Address,
    },
    /// Cooldown interval changed.
    CooldownUpdated {
        /// New interval
        cooldown_secs: u64,
    },
    /// Batch size ceiling changed.
    BatchSizeUpdated {
        /// New ceiling
        max_batch_size: u64,
    },
    /// Aggregation model version changed.
    ModelVersionUpdated {
        /// New version
        model_version: ModelVersion,
    },
    /// Ownership moved to a new address.
    OwnershipTransferred {
        /// Previous owner
        previous_owner: Address,
        /// New owner
        new_owner: Address,
    },
}

impl AggregatorEvent {
    /// Short event name, for logs and metrics labels.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FragmentSubmitted { .. } => "fragment_submitted",
            Self::BatchOpened { .. } => "batch_opened",
            Self::BatchClosed { .. } => "batch_closed",
            Self::AggregationRequested { .. } => "aggregation_requested",
            Self::AggregationCompleted { .. } => "aggregation_completed",
            Self::AggregationRequestExpired { .. } => "aggregation_request_expired",
            Self::ProviderAdded { .. } => "provider_added",
            Self::ProviderRemoved { .. } => "provider_removed",
            Self::Paused { .. } => "paused",
            Self::Unpaused { .. } => "unpaused",
            Self::CooldownUpdated { .. } => "cooldown_updated",
            Self::BatchSizeUpdated { .. } => "batch_size_updated",
            Self::ModelVersionUpdated { .. } => "model_version_updated",
            Self::OwnershipTransferred { .. } => "ownership_transferred",
        }
    }

    /// Batch the event refers to, if any.
    pub fn batch_id(&self) -> Option<BatchId> {
        match self {
            Self::FragmentSubmitted { batch_id, .. }
            | Self::BatchOpened { batch_id }
            | Self::BatchClosed { batch_id, .. }
            | Self::AggregationRequested { batch_id, .. }
            | Self::AggregationCompleted { batch_id, .. }
            | Self::AggregationRequestExpired { batch_id, .. } => Some(*batch_id),
            _ => None,
        }
    }
}
