//! Inbound Ports (Driving Ports / API)
//!
//! The caller identity is explicit on every gated method; the service
//! supplies wall-clock time from its `TimeSource`.

use crate::domain::{
    AggregatorError, Address, Batch, BatchId, CiphertextHandle, DecryptionContext, Fingerprint,
    Fragment, FragmentId, ModelVersion, RequestId,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of an admitted fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentReceipt {
    /// Batch the fragment joined.
    pub batch_id: BatchId,
    /// Per-batch fragment id.
    pub fragment_id: FragmentId,
    /// Public digest of the score handle.
    pub score_fingerprint: Fingerprint,
}

/// Result of a dispatched aggregation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationTicket {
    /// Covered batch.
    pub batch_id: BatchId,
    /// Oracle-assigned request id.
    pub request_id: RequestId,
    /// Binding fingerprint stored with the context.
    pub fingerprint: Fingerprint,
}

/// Primary aggregation API.
#[async_trait]
pub trait AggregatorApi: Send + Sync {
    /// Open the next batch. Owner only.
    async fn open_batch(&self, caller: Address) -> Result<BatchId, AggregatorError>;

    /// Close the current batch. Owner only.
    async fn close_batch(&self, caller: Address) -> Result<BatchId, AggregatorError>;

    /// Submit an encrypted fragment for `player`. Provider only.
    ///
    /// The submission cooldown is keyed by `player`, not by `caller`.
    async fn submit_fragment(
        &self,
        caller: Address,
        player: Address,
        score: CiphertextHandle,
        clue: CiphertextHandle,
    ) -> Result<FragmentReceipt, AggregatorError>;

    /// Request decryption of the closed current batch. Provider only.
    async fn request_aggregation(
        &self,
        caller: Address,
    ) -> Result<AggregationTicket, AggregatorError>;

    /// Oracle callback. Callable by anyone; trusted only through `proof`
    /// and the stored fingerprint. Returns the accepted total.
    async fn on_aggregation_result(
        &self,
        request_id: RequestId,
        cleartexts: Vec<u8>,
        proof: Vec<u8>,
    ) -> Result<u64, AggregatorError>;

    /// Abandon a pending request after its timeout. Provider only.
    async fn expire_request(
        &self,
        caller: Address,
        request_id: RequestId,
    ) -> Result<(), AggregatorError>;

    /// Register a provider. Returns `false` if already registered.
    async fn add_provider(&self, caller: Address, provider: Address)
        -> Result<bool, AggregatorError>;

    /// Deregister a provider. Returns `false` if not registered.
    async fn remove_provider(
        &self,
        caller: Address,
        provider: Address,
    ) -> Result<bool, AggregatorError>;

    /// Pause mutating operations.
    async fn pause(&self, caller: Address) -> Result<(), AggregatorError>;

    /// Resume mutating operations.
    async fn unpause(&self, caller: Address) -> Result<(), AggregatorError>;

    /// Set the cooldown interval (seconds, > 0).
    async fn set_cooldown(&self, caller: Address, secs: u64) -> Result<(), AggregatorError>;

    /// Set the fragment ceiling (> 0).
    async fn set_max_batch_size(&self, caller: Address, max: u64)
        -> Result<(), AggregatorError>;

    /// Set the model version captured by future requests.
    async fn set_model_version(
        &self,
        caller: Address,
        version: ModelVersion,
    ) -> Result<(), AggregatorError>;

    /// Hand ownership to `new_owner`.
    async fn transfer_ownership(
        &self,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), AggregatorError>;

    /// Snapshot of the current batch.
    fn current_batch(&self) -> Option<Batch>;

    /// Snapshot of any batch.
    fn batch(&self, batch_id: BatchId) -> Option<Batch>;

    /// Snapshot of a stored fragment.
    fn fragment(&self, batch_id: BatchId, fragment_id: FragmentId) -> Option<Fragment>;

    /// Snapshot of a decryption context.
    fn context(&self, request_id: RequestId) -> Option<DecryptionContext>;
}
