//! # Decryption Coordinator
//!
//! Two-phase decryption protocol. A request snapshots a binding fingerprint
//! of the batch aggregate; the oracle callback is accepted only if the
//! aggregate still hashes to that fingerprint and the committee proof over
//! `(engine, request id, cleartexts)` verifies.
//!
//! ```text
//! request_aggregation ──► prepare ──► dispatch ──► register (Pending)
//!                                                     │
//! on_aggregation_result ──► validate_callback ──► mark_processed (Processed)
//!                                                     │
//! expire_request ─────────────────────────────────► expire (Expired)
//! ```

use crate::algorithms::{
    aggregate_handles, binding_fingerprint, callback_selector, decode_total, decryption_digest,
};
use crate::domain::{
    invariant_fingerprint_match, Address, AggregatorError, Batch, BatchId, BatchRegistry,
    ContextStatus, DecryptionContext, Fingerprint, ModelVersion, OracleError, RequestId,
    Timestamp,
};
use crate::ports::{DecryptionOracle, FheExecutor, ProofVerifier};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Handle list and fingerprint computed for a batch, not yet dispatched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedRequest {
    /// Covered batch.
    pub batch_id: BatchId,
    /// Public handle representations sent to the oracle.
    pub handles: Vec<[u8; 32]>,
    /// Binding fingerprint over `handles` and the engine identity.
    pub fingerprint: Fingerprint,
}

/// Owner of all decryption contexts.
pub struct DecryptionCoordinator<O: DecryptionOracle, V: ProofVerifier> {
    oracle: Arc<O>,
    verifier: Arc<V>,
    contract: Address,
    request_timeout_secs: u64,
    contexts: HashMap<RequestId, DecryptionContext>,
}

impl<O: DecryptionOracle, V: ProofVerifier> DecryptionCoordinator<O, V> {
    /// Create a coordinator for the engine identified by `contract`.
    pub fn new(
        oracle: Arc<O>,
        verifier: Arc<V>,
        contract: Address,
        request_timeout_secs: u64,
    ) -> Self {
        Self {
            oracle,
            verifier,
            contract,
            request_timeout_secs,
            contexts: HashMap::new(),
        }
    }

    /// Engine identity bound into fingerprints and proof digests.
    pub fn contract(&self) -> Address {
        self.contract
    }

    /// Seconds before a pending request may be expired.
    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
    }

    /// Stored context.
    pub fn context(&self, request_id: RequestId) -> Option<&DecryptionContext> {
        self.contexts.get(&request_id)
    }

    /// Contexts still awaiting a callback.
    pub fn pending(&self) -> impl Iterator<Item = &DecryptionContext> {
        self.contexts.values().filter(|c| c.is_pending())
    }

    /// Handle list and binding fingerprint for the batch's current aggregate.
    pub fn prepare<F: FheExecutor + ?Sized>(
        &self,
        fhe: &F,
        batch: &Batch,
    ) -> Result<PreparedRequest, AggregatorError> {
        let handles: Vec<[u8; 32]> = aggregate_handles(batch)?
            .iter()
            .map(|handle| fhe.to_fingerprint(handle))
            .collect();
        let fingerprint = binding_fingerprint(&handles, &self.contract);
        Ok(PreparedRequest {
            batch_id: batch.id,
            handles,
            fingerprint,
        })
    }

    /// Send the request to the oracle and build its pending context.
    ///
    /// The context is returned, not stored; call [`Self::register`] once the
    /// rest of the request has committed.
    pub fn dispatch(
        &self,
        prepared: PreparedRequest,
        model_version: ModelVersion,
        requested_by: Address,
        now: Timestamp,
    ) -> Result<DecryptionContext, AggregatorError> {
        let request_id =
            self.oracle
                .request_decryption(self.contract, &prepared.handles, callback_selector())?;
        if self.contexts.contains_key(&request_id) {
            return Err(OracleError::DuplicateRequestId(request_id).into());
        }
        Ok(DecryptionContext {
            request_id,
            batch_id: prepared.batch_id,
            model_version,
            fingerprint: prepared.fingerprint,
            status: ContextStatus::Pending,
            requested_by,
            requested_at: now,
        })
    }

    /// Store a dispatched context.
    pub fn register(&mut self, context: DecryptionContext) {
        self.contexts.insert(context.request_id, context);
    }

    /// Validate an oracle callback without changing any state.
    ///
    /// Returns the covered batch and the decoded total.
    pub fn validate_callback<F: FheExecutor + ?Sized>(
        &self,
        registry: &BatchRegistry,
        fhe: &F,
        request_id: RequestId,
        cleartexts: &[u8],
        proof: &[u8],
    ) -> Result<(BatchId, u64), AggregatorError> {
        let context = match self.contexts.get(&request_id) {
            Some(context) if context.is_pending() => context,
            other => {
                warn!(
                    request_id,
                    status = ?other.map(|c| c.status),
                    "callback rejected: unknown or finalized request"
                );
                return Err(AggregatorError::InvalidRequest(request_id));
            }
        };

        // Rebind against the aggregate as stored now, not as it was.
        let recomputed = registry
            .get(context.batch_id)
            .and_then(|batch| self.prepare(fhe, batch).ok())
            .map(|prepared| prepared.fingerprint);
        let recomputed = match recomputed {
            Some(fingerprint) => fingerprint,
            None => {
                warn!(request_id, batch_id = context.batch_id, "callback rejected: aggregate gone");
                return Err(AggregatorError::InvalidState(request_id));
            }
        };
        if let Err(e) = invariant_fingerprint_match(request_id, &context.fingerprint, &recomputed) {
            warn!(request_id, batch_id = context.batch_id, "callback rejected: state drift");
            return Err(e);
        }

        let digest = decryption_digest(&self.contract, request_id, cleartexts);
        if let Err(e) = self.verifier.verify(&digest, proof) {
            warn!(request_id, error = %e, "callback rejected: proof");
            return Err(e.into());
        }

        let total = decode_total(cleartexts)?;
        debug!(request_id, batch_id = context.batch_id, "callback validated");
        Ok((context.batch_id, total))
    }

    /// Finalize a validated request. Exactly once per request id.
    pub fn mark_processed(&mut self, request_id: RequestId) -> Result<(), AggregatorError> {
        match self.contexts.get_mut(&request_id) {
            Some(context) if context.is_pending() => {
                context.status = ContextStatus::Processed;
                Ok(())
            }
            _ => Err(AggregatorError::InvalidRequest(request_id)),
        }
    }

    /// Abandon a pending request once its timeout has elapsed.
    pub fn expire(
        &mut self,
        request_id: RequestId,
        now: Timestamp,
    ) -> Result<BatchId, AggregatorError> {
        let timeout = self.request_timeout_secs;
        let context = match self.contexts.get_mut(&request_id) {
            Some(context) if context.is_pending() => context,
            _ => return Err(AggregatorError::InvalidRequest(request_id)),
        };
        let expires_at = context.requested_at.saturating_add(timeout);
        if now < expires_at {
            return Err(AggregatorError::RequestNotExpired {
                request_id,
                remaining_secs: expires_at - now,
            });
        }
        context.status = ContextStatus::Expired;
        Ok(context.batch_id)
    }
}
