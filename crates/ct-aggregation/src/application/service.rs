//! # Aggregation Service
//!
//! Async facade over [`AggregationEngine`]. Calls are serialized on one
//! lock, stamped with the service clock, and every committed event is
//! published on a broadcast channel in commit order.

use super::engine::AggregationEngine;
use crate::domain::{
    Address, AggregatorError, Batch, BatchId, CallContext, CiphertextHandle, DecryptionContext,
    Fragment, FragmentId, ModelVersion, RequestId, Timestamp,
};
use crate::events::AggregatorEvent;
use crate::ports::{
    AggregationTicket, AggregatorApi, DecryptionOracle, FheExecutor, FragmentReceipt,
    ProofVerifier, TimeSource,
};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, instrument, warn};

/// Counters maintained by the service.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Fragments admitted.
    pub submissions_accepted: u64,
    /// Fragment submissions rejected for any reason.
    pub submissions_rejected: u64,
    /// Aggregation requests dispatched to the oracle.
    pub aggregation_requests: u64,
    /// Aggregation requests rejected.
    pub requests_rejected: u64,
    /// Callbacks accepted.
    pub aggregations_completed: u64,
    /// Callbacks rejected (unknown, replayed, drifted, bad proof).
    pub callbacks_rejected: u64,
    /// Requests expired.
    pub requests_expired: u64,
    /// Events handed to the broadcast channel.
    pub events_published: u64,
}

/// Async aggregation service.
pub struct AggregationService<F, O, V, T>
where
    F: FheExecutor,
    O: DecryptionOracle,
    V: ProofVerifier,
    T: TimeSource,
{
    engine: Mutex<AggregationEngine<F, O, V>>,
    clock: Arc<T>,
    events: broadcast::Sender<AggregatorEvent>,
    stats: RwLock<ServiceStats>,
}

impl<F, O, V, T> AggregationService<F, O, V, T>
where
    F: FheExecutor,
    O: DecryptionOracle,
    V: ProofVerifier,
    T: TimeSource,
{
    /// Wrap an engine. `event_capacity` bounds how far a slow subscriber
    /// may lag before it starts missing events.
    pub fn new(engine: AggregationEngine<F, O, V>, clock: Arc<T>, event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            engine: Mutex::new(engine),
            clock,
            events,
            stats: RwLock::new(ServiceStats::default()),
        }
    }

    /// Subscribe to committed events.
    pub fn subscribe(&self) -> broadcast::Receiver<AggregatorEvent> {
        self.events.subscribe()
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> ServiceStats {
        self.stats.read().clone()
    }

    /// Current service time.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Run a read-only closure against the engine.
    pub fn inspect<R>(&self, f: impl FnOnce(&AggregationEngine<F, O, V>) -> R) -> R {
        f(&self.engine.lock())
    }

    /// Run `op` under the engine lock, then publish whatever it committed.
    fn execute<R>(
        &self,
        caller: Address,
        op: impl FnOnce(&mut AggregationEngine<F, O, V>, CallContext) -> Result<R, AggregatorError>,
    ) -> Result<R, AggregatorError> {
        let mut engine = self.engine.lock();
        let ctx = CallContext::new(caller, self.clock.now());
        let result = op(&mut engine, ctx);
        let events = engine.drain_events();
        self.publish(events);
        result
    }

    fn publish(&self, events: Vec<AggregatorEvent>) {
        if events.is_empty() {
            return;
        }
        let count = events.len() as u64;
        for event in events {
            let name = event.name();
            // No subscribers is not an error.
            if self.events.send(event).is_err() {
                debug!(event = name, "no event subscribers");
            }
        }
        self.stats.write().events_published += count;
    }

    fn record(&self, update: impl FnOnce(&mut ServiceStats)) {
        update(&mut self.stats.write());
    }
}

#[async_trait]
impl<F, O, V, T> AggregatorApi for AggregationService<F, O, V, T>
where
    F: FheExecutor + 'static,
    O: DecryptionOracle + 'static,
    V: ProofVerifier + 'static,
    T: TimeSource + 'static,
{
    #[instrument(skip(self))]
    async fn open_batch(&self, caller: Address) -> Result<BatchId, AggregatorError> {
        self.execute(caller, |engine, ctx| engine.open_batch(ctx))
    }

    #[instrument(skip(self))]
    async fn close_batch(&self, caller: Address) -> Result<BatchId, AggregatorError> {
        self.execute(caller, |engine, ctx| engine.close_batch(ctx))
    }

    #[instrument(skip(self, score, clue))]
    async fn submit_fragment(
        &self,
        caller: Address,
        player: Address,
        score: CiphertextHandle,
        clue: CiphertextHandle,
    ) -> Result<FragmentReceipt, AggregatorError> {
        let result = self.execute(caller, |engine, ctx| {
            engine.submit_fragment(ctx, player, score, clue)
        });
        match &result {
            Ok(_) => self.record(|s| s.submissions_accepted += 1),
            Err(e) => {
                debug!(error = %e, "submission rejected");
                self.record(|s| s.submissions_rejected += 1);
            }
        }
        result
    }

    #[instrument(skip(self))]
    async fn request_aggregation(
        &self,
        caller: Address,
    ) -> Result<AggregationTicket, AggregatorError> {
        let result = self.execute(caller, |engine, ctx| engine.request_aggregation(ctx));
        match &result {
            Ok(_) => self.record(|s| s.aggregation_requests += 1),
            Err(e) => {
                debug!(error = %e, "aggregation request rejected");
                self.record(|s| s.requests_rejected += 1);
            }
        }
        result
    }

    #[instrument(skip(self, cleartexts, proof))]
    async fn on_aggregation_result(
        &self,
        request_id: RequestId,
        cleartexts: Vec<u8>,
        proof: Vec<u8>,
    ) -> Result<u64, AggregatorError> {
        // The callback is open to anyone; the caller identity is irrelevant.
        let result = self.execute(Address::ZERO, |engine, _| {
            engine.on_aggregation_result(request_id, &cleartexts, &proof)
        });
        match &result {
            Ok(_) => self.record(|s| s.aggregations_completed += 1),
            Err(e) => {
                warn!(error = %e, kind = ?e.kind(), "callback rejected");
                self.record(|s| s.callbacks_rejected += 1);
            }
        }
        result
    }

    #[instrument(skip(self))]
    async fn expire_request(
        &self,
        caller: Address,
        request_id: RequestId,
    ) -> Result<(), AggregatorError> {
        let result = self.execute(caller, |engine, ctx| engine.expire_request(ctx, request_id));
        if result.is_ok() {
            self.record(|s| s.requests_expired += 1);
        }
        result
    }

    #[instrument(skip(self))]
    async fn add_provider(
        &self,
        caller: Address,
        provider: Address,
    ) -> Result<bool, AggregatorError> {
        self.execute(caller, |engine, ctx| engine.add_provider(ctx, provider))
    }

    #[instrument(skip(self))]
    async fn remove_provider(
        &self,
        caller: Address,
        provider: Address,
    ) -> Result<bool, AggregatorError> {
        self.execute(caller, |engine, ctx| engine.remove_provider(ctx, provider))
    }

    #[instrument(skip(self))]
    async fn pause(&self, caller: Address) -> Result<(), AggregatorError> {
        self.execute(caller, |engine, ctx| engine.pause(ctx))
    }

    #[instrument(skip(self))]
    async fn unpause(&self, caller: Address) -> Result<(), AggregatorError> {
        self.execute(caller, |engine, ctx| engine.unpause(ctx))
    }

    #[instrument(skip(self))]
    async fn set_cooldown(&self, caller: Address, secs: u64) -> Result<(), AggregatorError> {
        self.execute(caller, |engine, ctx| engine.set_cooldown(ctx, secs))
    }

    #[instrument(skip(self))]
    async fn set_max_batch_size(
        &self,
        caller: Address,
        max: u64,
    ) -> Result<(), AggregatorError> {
        self.execute(caller, |engine, ctx| engine.set_max_batch_size(ctx, max))
    }

    #[instrument(skip(self))]
    async fn set_model_version(
        &self,
        caller: Address,
        version: ModelVersion,
    ) -> Result<(), AggregatorError> {
        self.execute(caller, |engine, ctx| engine.set_model_version(ctx, version))
    }

    #[instrument(skip(self))]
    async fn transfer_ownership(
        &self,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), AggregatorError> {
        self.execute(caller, |engine, ctx| engine.transfer_ownership(ctx, new_owner))
    }

    fn current_batch(&self) -> Option<Batch> {
        self.inspect(|engine| engine.current_batch().cloned())
    }

    fn batch(&self, batch_id: BatchId) -> Option<Batch> {
        self.inspect(|engine| engine.batch(batch_id).cloned())
    }

    fn fragment(&self, batch_id: BatchId, fragment_id: FragmentId) -> Option<Fragment> {
        self.inspect(|engine| engine.fragment(batch_id, fragment_id).cloned())
    }

    fn context(&self, request_id: RequestId) -> Option<DecryptionContext> {
        self.inspect(|engine| engine.context(request_id).cloned())
    }
}
