//! # Aggregation Engine
//!
//! Single top-level state struct. Each component owns its fields and every
//! mutation goes through that component:
//!
//! | Component | Owns |
//! |-----------|------|
//! | `AccessControl` | owner, providers, pause flag |
//! | `CooldownLedger` | last-action timestamps |
//! | `BatchRegistry` | batches, fragments, current pointer |
//! | `FragmentAggregator` | FHE capability |
//! | `DecryptionCoordinator` | decryption contexts, oracle, verifier |
//!
//! Every entry point runs its gates (role, pause, cooldown, lifecycle)
//! before mutating anything. A rejected call leaves the engine unchanged,
//! except for the cooldown slot consumed under
//! [`CooldownPolicy::ChargeOnAttempt`]. Events are buffered and only
//! appended once the call commits.

use super::coordinator::DecryptionCoordinator;
use super::fragment_aggregator::FragmentAggregator;
use crate::config::AggregatorConfig;
use crate::domain::{
    AccessControl, ActionClass, Address, AggregatorError, Batch, BatchId, BatchRegistry,
    CallContext, CiphertextHandle, CooldownLedger, CooldownPolicy, DecryptionContext, Fragment,
    FragmentId, ModelVersion, RequestId, Timestamp,
};
use crate::events::AggregatorEvent;
use crate::ports::{
    AggregationTicket, DecryptionOracle, FheExecutor, FragmentReceipt, ProofVerifier,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Encrypted batch aggregation engine.
pub struct AggregationEngine<F: FheExecutor, O: DecryptionOracle, V: ProofVerifier> {
    access: AccessControl,
    cooldowns: CooldownLedger,
    registry: BatchRegistry,
    aggregator: FragmentAggregator<F>,
    coordinator: DecryptionCoordinator<O, V>,
    cooldown_policy: CooldownPolicy,
    model_version: ModelVersion,
    events: Vec<AggregatorEvent>,
}

impl<F: FheExecutor, O: DecryptionOracle, V: ProofVerifier> AggregationEngine<F, O, V> {
    /// Create an engine owned by `owner`.
    pub fn new(
        owner: Address,
        config: &AggregatorConfig,
        fhe: Arc<F>,
        oracle: Arc<O>,
        verifier: Arc<V>,
    ) -> Result<Self, AggregatorError> {
        config.validate()?;
        if owner.is_zero() {
            return Err(AggregatorError::InvalidConfig(
                "owner must not be the zero address".to_string(),
            ));
        }
        Ok(Self {
            access: AccessControl::new(owner),
            cooldowns: CooldownLedger::new(config.cooldown_secs)?,
            registry: BatchRegistry::new(config.max_batch_size)?,
            aggregator: FragmentAggregator::new(fhe),
            coordinator: DecryptionCoordinator::new(
                oracle,
                verifier,
                config.contract_address,
                config.request_timeout_secs,
            ),
            cooldown_policy: config.cooldown_policy,
            model_version: config.initial_model_version,
            events: Vec::new(),
        })
    }

    // =========================================================================
    // BATCH LIFECYCLE
    // =========================================================================

    /// Open the next batch. Owner only, not paused, no batch open.
    pub fn open_batch(&mut self, ctx: CallContext) -> Result<BatchId, AggregatorError> {
        self.access.ensure_owner(&ctx.caller)?;
        self.access.ensure_not_paused()?;
        let batch_id = self.registry.open(ctx.now)?;

        info!(batch_id, "batch opened");
        self.events.push(AggregatorEvent::BatchOpened { batch_id });
        Ok(batch_id)
    }

    /// Close the current batch. Owner only, not paused.
    pub fn close_batch(&mut self, ctx: CallContext) -> Result<BatchId, AggregatorError> {
        self.access.ensure_owner(&ctx.caller)?;
        self.access.ensure_not_paused()?;
        let batch_id = self.registry.close(ctx.now)?;
        let fragment_count = self
            .registry
            .get(batch_id)
            .map_or(0, |batch| batch.fragment_count);

        info!(batch_id, fragment_count, "batch closed");
        self.events.push(AggregatorEvent::BatchClosed {
            batch_id,
            fragment_count,
        });
        Ok(batch_id)
    }

    /// Submit an encrypted fragment for `player`.
    pub fn submit_fragment(
        &mut self,
        ctx: CallContext,
        player: Address,
        score: CiphertextHandle,
        clue: CiphertextHandle,
    ) -> Result<FragmentReceipt, AggregatorError> {
        self.access.ensure_provider(&ctx.caller)?;
        self.access.ensure_not_paused()?;
        self.charge_cooldown(player, ActionClass::Submission, ctx.now)?;

        let receipt = self
            .aggregator
            .admit(&mut self.registry, player, score, clue, ctx.now)?;
        self.settle_cooldown(player, ActionClass::Submission, ctx.now);

        info!(
            batch_id = receipt.batch_id,
            fragment_id = receipt.fragment_id,
            %player,
            "fragment submitted"
        );
        self.events.push(AggregatorEvent::FragmentSubmitted {
            batch_id: receipt.batch_id,
            fragment_id: receipt.fragment_id,
            player,
            score_fingerprint: receipt.score_fingerprint,
        });
        Ok(receipt)
    }

    // =========================================================================
    // DECRYPTION PROTOCOL
    // =========================================================================

    /// Request decryption of the closed current batch's aggregate.
    pub fn request_aggregation(
        &mut self,
        ctx: CallContext,
    ) -> Result<AggregationTicket, AggregatorError> {
        self.access.ensure_provider(&ctx.caller)?;
        self.access.ensure_not_paused()?;
        self.charge_cooldown(ctx.caller, ActionClass::AggregationRequest, ctx.now)?;

        let batch = self.registry.ensure_current_closed()?;
        let prepared = self.coordinator.prepare(self.aggregator.fhe(), batch)?;
        let context =
            self.coordinator
                .dispatch(prepared, self.model_version, ctx.caller, ctx.now)?;
        self.registry.mark_aggregation_requested(context.batch_id)?;
        self.settle_cooldown(ctx.caller, ActionClass::AggregationRequest, ctx.now);

        let ticket = AggregationTicket {
            batch_id: context.batch_id,
            request_id: context.request_id,
            fingerprint: context.fingerprint,
        };
        let model_version = context.model_version;
        self.coordinator.register(context);

        info!(
            batch_id = ticket.batch_id,
            request_id = ticket.request_id,
            fingerprint = %ticket.fingerprint,
            model_version,
            "aggregation requested"
        );
        self.events.push(AggregatorEvent::AggregationRequested {
            batch_id: ticket.batch_id,
            request_id: ticket.request_id,
            fingerprint: ticket.fingerprint,
            model_version,
        });
        Ok(ticket)
    }

    /// Oracle callback. Not role-gated; see [`DecryptionCoordinator`].
    pub fn on_aggregation_result(
        &mut self,
        request_id: RequestId,
        cleartexts: &[u8],
        proof: &[u8],
    ) -> Result<u64, AggregatorError> {
        let (batch_id, total) = self.coordinator.validate_callback(
            &self.registry,
            self.aggregator.fhe(),
            request_id,
            cleartexts,
            proof,
        )?;
        self.registry.complete_aggregation(batch_id, total)?;
        self.coordinator.mark_processed(request_id)?;

        info!(batch_id, request_id, total, "aggregation completed");
        self.events.push(AggregatorEvent::AggregationCompleted {
            batch_id,
            request_id,
            total,
        });
        Ok(total)
    }

    /// Abandon a pending request after the configured timeout.
    pub fn expire_request(
        &mut self,
        ctx: CallContext,
        request_id: RequestId,
    ) -> Result<(), AggregatorError> {
        self.access.ensure_provider(&ctx.caller)?;
        self.access.ensure_not_paused()?;
        let batch_id = self.coordinator.expire(request_id, ctx.now)?;

        info!(batch_id, request_id, "aggregation request expired");
        self.events.push(AggregatorEvent::AggregationRequestExpired {
            batch_id,
            request_id,
        });
        Ok(())
    }

    // =========================================================================
    // ADMINISTRATION
    // =========================================================================

    /// Register a provider. Emits only when the set changes.
    pub fn add_provider(
        &mut self,
        ctx: CallContext,
        provider: Address,
    ) -> Result<bool, AggregatorError> {
        let added = self.access.add_provider(&ctx.caller, provider)?;
        if added {
            info!(%provider, "provider added");
            self.events.push(AggregatorEvent::ProviderAdded { provider });
        }
        Ok(added)
    }

    /// Deregister a provider. Emits only when the set changes.
    pub fn remove_provider(
        &mut self,
        ctx: CallContext,
        provider: Address,
    ) -> Result<bool, AggregatorError> {
        let removed = self.access.remove_provider(&ctx.caller, &provider)?;
        if removed {
            info!(%provider, "provider removed");
            self.events.push(AggregatorEvent::ProviderRemoved { provider });
        }
        Ok(removed)
    }

    /// Pause mutating batch and fragment operations.
    pub fn pause(&mut self, ctx: CallContext) -> Result<(), AggregatorError> {
        self.access.pause(&ctx.caller)?;
        info!(by = %ctx.caller, "engine paused");
        self.events.push(AggregatorEvent::Paused { by: ctx.caller });
        Ok(())
    }

    /// Resume mutating operations.
    pub fn unpause(&mut self, ctx: CallContext) -> Result<(), AggregatorError> {
        self.access.unpause(&ctx.caller)?;
        info!(by = %ctx.caller, "engine unpaused");
        self.events.push(AggregatorEvent::Unpaused { by: ctx.caller });
        Ok(())
    }

    /// Set the shared cooldown interval.
    pub fn set_cooldown(&mut self, ctx: CallContext, secs: u64) -> Result<(), AggregatorError> {
        self.access.ensure_owner(&ctx.caller)?;
        self.cooldowns.set_interval(secs)?;
        info!(cooldown_secs = secs, "cooldown updated");
        self.events.push(AggregatorEvent::CooldownUpdated {
            cooldown_secs: secs,
        });
        Ok(())
    }

    /// Set the fragment ceiling.
    pub fn set_max_batch_size(
        &mut self,
        ctx: CallContext,
        max: u64,
    ) -> Result<(), AggregatorError> {
        self.access.ensure_owner(&ctx.caller)?;
        self.registry.set_max_batch_size(max)?;
        info!(max_batch_size = max, "batch size updated");
        self.events.push(AggregatorEvent::BatchSizeUpdated {
            max_batch_size: max,
        });
        Ok(())
    }

    /// Set the model version captured by subsequent requests.
    pub fn set_model_version(
        &mut self,
        ctx: CallContext,
        version: ModelVersion,
    ) -> Result<(), AggregatorError> {
        self.access.ensure_owner(&ctx.caller)?;
        self.model_version = version;
        info!(model_version = version, "model version updated");
        self.events.push(AggregatorEvent::ModelVersionUpdated {
            model_version: version,
        });
        Ok(())
    }

    /// Hand ownership to `new_owner`.
    pub fn transfer_ownership(
        &mut self,
        ctx: CallContext,
        new_owner: Address,
    ) -> Result<(), AggregatorError> {
        let previous_owner = self.access.transfer_ownership(&ctx.caller, new_owner)?;
        info!(%previous_owner, %new_owner, "ownership transferred");
        self.events.push(AggregatorEvent::OwnershipTransferred {
            previous_owner,
            new_owner,
        });
        Ok(())
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Current owner.
    pub fn owner(&self) -> Address {
        self.access.owner()
    }

    /// Whether `address` is a provider.
    pub fn is_provider(&self, address: &Address) -> bool {
        self.access.is_provider(address)
    }

    /// Whether mutating operations are paused.
    pub fn is_paused(&self) -> bool {
        self.access.is_paused()
    }

    /// Id of the current batch.
    pub fn current_batch_id(&self) -> Option<BatchId> {
        self.registry.current_batch_id()
    }

    /// Number of batches ever opened.
    pub fn total_batches(&self) -> u64 {
        self.registry.total_batches()
    }

    /// The current batch.
    pub fn current_batch(&self) -> Option<&Batch> {
        self.registry.current()
    }

    /// Any batch by id.
    pub fn batch(&self, batch_id: BatchId) -> Option<&Batch> {
        self.registry.get(batch_id)
    }

    /// A stored fragment.
    pub fn fragment(&self, batch_id: BatchId, fragment_id: FragmentId) -> Option<&Fragment> {
        self.registry.fragment(batch_id, fragment_id)
    }

    /// A decryption context.
    pub fn context(&self, request_id: RequestId) -> Option<&DecryptionContext> {
        self.coordinator.context(request_id)
    }

    /// Number of contexts awaiting a callback.
    pub fn pending_requests(&self) -> usize {
        self.coordinator.pending().count()
    }

    /// Cooldown interval.
    pub fn cooldown_secs(&self) -> u64 {
        self.cooldowns.interval_secs()
    }

    /// Fragment ceiling.
    pub fn max_batch_size(&self) -> u64 {
        self.registry.max_batch_size()
    }

    /// Model version captured by new requests.
    pub fn model_version(&self) -> ModelVersion {
        self.model_version
    }

    /// Active cooldown policy.
    pub fn cooldown_policy(&self) -> CooldownPolicy {
        self.cooldown_policy
    }

    /// Last recorded action time for `(caller, action)`.
    pub fn last_action(&self, caller: &Address, action: ActionClass) -> Option<Timestamp> {
        self.cooldowns.last_action(caller, action)
    }

    /// Engine identity.
    pub fn contract_address(&self) -> Address {
        self.coordinator.contract()
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<AggregatorEvent> {
        std::mem::take(&mut self.events)
    }

    fn charge_cooldown(
        &mut self,
        key: Address,
        action: ActionClass,
        now: Timestamp,
    ) -> Result<(), AggregatorError> {
        let result = match self.cooldown_policy {
            CooldownPolicy::ChargeOnAttempt => self.cooldowns.check_and_record(key, action, now),
            CooldownPolicy::ChargeOnSuccess => self.cooldowns.check(&key, action, now),
        };
        if let Err(ref e) = result {
            debug!(%key, %action, error = %e, "cooldown rejected");
        }
        result
    }

    fn settle_cooldown(&mut self, key: Address, action: ActionClass, now: Timestamp) {
        if self.cooldown_policy == CooldownPolicy::ChargeOnSuccess {
            self.cooldowns.record(key, action, now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{
        CommitteeProofVerifier, DecryptionCommittee, InMemoryDecryptionOracle,
        InMemoryFheExecutor,
    };
    use crate::domain::{BatchState, EncryptedTotal};

    const OWNER: Address = Address::new([0x01; 20]);
    const PROVIDER: Address = Address::new([0xA1; 20]);
    const PLAYER_A: Address = Address::new([0xB0; 20]);
    const PLAYER_B: Address = Address::new([0xB1; 20]);
    const MALLORY: Address = Address::new([0x66; 20]);

    type Engine =
        AggregationEngine<InMemoryFheExecutor, InMemoryDecryptionOracle, CommitteeProofVerifier>;

    struct Harness {
        fhe: Arc<InMemoryFheExecutor>,
        oracle: Arc<InMemoryDecryptionOracle>,
        engine: Engine,
    }

    fn harness(config: AggregatorConfig) -> Harness {
        let fhe = Arc::new(InMemoryFheExecutor::new());
        let committee = DecryptionCommittee::generate(3);
        let verifier = Arc::new(CommitteeProofVerifier::new(committee.public_keys(), 2).unwrap());
        let oracle = Arc::new(InMemoryDecryptionOracle::new(fhe.clone(), committee));
        let mut engine =
            Engine::new(OWNER, &config, fhe.clone(), oracle.clone(), verifier).unwrap();
        engine
            .add_provider(CallContext::new(OWNER, 0), PROVIDER)
            .unwrap();
        engine.drain_events();
        Harness {
            fhe,
            oracle,
            engine,
        }
    }

    fn owner(now: Timestamp) -> CallContext {
        CallContext::new(OWNER, now)
    }

    fn provider(now: Timestamp) -> CallContext {
        CallContext::new(PROVIDER, now)
    }

    fn submit(h: &mut Harness, player: Address, score: u64, now: Timestamp) -> Result<FragmentReceipt, AggregatorError> {
        let score = h.fhe.encrypt(score);
        let clue = h.fhe.encrypt(0);
        h.engine.submit_fragment(provider(now), player, score, clue)
    }

    #[test]
    fn test_open_requires_owner_and_closed_current() {
        let mut h = harness(AggregatorConfig::for_testing());
        assert_eq!(
            h.engine.open_batch(provider(0)),
            Err(AggregatorError::NotOwner)
        );
        assert_eq!(h.engine.open_batch(owner(0)), Ok(1));
        assert_eq!(
            h.engine.open_batch(owner(0)),
            Err(AggregatorError::BatchAlreadyOpen(1))
        );
        assert_eq!(h.engine.close_batch(owner(1)), Ok(1));
        assert_eq!(h.engine.open_batch(owner(2)), Ok(2));
        assert_eq!(h.engine.total_batches(), 2);
    }

    #[test]
    fn test_submission_lifecycle_events() {
        let mut h = harness(AggregatorConfig::for_testing());
        h.engine.open_batch(owner(0)).unwrap();
        submit(&mut h, PLAYER_A, 10, 0).unwrap();
        h.engine.close_batch(owner(1)).unwrap();

        let names: Vec<_> = h.engine.drain_events().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["batch_opened", "fragment_submitted", "batch_closed"]);
        assert!(h.engine.drain_events().is_empty());
    }

    #[test]
    fn test_submit_requires_provider() {
        let mut h = harness(AggregatorConfig::for_testing());
        h.engine.open_batch(owner(0)).unwrap();
        let score = h.fhe.encrypt(1);
        assert_eq!(
            h.engine
                .submit_fragment(CallContext::new(MALLORY, 0), PLAYER_A, score, score),
            Err(AggregatorError::NotProvider)
        );
        assert_eq!(h.engine.last_action(&PLAYER_A, ActionClass::Submission), None);
    }

    #[test]
    fn test_submit_without_batch() {
        let mut h = harness(AggregatorConfig::for_testing());
        assert!(matches!(
            submit(&mut h, PLAYER_A, 1, 0),
            Err(AggregatorError::InvalidBatch(_))
        ));
    }

    #[test]
    fn test_full_batch_keeps_aggregate() {
        let mut h = harness(AggregatorConfig::for_testing());
        h.engine.open_batch(owner(0)).unwrap();
        submit(&mut h, PLAYER_A, 10, 0).unwrap();
        submit(&mut h, PLAYER_B, 5, 0).unwrap();
        let before = h.engine.current_batch().unwrap().total;

        let player_c = Address::new([0xB2; 20]);
        assert_eq!(
            submit(&mut h, player_c, 7, 0),
            Err(AggregatorError::BatchFull {
                batch_id: 1,
                max: 2
            })
        );
        let batch = h.engine.current_batch().unwrap();
        assert_eq!(batch.fragment_count, 2);
        assert_eq!(batch.total, before);
    }

    #[test]
    fn test_charge_on_attempt_consumes_slot_on_failure() {
        let mut h = harness(AggregatorConfig::for_testing());
        h.engine.open_batch(owner(0)).unwrap();
        h.engine.close_batch(owner(0)).unwrap();

        assert_eq!(
            submit(&mut h, PLAYER_A, 1, 10),
            Err(AggregatorError::BatchClosed(1))
        );
        assert_eq!(
            h.engine.last_action(&PLAYER_A, ActionClass::Submission),
            Some(10)
        );
    }

    #[test]
    fn test_charge_on_success_keeps_slot_on_failure() {
        let mut h = harness(AggregatorConfig {
            cooldown_policy: CooldownPolicy::ChargeOnSuccess,
            ..AggregatorConfig::for_testing()
        });
        h.engine.open_batch(owner(0)).unwrap();
        h.engine.close_batch(owner(0)).unwrap();

        assert_eq!(
            submit(&mut h, PLAYER_A, 1, 10),
            Err(AggregatorError::BatchClosed(1))
        );
        assert_eq!(h.engine.last_action(&PLAYER_A, ActionClass::Submission), None);

        h.engine.open_batch(owner(11)).unwrap();
        submit(&mut h, PLAYER_A, 1, 11).unwrap();
        assert_eq!(
            h.engine.last_action(&PLAYER_A, ActionClass::Submission),
            Some(11)
        );
    }

    #[test]
    fn test_request_requires_closed_batch() {
        let mut h = harness(AggregatorConfig::for_testing());
        h.engine.open_batch(owner(0)).unwrap();
        submit(&mut h, PLAYER_A, 10, 0).unwrap();
        assert!(matches!(
            h.engine.request_aggregation(provider(61)),
            Err(AggregatorError::InvalidBatch(_))
        ));
        assert_eq!(h.oracle.pending_count(), 0);
    }

    #[test]
    fn test_request_on_empty_batch() {
        let mut h = harness(AggregatorConfig::for_testing());
        h.engine.open_batch(owner(0)).unwrap();
        h.engine.close_batch(owner(0)).unwrap();
        assert_eq!(
            h.engine.request_aggregation(provider(0)),
            Err(AggregatorError::AggregateUninitialized(1))
        );
        assert_eq!(h.engine.current_batch().unwrap().state, BatchState::Closed);
    }

    #[test]
    fn test_full_round_trip() {
        let mut h = harness(AggregatorConfig::for_testing());
        h.engine.open_batch(owner(0)).unwrap();
        submit(&mut h, PLAYER_A, 10, 0).unwrap();
        submit(&mut h, PLAYER_B, 5, 0).unwrap();
        h.engine.close_batch(owner(1)).unwrap();

        let ticket = h.engine.request_aggregation(provider(61)).unwrap();
        assert_eq!(ticket.request_id, 1);
        assert_eq!(
            h.engine.batch(1).unwrap().state,
            BatchState::AggregationRequested
        );
        assert_eq!(h.engine.context(1).unwrap().model_version, 1);

        let response = h.oracle.fulfill(&h.oracle.take_pending()[0]).unwrap();
        let total = h
            .engine
            .on_aggregation_result(1, &response.cleartexts, &response.proof)
            .unwrap();
        assert_eq!(total, 15);

        let batch = h.engine.batch(1).unwrap();
        assert_eq!(batch.state, BatchState::AggregationCompleted);
        assert_eq!(batch.revealed_total, Some(15));
        assert!(h.engine.context(1).unwrap().is_processed());
        assert_eq!(
            h.engine
                .on_aggregation_result(1, &response.cleartexts, &response.proof),
            Err(AggregatorError::InvalidRequest(1))
        );
    }

    #[test]
    fn test_paused_blocks_mutations_not_admin() {
        let mut h = harness(AggregatorConfig::for_testing());
        h.engine.pause(owner(0)).unwrap();
        assert_eq!(h.engine.open_batch(owner(0)), Err(AggregatorError::Paused));
        assert_eq!(
            h.engine.request_aggregation(provider(0)),
            Err(AggregatorError::Paused)
        );
        h.engine.set_cooldown(owner(0), 5).unwrap();
        assert_eq!(h.engine.cooldown_secs(), 5);
        h.engine.unpause(owner(0)).unwrap();
        assert!(h.engine.open_batch(owner(0)).is_ok());
    }

    #[test]
    fn test_admin_settings_and_events() {
        let mut h = harness(AggregatorConfig::for_testing());
        assert_eq!(
            h.engine.set_max_batch_size(provider(0), 10),
            Err(AggregatorError::NotOwner)
        );
        assert!(h.engine.set_max_batch_size(owner(0), 0).is_err());
        h.engine.set_max_batch_size(owner(0), 10).unwrap();
        h.engine.set_model_version(owner(0), 7).unwrap();
        assert_eq!(h.engine.add_provider(owner(0), PROVIDER), Ok(false));
        h.engine.transfer_ownership(owner(0), PLAYER_A).unwrap();

        assert_eq!(h.engine.max_batch_size(), 10);
        assert_eq!(h.engine.model_version(), 7);
        assert_eq!(h.engine.owner(), PLAYER_A);

        let names: Vec<_> = h.engine.drain_events().iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec!["batch_size_updated", "model_version_updated", "ownership_transferred"]
        );
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let fhe = Arc::new(InMemoryFheExecutor::new());
        let committee = DecryptionCommittee::generate(1);
        let verifier = Arc::new(CommitteeProofVerifier::new(committee.public_keys(), 1).unwrap());
        let oracle = Arc::new(InMemoryDecryptionOracle::new(fhe.clone(), committee));
        let config = AggregatorConfig {
            cooldown_secs: 0,
            ..Default::default()
        };
        assert!(Engine::new(OWNER, &config, fhe.clone(), oracle.clone(), verifier.clone()).is_err());
        assert!(
            Engine::new(Address::ZERO, &AggregatorConfig::default(), fhe, oracle, verifier)
                .is_err()
        );
    }

    #[test]
    fn test_uninitialized_total_after_open() {
        let mut h = harness(AggregatorConfig::for_testing());
        h.engine.open_batch(owner(0)).unwrap();
        assert_eq!(
            h.engine.current_batch().unwrap().total,
            EncryptedTotal::Uninitialized
        );
    }
}
