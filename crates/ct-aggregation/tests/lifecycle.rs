//! # Lifecycle Tests
//!
//! End-to-end batch lifecycle through the async service and the in-memory
//! adapters: open, submit, close, request, relay, complete.

use ct_aggregation::{
    ActionClass, Address, AggregationEngine, AggregationService, AggregatorApi, AggregatorConfig,
    AggregatorError, AggregatorEvent, BatchState, CallContext, CommitteeProofVerifier,
    CooldownPolicy, DecryptionCommittee, EncryptedTotal, InMemoryDecryptionOracle,
    InMemoryFheExecutor, LocalRelayer, ManualTimeSource,
};
use proptest::prelude::*;
use std::sync::Arc;

// =============================================================================
// TEST HELPERS
// =============================================================================

const OWNER: Address = Address::new([0x01; 20]);
const PROVIDER: Address = Address::new([0xA1; 20]);
const PLAYER_A: Address = Address::new([0xB0; 20]);
const PLAYER_B: Address = Address::new([0xB1; 20]);
const PLAYER_C: Address = Address::new([0xB2; 20]);

type Service = AggregationService<
    InMemoryFheExecutor,
    InMemoryDecryptionOracle,
    CommitteeProofVerifier,
    ManualTimeSource,
>;

struct Node {
    fhe: Arc<InMemoryFheExecutor>,
    oracle: Arc<InMemoryDecryptionOracle>,
    clock: Arc<ManualTimeSource>,
    service: Service,
    relayer: LocalRelayer,
}

async fn node(config: AggregatorConfig) -> Node {
    let fhe = Arc::new(InMemoryFheExecutor::new());
    let committee = DecryptionCommittee::generate(3);
    let verifier = Arc::new(CommitteeProofVerifier::new(committee.public_keys(), 2).unwrap());
    let oracle = Arc::new(InMemoryDecryptionOracle::new(fhe.clone(), committee));
    let engine =
        AggregationEngine::new(OWNER, &config, fhe.clone(), oracle.clone(), verifier).unwrap();
    let clock = Arc::new(ManualTimeSource::new(0));
    let service = AggregationService::new(engine, clock.clone(), config.event_channel_capacity);
    service.add_provider(OWNER, PROVIDER).await.unwrap();
    let relayer = LocalRelayer::new(oracle.clone());
    Node {
        fhe,
        oracle,
        clock,
        service,
        relayer,
    }
}

impl Node {
    async fn submit(&self, player: Address, score: u64) -> Result<u64, AggregatorError> {
        self.service
            .submit_fragment(PROVIDER, player, self.fhe.encrypt(score), self.fhe.encrypt(0))
            .await
            .map(|receipt| receipt.fragment_id)
    }
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[tokio::test]
async fn test_reference_scenario() {
    ct_telemetry::init_test_tracing();
    let node = node(AggregatorConfig::for_testing()).await;
    let mut events = node.service.subscribe();

    assert_eq!(node.service.open_batch(OWNER).await, Ok(1));

    // Same provider, different players: submission cooldown is per player.
    assert_eq!(node.submit(PLAYER_A, 10).await, Ok(1));
    assert_eq!(node.submit(PLAYER_B, 5).await, Ok(2));
    assert_eq!(
        node.submit(PLAYER_C, 7).await,
        Err(AggregatorError::BatchFull {
            batch_id: 1,
            max: 2
        })
    );
    assert_eq!(node.service.current_batch().unwrap().fragment_count, 2);

    node.service.close_batch(OWNER).await.unwrap();
    node.clock.set(61);
    let ticket = node.service.request_aggregation(PROVIDER).await.unwrap();
    assert_eq!(ticket.request_id, 1);
    assert_eq!(ticket.batch_id, 1);

    let outcomes = node.relayer.relay_pending(&node.service).await;
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].result, Ok(15));

    let context = node.service.context(1).unwrap();
    assert!(context.is_processed());
    assert_eq!(context.fingerprint, ticket.fingerprint);
    let batch = node.service.batch(1).unwrap();
    assert_eq!(batch.state, BatchState::AggregationCompleted);
    assert_eq!(batch.revealed_total, Some(15));

    let mut completed = None;
    while let Ok(event) = events.try_recv() {
        if let AggregatorEvent::AggregationCompleted { total, .. } = event {
            completed = Some(total);
        }
    }
    assert_eq!(completed, Some(15));
}

#[tokio::test]
async fn test_second_batch_after_completion() {
    let node = node(AggregatorConfig::for_testing()).await;
    node.service.open_batch(OWNER).await.unwrap();
    node.submit(PLAYER_A, 4).await.unwrap();
    node.service.close_batch(OWNER).await.unwrap();
    node.service.request_aggregation(PROVIDER).await.unwrap();
    node.relayer.relay_pending(&node.service).await;

    node.clock.advance(60);
    assert_eq!(node.service.open_batch(OWNER).await, Ok(2));
    assert!(!node.service.current_batch().unwrap().total.is_initialized());
    node.submit(PLAYER_A, 9).await.unwrap();
    node.service.close_batch(OWNER).await.unwrap();
    node.service.request_aggregation(PROVIDER).await.unwrap();

    let outcomes = node.relayer.relay_pending(&node.service).await;
    assert_eq!(outcomes[0].result, Ok(9));
    assert_eq!(node.service.batch(1).unwrap().revealed_total, Some(4));
    assert_eq!(node.service.batch(2).unwrap().revealed_total, Some(9));
}

#[tokio::test]
async fn test_double_request_yields_independent_contexts() {
    let node = node(AggregatorConfig::for_testing()).await;
    node.service.open_batch(OWNER).await.unwrap();
    node.submit(PLAYER_A, 8).await.unwrap();
    node.service.close_batch(OWNER).await.unwrap();

    let first = node.service.request_aggregation(PROVIDER).await.unwrap();
    node.clock.advance(60);
    let second = node.service.request_aggregation(PROVIDER).await.unwrap();
    assert_ne!(first.request_id, second.request_id);
    assert_eq!(first.fingerprint, second.fingerprint);

    let pending = node.oracle.take_pending();
    let first_response = node.oracle.fulfill(&pending[0]).unwrap();
    let second_response = node.oracle.fulfill(&pending[1]).unwrap();

    // Each request completes once, in either order.
    assert_eq!(
        node.service
            .on_aggregation_result(
                second.request_id,
                second_response.cleartexts.clone(),
                second_response.proof.clone()
            )
            .await,
        Ok(8)
    );
    assert_eq!(
        node.service
            .on_aggregation_result(
                first.request_id,
                first_response.cleartexts,
                first_response.proof
            )
            .await,
        Ok(8)
    );
    assert_eq!(
        node.service
            .on_aggregation_result(
                second.request_id,
                second_response.cleartexts,
                second_response.proof
            )
            .await,
        Err(AggregatorError::InvalidRequest(second.request_id))
    );
}

#[tokio::test]
async fn test_aggregation_request_cooldown() {
    let node = node(AggregatorConfig::for_testing()).await;
    node.service.open_batch(OWNER).await.unwrap();
    node.submit(PLAYER_A, 1).await.unwrap();
    node.service.close_batch(OWNER).await.unwrap();

    node.service.request_aggregation(PROVIDER).await.unwrap();
    node.clock.advance(59);
    assert!(matches!(
        node.service.request_aggregation(PROVIDER).await,
        Err(AggregatorError::CooldownActive {
            action: ActionClass::AggregationRequest,
            remaining_secs: 1
        })
    ));
    node.clock.advance(1);
    assert!(node.service.request_aggregation(PROVIDER).await.is_ok());
    assert_eq!(node.service.stats().aggregation_requests, 2);
    assert_eq!(node.service.stats().requests_rejected, 1);
}

#[tokio::test]
async fn test_expired_request_can_be_reissued() {
    let node = node(AggregatorConfig::for_testing()).await;
    node.service.open_batch(OWNER).await.unwrap();
    node.submit(PLAYER_A, 12).await.unwrap();
    node.service.close_batch(OWNER).await.unwrap();

    let stuck = node.service.request_aggregation(PROVIDER).await.unwrap();
    // Oracle drops the request.
    node.oracle.take_pending();

    assert!(matches!(
        node.service.expire_request(PROVIDER, stuck.request_id).await,
        Err(AggregatorError::RequestNotExpired { .. })
    ));
    node.clock.advance(300);
    node.service
        .expire_request(PROVIDER, stuck.request_id)
        .await
        .unwrap();

    let retry = node.service.request_aggregation(PROVIDER).await.unwrap();
    let outcomes = node.relayer.relay_pending(&node.service).await;
    assert_eq!(outcomes[0].request_id, retry.request_id);
    assert_eq!(outcomes[0].result, Ok(12));
    assert_eq!(node.service.stats().requests_expired, 1);
}

#[tokio::test]
async fn test_cooldown_policies_differ_on_failed_submission() {
    for (policy, charged) in [
        (CooldownPolicy::ChargeOnAttempt, true),
        (CooldownPolicy::ChargeOnSuccess, false),
    ] {
        let node = node(AggregatorConfig {
            cooldown_policy: policy,
            ..AggregatorConfig::for_testing()
        })
        .await;
        node.service.open_batch(OWNER).await.unwrap();
        node.service.close_batch(OWNER).await.unwrap();

        assert_eq!(
            node.submit(PLAYER_A, 1).await,
            Err(AggregatorError::BatchClosed(1))
        );
        let last = node
            .service
            .inspect(|engine| engine.last_action(&PLAYER_A, ActionClass::Submission));
        assert_eq!(last.is_some(), charged, "policy {policy:?}");
    }
}

// =============================================================================
// PROPERTIES
// =============================================================================

fn engine_with_capacity(
    max_batch_size: u64,
) -> (
    Arc<InMemoryFheExecutor>,
    Arc<InMemoryDecryptionOracle>,
    AggregationEngine<InMemoryFheExecutor, InMemoryDecryptionOracle, CommitteeProofVerifier>,
) {
    let config = AggregatorConfig {
        max_batch_size,
        ..AggregatorConfig::for_testing()
    };
    let fhe = Arc::new(InMemoryFheExecutor::new());
    let committee = DecryptionCommittee::generate(1);
    let verifier = Arc::new(CommitteeProofVerifier::new(committee.public_keys(), 1).unwrap());
    let oracle = Arc::new(InMemoryDecryptionOracle::new(fhe.clone(), committee));
    let mut engine =
        AggregationEngine::new(OWNER, &config, fhe.clone(), oracle.clone(), verifier).unwrap();
    engine
        .add_provider(CallContext::new(OWNER, 0), PROVIDER)
        .unwrap();
    engine.open_batch(CallContext::new(OWNER, 0)).unwrap();
    (fhe, oracle, engine)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_aggregate_is_order_independent_sum(
        scores in prop::collection::vec(0u64..1_000_000, 1..12),
        seed in any::<u64>(),
    ) {
        let (fhe, oracle, mut engine) = engine_with_capacity(scores.len() as u64);

        // Deterministic shuffle of the submission order.
        let mut order: Vec<usize> = (0..scores.len()).collect();
        let mut state = seed | 1;
        for i in (1..order.len()).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            order.swap(i, (state % (i as u64 + 1)) as usize);
        }

        for (n, &i) in order.iter().enumerate() {
            let player = Address::new([n as u8 + 1; 20]);
            engine
                .submit_fragment(
                    CallContext::new(PROVIDER, 0),
                    player,
                    fhe.encrypt(scores[i]),
                    fhe.encrypt(0),
                )
                .unwrap();
        }
        engine.close_batch(CallContext::new(OWNER, 0)).unwrap();
        let ticket = engine.request_aggregation(CallContext::new(PROVIDER, 0)).unwrap();

        let response = oracle.fulfill(&oracle.take_pending()[0]).unwrap();
        let total = engine
            .on_aggregation_result(ticket.request_id, &response.cleartexts, &response.proof)
            .unwrap();
        prop_assert_eq!(total, scores.iter().sum::<u64>());
    }

    #[test]
    fn prop_fragment_count_never_exceeds_capacity(
        capacity in 1u64..6,
        attempts in 1usize..12,
    ) {
        let (fhe, _, mut engine) = engine_with_capacity(capacity);
        let mut accepted = 0u64;
        for n in 0..attempts {
            let player = Address::new([n as u8 + 1; 20]);
            let before = engine.current_batch().map(|b| b.total);
            match engine.submit_fragment(
                CallContext::new(PROVIDER, 0),
                player,
                fhe.encrypt(1),
                fhe.encrypt(0),
            ) {
                Ok(_) => accepted += 1,
                Err(AggregatorError::BatchFull { .. }) => {
                    prop_assert_eq!(engine.current_batch().map(|b| b.total), before);
                }
                Err(e) => prop_assert!(false, "unexpected error {e}"),
            }
        }
        prop_assert_eq!(accepted, capacity.min(attempts as u64));
        prop_assert_eq!(engine.current_batch().unwrap().fragment_count, accepted);
        prop_assert!(engine.current_batch().unwrap().total != EncryptedTotal::Uninitialized);
    }
}
