//! Node runtime: wiring, background tasks and shutdown.

use crate::config::NodeConfig;
use anyhow::{Context, Result};
use ct_aggregation::{
    Address, AggregationEngine, AggregationService, CommitteeProofVerifier, DecryptionCommittee,
    InMemoryDecryptionOracle, InMemoryFheExecutor, LocalRelayer, SystemTimeSource,
};
use shared_crypto::Secp256k1KeyPair;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Service wired to the in-memory adapters and the system clock.
pub type LocalService = AggregationService<
    InMemoryFheExecutor,
    InMemoryDecryptionOracle,
    CommitteeProofVerifier,
    SystemTimeSource,
>;

/// A running local node.
pub struct NodeRuntime {
    config: NodeConfig,
    owner: Address,
    fhe: Arc<InMemoryFheExecutor>,
    oracle: Arc<InMemoryDecryptionOracle>,
    service: Arc<LocalService>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl NodeRuntime {
    /// Build the node. Nothing runs until [`NodeRuntime::start`].
    pub fn new(config: NodeConfig) -> Result<Self> {
        let owner = match config.owner {
            Some(owner) => owner,
            None => {
                let key = Secp256k1KeyPair::generate();
                let address = key
                    .public_key()
                    .to_address()
                    .context("failed to derive owner address")?;
                Address::new(address)
            }
        };

        let fhe = Arc::new(InMemoryFheExecutor::new());
        let committee = DecryptionCommittee::generate(config.committee.size);
        let verifier = Arc::new(
            CommitteeProofVerifier::new(committee.public_keys(), config.committee.threshold)
                .context("invalid committee")?,
        );
        let oracle = Arc::new(InMemoryDecryptionOracle::new(fhe.clone(), committee));
        let engine = AggregationEngine::new(
            owner,
            &config.aggregator,
            fhe.clone(),
            oracle.clone(),
            verifier,
        )
        .context("failed to build aggregation engine")?;
        let service = Arc::new(AggregationService::new(
            engine,
            Arc::new(SystemTimeSource),
            config.aggregator.event_channel_capacity,
        ));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config,
            owner,
            fhe,
            oracle,
            service,
            shutdown_tx,
            shutdown_rx,
            tasks: Vec::new(),
        })
    }

    /// Engine owner.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// The aggregation service.
    pub fn service(&self) -> Arc<LocalService> {
        Arc::clone(&self.service)
    }

    /// The FHE executor, for client-side encryption of inputs.
    pub fn fhe(&self) -> Arc<InMemoryFheExecutor> {
        Arc::clone(&self.fhe)
    }

    /// Start the relayer loop and the event logger.
    pub fn start(&mut self) {
        info!("===========================================");
        info!("  CT Node v{}", env!("CARGO_PKG_VERSION"));
        info!("  Engine:    {}", self.config.aggregator.contract_address);
        info!("  Owner:     {}", self.owner);
        info!(
            "  Committee: {}-of-{}",
            self.config.committee.threshold, self.config.committee.size
        );
        info!("===========================================");

        self.tasks.push(self.spawn_relayer());
        self.tasks.push(self.spawn_event_logger());
    }

    fn spawn_relayer(&self) -> JoinHandle<()> {
        let relayer = LocalRelayer::new(Arc::clone(&self.oracle));
        let service = Arc::clone(&self.service);
        let mut shutdown = self.shutdown_rx.clone();
        let mut ticker = tokio::time::interval(self.config.relay_interval);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let outcomes = relayer.relay_pending(service.as_ref()).await;
                        if !outcomes.is_empty() {
                            debug!(relayed = outcomes.len(), "relay pass complete");
                        }
                    }
                    _ = shutdown.changed() => {
                        info!("[relayer] Shutdown signal received");
                        break;
                    }
                }
            }
        })
    }

    fn spawn_event_logger(&self) -> JoinHandle<()> {
        let mut events = self.service.subscribe();
        let mut shutdown = self.shutdown_rx.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    received = events.recv() => match received {
                        Ok(event) => match serde_json::to_string(&event) {
                            Ok(json) => info!(event = event.name(), payload = %json, "engine event"),
                            Err(e) => warn!(event = event.name(), error = %e, "unserializable event"),
                        },
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            warn!(missed, "event logger lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = shutdown.changed() => {
                        info!("[events] Shutdown signal received");
                        break;
                    }
                }
            }
        })
    }

    /// Stop background tasks and wait for them.
    pub async fn shutdown(&mut self) {
        info!("Initiating graceful shutdown...");
        if self.shutdown_tx.send(true).is_err() {
            warn!("no background task was listening for shutdown");
        }
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                warn!(error = %e, "background task failed");
            }
        }
        let stats = self.service.stats();
        info!(
            submissions = stats.submissions_accepted,
            completions = stats.aggregations_completed,
            rejected_callbacks = stats.callbacks_rejected,
            "Shutdown complete"
        );
    }
}
