//! Node configuration, loaded from `CT_*` environment variables.

use anyhow::{bail, Context, Result};
use ct_aggregation::{Address, AggregatorConfig, CommitteeConfig, CooldownPolicy};
use std::time::Duration;

/// Full node configuration.
#[derive(Clone, Debug)]
pub struct NodeConfig {
    /// Engine settings.
    pub aggregator: AggregatorConfig,
    /// Local decryption committee shape.
    pub committee: CommitteeConfig,
    /// How often the local relayer drains the oracle queue.
    pub relay_interval: Duration,
    /// Engine owner; a fresh key is generated when unset.
    pub owner: Option<Address>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            aggregator: AggregatorConfig::default(),
            committee: CommitteeConfig::default(),
            relay_interval: Duration::from_millis(500),
            owner: None,
        }
    }
}

impl NodeConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup("CT_COOLDOWN_SECS") {
            config.aggregator.cooldown_secs = v.parse().context("CT_COOLDOWN_SECS")?;
        }
        if let Some(v) = lookup("CT_MAX_BATCH_SIZE") {
            config.aggregator.max_batch_size = v.parse().context("CT_MAX_BATCH_SIZE")?;
        }
        if let Some(v) = lookup("CT_REQUEST_TIMEOUT_SECS") {
            config.aggregator.request_timeout_secs =
                v.parse().context("CT_REQUEST_TIMEOUT_SECS")?;
        }
        if let Some(v) = lookup("CT_COOLDOWN_POLICY") {
            config.aggregator.cooldown_policy = parse_policy(&v)?;
        }
        if let Some(v) = lookup("CT_CONTRACT_ADDRESS") {
            config.aggregator.contract_address =
                parse_address(&v).context("CT_CONTRACT_ADDRESS")?;
        }
        if let Some(v) = lookup("CT_OWNER") {
            config.owner = Some(parse_address(&v).context("CT_OWNER")?);
        }
        if let Some(v) = lookup("CT_RELAY_INTERVAL_MS") {
            let ms: u64 = v.parse().context("CT_RELAY_INTERVAL_MS")?;
            config.relay_interval = Duration::from_millis(ms.max(1));
        }
        if let Some(v) = lookup("CT_COMMITTEE_SIZE") {
            config.committee.size = v.parse().context("CT_COMMITTEE_SIZE")?;
        }
        if let Some(v) = lookup("CT_COMMITTEE_THRESHOLD") {
            config.committee.threshold = v.parse().context("CT_COMMITTEE_THRESHOLD")?;
        }

        config.aggregator.validate()?;
        config.committee.validate()?;
        Ok(config)
    }
}

fn parse_policy(value: &str) -> Result<CooldownPolicy> {
    match value.trim().to_ascii_lowercase().as_str() {
        "attempt" | "charge-on-attempt" => Ok(CooldownPolicy::ChargeOnAttempt),
        "success" | "charge-on-success" => Ok(CooldownPolicy::ChargeOnSuccess),
        other => bail!("unknown CT_COOLDOWN_POLICY '{other}' (expected attempt|success)"),
    }
}

fn parse_address(value: &str) -> Result<Address> {
    let bytes = hex::decode(value.trim().trim_start_matches("0x")).context("invalid hex")?;
    let bytes: [u8; 20] = bytes
        .try_into()
        .map_err(|b: Vec<u8>| anyhow::anyhow!("expected 20 bytes, got {}", b.len()))?;
    Ok(Address::new(bytes))
}
