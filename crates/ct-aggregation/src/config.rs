//! Configuration for the aggregation engine.

use crate::domain::{Address, AggregatorError, CooldownPolicy, ModelVersion};
use serde::{Deserialize, Serialize};

/// Engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Engine identity bound into every fingerprint and proof digest.
    pub contract_address: Address,
    /// Minimum seconds between two actions of the same class by one caller.
    pub cooldown_secs: u64,
    /// Fragment ceiling per batch.
    pub max_batch_size: u64,
    /// When a cooldown slot is consumed.
    pub cooldown_policy: CooldownPolicy,
    /// Seconds after which a pending decryption request may be expired.
    pub request_timeout_secs: u64,
    /// Model version in effect at startup.
    pub initial_model_version: ModelVersion,
    /// Capacity of the service's broadcast event channel.
    pub event_channel_capacity: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            contract_address: Address::new([0xCA; 20]),
            cooldown_secs: 60,
            max_batch_size: 32,
            cooldown_policy: CooldownPolicy::ChargeOnAttempt,
            request_timeout_secs: 3600,
            initial_model_version: 1,
            event_channel_capacity: 1024,
        }
    }
}

impl AggregatorConfig {
    /// Small limits for tests: 60s cooldown, two fragments per batch,
    /// five-minute request timeout.
    pub fn for_testing() -> Self {
        Self {
            max_batch_size: 2,
            request_timeout_secs: 300,
            event_channel_capacity: 64,
            ..Default::default()
        }
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), AggregatorError> {
        if self.contract_address.is_zero() {
            return Err(AggregatorError::InvalidConfig(
                "contract_address must not be zero".to_string(),
            ));
        }
        if self.cooldown_secs == 0 {
            return Err(AggregatorError::InvalidConfig(
                "cooldown_secs must be greater than zero".to_string(),
            ));
        }
        if self.max_batch_size == 0 {
            return Err(AggregatorError::InvalidConfig(
                "max_batch_size must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(AggregatorError::InvalidConfig(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.event_channel_capacity == 0 {
            return Err(AggregatorError::InvalidConfig(
                "event_channel_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Decryption committee shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitteeConfig {
    /// Number of signers.
    pub size: usize,
    /// Distinct signatures required per proof.
    pub threshold: usize,
}

impl Default for CommitteeConfig {
    fn default() -> Self {
        Self {
            size: 3,
            threshold: 2,
        }
    }
}

impl CommitteeConfig {
    /// Require `1 <= threshold <= size`.
    pub fn validate(&self) -> Result<(), AggregatorError> {
        if self.threshold == 0 || self.threshold > self.size {
            return Err(AggregatorError::InvalidConfig(format!(
                "committee threshold {} outside 1..={}",
                self.threshold, self.size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AggregatorConfig::default();
        assert_eq!(config.cooldown_secs, 60);
        assert_eq!(config.max_batch_size, 32);
        assert_eq!(config.request_timeout_secs, 3600);
        assert_eq!(config.cooldown_policy, CooldownPolicy::ChargeOnAttempt);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_for_testing_config() {
        let config = AggregatorConfig::for_testing();
        assert_eq!(config.max_batch_size, 2);
        assert_eq!(config.cooldown_secs, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_values_rejected() {
        for config in [
            AggregatorConfig {
                cooldown_secs: 0,
                ..Default::default()
            },
            AggregatorConfig {
                max_batch_size: 0,
                ..Default::default()
            },
            AggregatorConfig {
                request_timeout_secs: 0,
                ..Default::default()
            },
            AggregatorConfig {
                contract_address: Address::ZERO,
                ..Default::default()
            },
        ] {
            assert!(matches!(
                config.validate(),
                Err(AggregatorError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_committee_config() {
        assert!(CommitteeConfig::default().validate().is_ok());
        assert!(CommitteeConfig { size: 2, threshold: 3 }.validate().is_err());
        assert!(CommitteeConfig { size: 2, threshold: 0 }.validate().is_err());
    }

    #[test]
    fn test_config_serde() {
        let config = AggregatorConfig {
            cooldown_policy: CooldownPolicy::ChargeOnSuccess,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: AggregatorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
