//! # Cooldown Ledger
//!
//! Per-caller, per-action-class last-action timestamps. Both action classes
//! share one owner-configured interval.

use super::errors::AggregatorError;
use super::invariants::{invariant_cooldown_elapsed, invariant_positive_setting};
use super::value_objects::{ActionClass, Address, Timestamp};
use std::collections::HashMap;

/// Rate limiter keyed by `(caller, action class)`.
#[derive(Clone, Debug)]
pub struct CooldownLedger {
    interval_secs: u64,
    last_action: HashMap<(Address, ActionClass), Timestamp>,
}

impl CooldownLedger {
    /// Create an empty ledger. `interval_secs` must be strictly positive.
    pub fn new(interval_secs: u64) -> Result<Self, AggregatorError> {
        invariant_positive_setting("cooldown_secs", interval_secs)?;
        Ok(Self {
            interval_secs,
            last_action: HashMap::new(),
        })
    }

    /// Configured interval.
    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    /// Replace the interval. Existing timestamps are kept.
    pub fn set_interval(&mut self, interval_secs: u64) -> Result<(), AggregatorError> {
        invariant_positive_setting("cooldown_secs", interval_secs)?;
        self.interval_secs = interval_secs;
        Ok(())
    }

    /// Last recorded time for `(caller, action)`.
    pub fn last_action(&self, caller: &Address, action: ActionClass) -> Option<Timestamp> {
        self.last_action.get(&(*caller, action)).copied()
    }

    /// Check without recording.
    pub fn check(
        &self,
        caller: &Address,
        action: ActionClass,
        now: Timestamp,
    ) -> Result<(), AggregatorError> {
        invariant_cooldown_elapsed(
            action,
            self.last_action(caller, action),
            now,
            self.interval_secs,
        )
    }

    /// Record `now` as the last action time.
    pub fn record(&mut self, caller: Address, action: ActionClass, now: Timestamp) {
        self.last_action.insert((caller, action), now);
    }

    /// Check, and on success record `now` immediately.
    ///
    /// The slot is consumed even if the caller's operation fails afterwards.
    pub fn check_and_record(
        &mut self,
        caller: Address,
        action: ActionClass,
        now: Timestamp,
    ) -> Result<(), AggregatorError> {
        self.check(&caller, action, now)?;
        self.record(caller, action, now);
        Ok(())
    }
}
