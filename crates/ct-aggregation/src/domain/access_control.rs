//! # Access Control
//!
//! Owner and provider role registry plus the global pause flag. Every
//! mutating engine entry point passes through here before touching state.

use super::errors::AggregatorError;
use super::value_objects::Address;
use std::collections::BTreeSet;
use tracing::debug;

/// Role registry and pause flag.
#[derive(Clone, Debug)]
pub struct AccessControl {
    owner: Address,
    providers: BTreeSet<Address>,
    paused: bool,
}

impl AccessControl {
    /// Create a registry owned by `owner`, with no providers, unpaused.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            providers: BTreeSet::new(),
            paused: false,
        }
    }

    /// Current owner.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Whether `caller` is the owner.
    pub fn is_owner(&self, caller: &Address) -> bool {
        self.owner == *caller
    }

    /// Whether `caller` is a registered provider.
    pub fn is_provider(&self, caller: &Address) -> bool {
        self.providers.contains(caller)
    }

    /// Whether mutating batch/fragment operations are paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Registered providers, in address order.
    pub fn providers(&self) -> impl Iterator<Item = &Address> {
        self.providers.iter()
    }

    /// Gate: caller must be the owner.
    pub fn ensure_owner(&self, caller: &Address) -> Result<(), AggregatorError> {
        if !self.is_owner(caller) {
            debug!(%caller, "rejected: not owner");
            return Err(AggregatorError::NotOwner);
        }
        Ok(())
    }

    /// Gate: caller must be a provider.
    pub fn ensure_provider(&self, caller: &Address) -> Result<(), AggregatorError> {
        if !self.is_provider(caller) {
            debug!(%caller, "rejected: not provider");
            return Err(AggregatorError::NotProvider);
        }
        Ok(())
    }

    /// Gate: engine must not be paused.
    pub fn ensure_not_paused(&self) -> Result<(), AggregatorError> {
        if self.paused {
            return Err(AggregatorError::Paused);
        }
        Ok(())
    }

    /// Register a provider. Returns `false` if it was already registered.
    pub fn add_provider(
        &mut self,
        caller: &Address,
        provider: Address,
    ) -> Result<bool, AggregatorError> {
        self.ensure_owner(caller)?;
        if provider.is_zero() {
            return Err(AggregatorError::InvalidConfig(
                "provider must not be the zero address".to_string(),
            ));
        }
        Ok(self.providers.insert(provider))
    }

    /// Deregister a provider. Returns `false` if it was not registered.
    pub fn remove_provider(
        &mut self,
        caller: &Address,
        provider: &Address,
    ) -> Result<bool, AggregatorError> {
        self.ensure_owner(caller)?;
        Ok(self.providers.remove(provider))
    }

    /// Pause mutating operations. Fails if already paused.
    pub fn pause(&mut self, caller: &Address) -> Result<(), AggregatorError> {
        self.ensure_owner(caller)?;
        if self.paused {
            return Err(AggregatorError::AlreadyPaused);
        }
        self.paused = true;
        Ok(())
    }

    /// Resume mutating operations. Unconditional for the owner.
    pub fn unpause(&mut self, caller: &Address) -> Result<(), AggregatorError> {
        self.ensure_owner(caller)?;
        self.paused = false;
        Ok(())
    }

    /// Hand ownership to `new_owner`. Returns the previous owner.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<Address, AggregatorError> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(AggregatorError::InvalidConfig(
                "new owner must not be the zero address".to_string(),
            ));
        }
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }
}
