//! # Domain Module
//!
//! Core domain types and the three state-owning components: access control,
//! cooldown ledger and batch registry.

pub mod access_control;
pub mod batch_registry;
pub mod cooldown;
pub mod entities;
pub mod errors;
pub mod invariants;
pub mod value_objects;

pub use access_control::AccessControl;
pub use batch_registry::BatchRegistry;
pub use cooldown::CooldownLedger;
pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use value_objects::*;
