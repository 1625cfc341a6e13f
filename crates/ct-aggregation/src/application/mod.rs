//! # Application Layer
//!
//! Fragment aggregation, the decryption protocol, the engine that composes
//! them with the domain components, and the async service facade.

pub mod coordinator;
pub mod engine;
pub mod fragment_aggregator;
pub mod service;

pub use coordinator::{DecryptionCoordinator, PreparedRequest};
pub use engine::AggregationEngine;
pub use fragment_aggregator::FragmentAggregator;
pub use service::{AggregationService, ServiceStats};
