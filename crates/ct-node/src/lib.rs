//! # CT Node
//!
//! Local development node for the aggregation engine.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `CT_*` environment variables
//! 2. Initialize tracing
//! 3. Wire the service to the in-memory FHE executor, oracle and committee
//! 4. Spawn the oracle relayer loop and the event logger
//! 5. Wait for Ctrl+C, then shut down gracefully

#![warn(missing_docs)]

pub mod config;
pub mod runtime;

pub use config::NodeConfig;
pub use runtime::{LocalService, NodeRuntime};
