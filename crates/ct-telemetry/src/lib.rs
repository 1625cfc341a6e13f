//! # CT Telemetry
//!
//! Structured logging for the ciphertext tally node.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ct_telemetry::{init_tracing, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_tracing(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CT_SERVICE_NAME` | `ct-node` | Service name attached to the startup record |
//! | `CT_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `CT_LOG_JSON` | `false` (`true` in containers) | JSON formatted output |
//! | `CT_LOG_ANSI` | `true` | Colored output for the pretty formatter |

#![warn(missing_docs)]

mod config;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::{init_test_tracing, init_tracing};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Subscriber could not be installed (usually: one is already set).
    #[error("Failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),

    /// Log filter directive could not be parsed.
    #[error("Invalid log filter '{directive}': {reason}")]
    InvalidFilter {
        /// Offending directive
        directive: String,
        /// Parser message
        reason: String,
    },
}
