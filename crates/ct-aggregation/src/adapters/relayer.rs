//! Local oracle relayer: drains the in-memory oracle queue and delivers each
//! fulfillment to the engine callback.

use super::decryption_oracle::InMemoryDecryptionOracle;
use crate::domain::{AggregatorError, RequestId};
use crate::ports::AggregatorApi;
use std::sync::Arc;
use tracing::{info, warn};

/// Delivery result for one queued request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayOutcome {
    /// Relayed request.
    pub request_id: RequestId,
    /// Total accepted by the engine, or why it was not.
    pub result: Result<u64, AggregatorError>,
}

/// Relays fulfillments from an [`InMemoryDecryptionOracle`].
pub struct LocalRelayer {
    oracle: Arc<InMemoryDecryptionOracle>,
}

impl LocalRelayer {
    /// Create a relayer for `oracle`.
    pub fn new(oracle: Arc<InMemoryDecryptionOracle>) -> Self {
        Self { oracle }
    }

    /// Fulfill and deliver every queued request, in request order.
    pub async fn relay_pending<A: AggregatorApi + ?Sized>(&self, api: &A) -> Vec<RelayOutcome> {
        let mut outcomes = Vec::new();
        for request in self.oracle.take_pending() {
            let request_id = request.request_id;
            let result = match self.oracle.fulfill(&request) {
                Ok(response) => {
                    api.on_aggregation_result(request_id, response.cleartexts, response.proof)
                        .await
                }
                Err(e) => Err(e.into()),
            };
            match &result {
                Ok(total) => info!(request_id, total, "relayed decryption"),
                Err(e) => warn!(request_id, error = %e, "relay failed"),
            }
            outcomes.push(RelayOutcome { request_id, result });
        }
        outcomes
    }
}
