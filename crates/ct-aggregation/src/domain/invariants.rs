//! # Domain Invariants
//!
//! Business rules shared by the engine components.

use super::errors::AggregatorError;
use super::value_objects::{ActionClass, BatchId, Fingerprint, RequestId, Timestamp};

/// Invariant: owner-settable limits are strictly positive.
pub fn invariant_positive_setting(name: &str, value: u64) -> Result<(), AggregatorError> {
    if value == 0 {
        return Err(AggregatorError::InvalidConfig(format!(
            "{name} must be greater than zero"
        )));
    }
    Ok(())
}

/// Invariant: a batch never holds more than `max_batch_size` fragments.
pub fn invariant_capacity(
    batch_id: BatchId,
    fragment_count: u64,
    max_batch_size: u64,
) -> Result<(), AggregatorError> {
    if fragment_count >= max_batch_size {
        return Err(AggregatorError::BatchFull {
            batch_id,
            max: max_batch_size,
        });
    }
    Ok(())
}

/// Invariant: the same action class is not repeated within the interval.
///
/// `last == None` means the caller never performed this action.
pub fn invariant_cooldown_elapsed(
    action: ActionClass,
    last: Option<Timestamp>,
    now: Timestamp,
    interval_secs: u64,
) -> Result<(), AggregatorError> {
    if let Some(last) = last {
        let ready_at = last.saturating_add(interval_secs);
        if now < ready_at {
            return Err(AggregatorError::CooldownActive {
                action,
                remaining_secs: ready_at - now,
            });
        }
    }
    Ok(())
}

/// Invariant: the callback observes exactly the ciphertext state that was
/// snapshotted at request time.
pub fn invariant_fingerprint_match(
    request_id: RequestId,
    stored: &Fingerprint,
    recomputed: &Fingerprint,
) -> Result<(), AggregatorError> {
    if stored != recomputed {
        return Err(AggregatorError::InvalidState(request_id));
    }
    Ok(())
}
