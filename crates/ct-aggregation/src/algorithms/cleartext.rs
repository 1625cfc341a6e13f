//! # Cleartext Codec
//!
//! Oracle cleartexts are ABI words: one 32-byte big-endian unsigned integer
//! per requested handle, in request order.

use crate::domain::AggregatorError;
use primitive_types::U256;

/// Size of one ABI word.
pub const WORD_LEN: usize = 32;

/// Encode values as consecutive ABI words.
pub fn encode_cleartexts(values: &[U256]) -> Vec<u8> {
    let mut out = vec![0u8; values.len() * WORD_LEN];
    for (value, chunk) in values.iter().zip(out.chunks_exact_mut(WORD_LEN)) {
        value.to_big_endian(chunk);
    }
    out
}

/// Decode exactly `expected` words.
pub fn decode_words(cleartexts: &[u8], expected: usize) -> Result<Vec<U256>, AggregatorError> {
    if cleartexts.len() != expected * WORD_LEN {
        return Err(AggregatorError::MalformedCleartexts(format!(
            "expected {} bytes, got {}",
            expected * WORD_LEN,
            cleartexts.len()
        )));
    }
    Ok(cleartexts
        .chunks_exact(WORD_LEN)
        .map(U256::from_big_endian)
        .collect())
}

/// Decode the single aggregate word as a `u64` total.
pub fn decode_total(cleartexts: &[u8]) -> Result<u64, AggregatorError> {
    let words = decode_words(cleartexts, 1)?;
    let total = words[0];
    if total > U256::from(u64::MAX) {
        return Err(AggregatorError::MalformedCleartexts(format!(
            "total {total} exceeds u64"
        )));
    }
    Ok(total.low_u64())
}
