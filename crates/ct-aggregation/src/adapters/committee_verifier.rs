//! Committee Proof Verifier
//!
//! Implements `ProofVerifier` as a `threshold`-of-`n` secp256k1 signature
//! check over the decryption digest.

use crate::domain::{AggregatorError, ProofError};
use crate::ports::ProofVerifier;
use shared_crypto::{Secp256k1PublicKey, Secp256k1Signature, SIGNATURE_LEN};
use tracing::debug;

/// Threshold verifier over a fixed signer set.
#[derive(Clone, Debug)]
pub struct CommitteeProofVerifier {
    signers: Vec<Secp256k1PublicKey>,
    threshold: usize,
}

impl CommitteeProofVerifier {
    /// Create a verifier. Duplicate keys are collapsed; `threshold` must be
    /// between 1 and the number of distinct signers.
    pub fn new(
        signers: Vec<Secp256k1PublicKey>,
        threshold: usize,
    ) -> Result<Self, AggregatorError> {
        let mut distinct: Vec<Secp256k1PublicKey> = Vec::with_capacity(signers.len());
        for signer in signers {
            if !distinct.contains(&signer) {
                distinct.push(signer);
            }
        }
        if threshold == 0 || threshold > distinct.len() {
            return Err(AggregatorError::InvalidConfig(format!(
                "threshold {threshold} outside 1..={}",
                distinct.len()
            )));
        }
        Ok(Self {
            signers: distinct,
            threshold,
        })
    }

    /// Required distinct signatures.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Number of distinct signers.
    pub fn signer_count(&self) -> usize {
        self.signers.len()
    }
}

impl ProofVerifier for CommitteeProofVerifier {
    fn verify(&self, digest: &[u8; 32], proof: &[u8]) -> Result<(), ProofError> {
        if proof.is_empty() || proof.len() % SIGNATURE_LEN != 0 {
            return Err(ProofError::Malformed(format!(
                "{} bytes is not a whole number of {SIGNATURE_LEN}-byte signatures",
                proof.len()
            )));
        }

        // A signer counts once no matter how many of its signatures appear.
        let mut used = vec![false; self.signers.len()];
        for chunk in proof.chunks_exact(SIGNATURE_LEN) {
            let signature = Secp256k1Signature::from_slice(chunk)
                .map_err(|e| ProofError::Malformed(e.to_string()))?;
            let matched = self
                .signers
                .iter()
                .enumerate()
                .find(|(i, key)| !used[*i] && key.verify(digest, &signature).is_ok());
            if let Some((i, _)) = matched {
                used[i] = true;
            }
        }

        let valid = used.iter().filter(|u| **u).count();
        debug!(valid, threshold = self.threshold, "proof checked");
        if valid < self.threshold {
            return Err(ProofError::InsufficientSignatures {
                valid,
                threshold: self.threshold,
            });
        }
        Ok(())
    }
}
