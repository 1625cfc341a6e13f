//! In-Memory Decryption Oracle
//!
//! Implements `DecryptionOracle` with a local request queue and a
//! secp256k1 signing committee. Requests are fulfilled out of band by
//! `LocalRelayer`, mirroring the asynchronous request/callback split of a
//! real oracle network.

use super::in_memory_fhe::InMemoryFheExecutor;
use crate::algorithms::{decryption_digest, encode_cleartexts};
use crate::domain::{Address, CallbackSelector, CiphertextHandle, FheError, OracleError, RequestId};
use crate::ports::DecryptionOracle;
use parking_lot::Mutex;
use primitive_types::U256;
use shared_crypto::{Secp256k1KeyPair, Secp256k1PublicKey};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// A queued decryption request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecryptionRequest {
    /// Oracle-assigned id.
    pub request_id: RequestId,
    /// Engine that asked, and whose callback will be invoked.
    pub requester: Address,
    /// Public handle representations, in request order.
    pub handles: Vec<[u8; 32]>,
    /// Callback to invoke.
    pub callback: CallbackSelector,
}

/// Fulfillment payload handed to the requester's callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleResponse {
    /// Request being fulfilled.
    pub request_id: RequestId,
    /// ABI-encoded plaintexts.
    pub cleartexts: Vec<u8>,
    /// Concatenated committee signatures.
    pub proof: Vec<u8>,
}

/// Key holders that co-sign every fulfillment.
pub struct DecryptionCommittee {
    members: Vec<Secp256k1KeyPair>,
}

impl DecryptionCommittee {
    /// Fresh random committee.
    pub fn generate(size: usize) -> Self {
        Self {
            members: (0..size).map(|_| Secp256k1KeyPair::generate()).collect(),
        }
    }

    /// Committee from existing keys.
    pub fn from_keys(members: Vec<Secp256k1KeyPair>) -> Self {
        Self { members }
    }

    /// Member public keys, in member order.
    pub fn public_keys(&self) -> Vec<Secp256k1PublicKey> {
        self.members.iter().map(|m| m.public_key()).collect()
    }

    /// Committee size.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the committee has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Proof signed by every member.
    pub fn sign(&self, digest: &[u8; 32]) -> Vec<u8> {
        self.sign_with_first(digest, self.members.len())
    }

    /// Proof signed by the first `count` members only.
    pub fn sign_with_first(&self, digest: &[u8; 32], count: usize) -> Vec<u8> {
        self.members
            .iter()
            .take(count)
            .flat_map(|member| member.sign(digest).as_bytes().to_vec())
            .collect()
    }
}

/// Queue-backed oracle reading plaintexts from an [`InMemoryFheExecutor`].
pub struct InMemoryDecryptionOracle {
    fhe: Arc<InMemoryFheExecutor>,
    committee: DecryptionCommittee,
    next_id: AtomicU64,
    pending: Mutex<VecDeque<DecryptionRequest>>,
    accepting: AtomicBool,
}

impl InMemoryDecryptionOracle {
    /// Create an oracle. Request ids start at 1.
    pub fn new(fhe: Arc<InMemoryFheExecutor>, committee: DecryptionCommittee) -> Self {
        Self {
            fhe,
            committee,
            next_id: AtomicU64::new(1),
            pending: Mutex::new(VecDeque::new()),
            accepting: AtomicBool::new(true),
        }
    }

    /// Signing committee.
    pub fn committee(&self) -> &DecryptionCommittee {
        &self.committee
    }

    /// Stop (or resume) accepting new requests.
    pub fn set_accepting(&self, accepting: bool) {
        self.accepting.store(accepting, Ordering::SeqCst);
    }

    /// Number of queued requests.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Drain the queue.
    pub fn take_pending(&self) -> Vec<DecryptionRequest> {
        self.pending.lock().drain(..).collect()
    }

    /// Decrypt and sign a queued request.
    pub fn fulfill(&self, request: &DecryptionRequest) -> Result<OracleResponse, FheError> {
        let values = request
            .handles
            .iter()
            .map(|bytes| {
                let handle = CiphertextHandle::new(*bytes);
                self.fhe
                    .plaintext(&handle)
                    .map(U256::from)
                    .ok_or(FheError::UnknownHandle(handle))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let cleartexts = encode_cleartexts(&values);
        let digest = decryption_digest(&request.requester, request.request_id, &cleartexts);
        let proof = self.committee.sign(&digest);

        debug!(
            request_id = request.request_id,
            signers = self.committee.len(),
            "decryption fulfilled"
        );

        Ok(OracleResponse {
            request_id: request.request_id,
            cleartexts,
            proof,
        })
    }
}

impl DecryptionOracle for InMemoryDecryptionOracle {
    fn request_decryption(
        &self,
        requester: Address,
        handles: &[[u8; 32]],
        callback: CallbackSelector,
    ) -> Result<RequestId, OracleError> {
        if !self.accepting.load(Ordering::SeqCst) {
            return Err(OracleError::Rejected("oracle not accepting requests".to_string()));
        }
        if handles.is_empty() {
            return Err(OracleError::EmptyRequest);
        }

        let request_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.pending.lock().push_back(DecryptionRequest {
            request_id,
            requester,
            handles: handles.to_vec(),
            callback,
        });

        info!(request_id, %requester, handles = handles.len(), "decryption queued");
        Ok(request_id)
    }
}
