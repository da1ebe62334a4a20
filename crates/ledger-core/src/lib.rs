pub mod chain;
pub mod consensus;
pub mod constants;
pub mod error;
pub mod peers;
pub mod pow;
pub mod validate;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

pub use chain::{Ledger, MiningJob};
pub use consensus::{Candidate, ConsensusResolver, PeerChain, PeerClient};
pub use error::{LedgerError, PeerError, ValidationError};
pub use peers::PeerRegistry;
pub use pow::{CancelToken, ProofOfWork};
pub use validate::ChainValidator;

pub type Hash = [u8; 32];

/// Any JSON number: integral, fractional or negative. Unvalidated.
pub type Amount = serde_json::Number;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: Amount,
}

impl Transaction {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<Amount>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount: amount.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

// Hash-only encodings. Fields are declared in lexicographic order so the
// serialized object is key-sorted no matter how the block was built.
#[derive(Serialize)]
struct CanonicalTransaction<'a> {
    amount: &'a Amount,
    recipient: &'a str,
    sender: &'a str,
}

#[derive(Serialize)]
struct CanonicalBlock<'a> {
    index: u64,
    previous_hash: &'a str,
    proof: u64,
    timestamp: u64,
    transactions: Vec<CanonicalTransaction<'a>>,
}

impl Block {
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        proof: u64,
        previous_hash: impl Into<String>,
    ) -> Self {
        Self {
            index,
            timestamp: unix_now(),
            transactions,
            proof,
            previous_hash: previous_hash.into(),
        }
    }

    /// Canonical byte encoding used for hashing only; independent of the
    /// wire representation.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let canonical = CanonicalBlock {
            index: self.index,
            previous_hash: &self.previous_hash,
            proof: self.proof,
            timestamp: self.timestamp,
            transactions: self
                .transactions
                .iter()
                .map(|t| CanonicalTransaction {
                    amount: &t.amount,
                    recipient: &t.recipient,
                    sender: &t.sender,
                })
                .collect(),
        };
        // Strings, finite numbers and sequences only: serialization cannot fail.
        serde_json::to_vec(&canonical).unwrap_or_default()
    }

    pub fn hash(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_bytes());
        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest[..]);
        out
    }

    /// Lowercase hex of [`Block::hash`]; what `previous_hash` links to.
    pub fn fingerprint(&self) -> String {
        hex::encode(self.hash())
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 1
            && self.previous_hash == constants::GENESIS_PREVIOUS_HASH
            && self.proof == constants::GENESIS_PROOF
            && self.transactions.is_empty()
    }
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
