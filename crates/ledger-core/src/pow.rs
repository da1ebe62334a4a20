//! Proof-of-work puzzle binding each new proof to the previous proof and the
//! fingerprint of the block it extends.

use crate::{constants::DEFAULT_DIFFICULTY, Hash};
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Shared flag used to abandon an in-flight search.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Candidates handed to the pool per round of the cancellable search.
const SEARCH_BATCH: u64 = 1 << 14;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: u32,
}

impl Default for ProofOfWork {
    fn default() -> Self {
        Self::new(DEFAULT_DIFFICULTY)
    }
}

impl ProofOfWork {
    /// `difficulty` is the number of leading zero hex digits a guess digest
    /// must carry. Values above 64 can never be met.
    pub fn new(difficulty: u32) -> Self {
        Self { difficulty }
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Digest of the literal text `"{last_proof}{proof}{reference_hash}"`.
    pub fn guess_hash(last_proof: u64, proof: u64, reference_hash: &str) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(format!("{last_proof}{proof}{reference_hash}").as_bytes());
        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest[..]);
        out
    }

    pub fn is_valid(&self, last_proof: u64, proof: u64, reference_hash: &str) -> bool {
        let hash = Self::guess_hash(last_proof, proof, reference_hash);
        count_leading_zero_nibbles(&hash) >= self.difficulty
    }

    /// Smallest non-negative proof satisfying [`ProofOfWork::is_valid`],
    /// found by ascending search from zero.
    pub fn solve(&self, last_proof: u64, reference_hash: &str) -> u64 {
        let mut proof = 0u64;
        while !self.is_valid(last_proof, proof, reference_hash) {
            proof = proof.wrapping_add(1);
        }
        proof
    }

    /// Same minimal proof as [`ProofOfWork::solve`], searched across the rayon
    /// pool one ascending batch at a time. Returns `None` once `cancel` fires,
    /// checked at least once per batch.
    pub fn solve_cancellable(
        &self,
        last_proof: u64,
        reference_hash: &str,
        cancel: &CancelToken,
    ) -> Option<u64> {
        self.solve_batched(last_proof, reference_hash, cancel, SEARCH_BATCH)
    }

    fn solve_batched(
        &self,
        last_proof: u64,
        reference_hash: &str,
        cancel: &CancelToken,
        batch: u64,
    ) -> Option<u64> {
        let mut start = 0u64;
        loop {
            if cancel.is_cancelled() {
                return None;
            }
            let end = start.saturating_add(batch);
            // Batches are scanned in order, so the first hit is the minimum.
            let found = (start..end).into_par_iter().find_first(|proof| {
                cancel.is_cancelled() || self.is_valid(last_proof, *proof, reference_hash)
            });
            match found {
                Some(_) if cancel.is_cancelled() => return None,
                Some(proof) => return Some(proof),
                None if end == u64::MAX => return None,
                None => start = end,
            }
        }
    }
}

pub fn count_leading_zero_nibbles(hash: &Hash) -> u32 {
    let mut total = 0u32;
    for b in hash {
        if *b == 0 {
            total += 2;
        } else {
            if *b < 0x10 {
                total += 1;
            }
            break;
        }
    }
    total
}
