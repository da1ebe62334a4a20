//! Longest-valid-chain conflict resolution against registered peers.

use crate::{
    chain::Ledger, error::PeerError, peers::PeerRegistry, validate::ChainValidator, Block,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{debug, info, warn};

/// What a peer's chain endpoint returns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerChain {
    pub length: usize,
    pub chain: Vec<Block>,
}

/// Outbound chain fetch. Implementations bound each call with a timeout and
/// map every failure to a [`PeerError`].
pub trait PeerClient: Send + Sync {
    fn fetch_chain(&self, address: &str)
        -> impl Future<Output = Result<PeerChain, PeerError>> + Send;
}

/// A peer chain that beat the local length and passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub address: String,
    pub chain: Vec<Block>,
}

pub struct ConsensusResolver<C> {
    client: C,
    validator: ChainValidator,
}

impl<C: PeerClient> ConsensusResolver<C> {
    pub fn new(client: C, validator: ChainValidator) -> Self {
        Self { client, validator }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Scan `peers` in order and keep the longest valid chain strictly longer
    /// than `local_len`. Among equal lengths the later peer wins.
    /// Unreachable or malformed peers are skipped.
    pub async fn longest_valid_chain<'a, I>(&self, peers: I, local_len: usize) -> Option<Candidate>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut best: Option<Candidate> = None;
        let mut max_len = local_len;

        for address in peers {
            let PeerChain { length, chain } = match self.client.fetch_chain(address).await {
                Ok(peer_chain) => peer_chain,
                Err(e) => {
                    warn!("skipping peer: {e}");
                    continue;
                }
            };
            if length != chain.len() {
                warn!(
                    peer = %address,
                    reported = length,
                    actual = chain.len(),
                    "skipping peer: length does not match chain"
                );
                continue;
            }

            let beats = match &best {
                // Later peers win ties among longer candidates.
                Some(_) => length >= max_len,
                None => length > max_len,
            };
            if beats && self.validator.is_valid_chain(&chain) {
                debug!(peer = %address, length, "longer valid chain found");
                max_len = length;
                best = Some(Candidate {
                    address: address.clone(),
                    chain,
                });
            }
        }
        best
    }

    /// Replace the ledger's chain with the longest valid peer chain, if any
    /// peer has one longer than ours. Returns whether the chain was replaced.
    pub async fn resolve_conflicts(&self, ledger: &mut Ledger, peers: &PeerRegistry) -> bool {
        match self.longest_valid_chain(peers.all(), ledger.len()).await {
            Some(candidate) => {
                info!(peer = %candidate.address, "adopting peer chain");
                ledger.replace_chain(candidate.chain)
            }
            None => false,
        }
    }
}
