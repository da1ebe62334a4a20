//! Node-wide state shared by every request handler.

use crate::{config::NodeConfig, peer_client::HttpPeerClient};
use ledger_core::{
    Block, CancelToken, ChainValidator, ConsensusResolver, Ledger, LedgerError, PeerRegistry,
    ProofOfWork, Transaction,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::{
    sync::{Mutex, RwLock},
    task::JoinError,
};
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum MineError {
    #[error("chain changed while mining: {0}")]
    Stale(LedgerError),
    #[error("mining was cancelled")]
    Cancelled,
    #[error("mining worker failed: {0}")]
    Worker(#[from] JoinError),
    #[error(transparent)]
    Ledger(LedgerError),
}

impl From<LedgerError> for MineError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::StaleTip { .. } => MineError::Stale(e),
            other => MineError::Ledger(other),
        }
    }
}

/// At most one proof search runs at a time; its token lets resolution
/// abandon a search whose tip was just replaced.
#[derive(Default)]
struct Miner {
    running: Mutex<()>,
    current: Mutex<Option<CancelToken>>,
}

#[derive(Clone)]
pub struct NodeState {
    ledger: Arc<RwLock<Ledger>>,
    peers: Arc<RwLock<PeerRegistry>>,
    resolver: Arc<ConsensusResolver<HttpPeerClient>>,
    miner: Arc<Miner>,
    pow: ProofOfWork,
    node_id: Arc<str>,
}

impl NodeState {
    pub fn new(config: &NodeConfig) -> anyhow::Result<Self> {
        let pow = ProofOfWork::new(config.difficulty);
        let client = HttpPeerClient::new(config.peer_timeout)?;

        let mut peers = PeerRegistry::new();
        for address in &config.peers {
            if let Err(e) = peers.register(address) {
                warn!("ignoring configured peer: {e}");
            }
        }

        Ok(Self {
            ledger: Arc::new(RwLock::new(Ledger::new(pow))),
            peers: Arc::new(RwLock::new(peers)),
            resolver: Arc::new(ConsensusResolver::new(client, ChainValidator::new(pow))),
            miner: Arc::new(Miner::default()),
            pow,
            node_id: Arc::from(config.node_id.as_str()),
        })
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn difficulty(&self) -> u32 {
        self.pow.difficulty()
    }

    pub async fn chain(&self) -> Vec<Block> {
        self.ledger.read().await.chain().to_vec()
    }

    pub async fn pending(&self) -> Vec<Transaction> {
        self.ledger.read().await.pending().to_vec()
    }

    pub async fn record_transaction(&self, tx: Transaction) -> u64 {
        self.ledger
            .write()
            .await
            .record_transaction(tx.sender, tx.recipient, tx.amount)
    }

    /// Search for the next proof on a blocking worker, then reward this node
    /// and seal the pending pool into a block.
    pub async fn mine(&self) -> Result<Block, MineError> {
        let _running = self.miner.running.lock().await;
        let job = self.ledger.read().await.mining_job()?;

        let token = CancelToken::new();
        *self.miner.current.lock().await = Some(token.clone());

        let pow = self.pow;
        let search = job.clone();
        let result = tokio::task::spawn_blocking(move || {
            pow.solve_cancellable(search.last_proof, &search.previous_hash, &token)
        })
        .await;
        self.miner.current.lock().await.take();

        let proof = result?.ok_or(MineError::Cancelled)?;
        let block = self
            .ledger
            .write()
            .await
            .forge(proof, &job.previous_hash, &self.node_id)?;
        Ok(block)
    }

    /// Abandon the running proof search, if any.
    pub async fn cancel_mining(&self) -> bool {
        match self.miner.current.lock().await.as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Register each address, skipping invalid ones; returns every known peer.
    pub async fn register_peers(&self, addresses: &[String]) -> Vec<String> {
        let mut peers = self.peers.write().await;
        for address in addresses {
            match peers.register(address) {
                Ok(location) => info!(peer = %location, "peer registered"),
                Err(e) => warn!("skipping peer: {e}"),
            }
        }
        peers.all().cloned().collect()
    }

    pub async fn peers(&self) -> Vec<String> {
        self.peers.read().await.all().cloned().collect()
    }

    /// Adopt the longest valid peer chain. Peers are queried without holding
    /// the ledger; the length is re-checked under the write lock.
    pub async fn resolve(&self) -> (bool, Vec<Block>) {
        let peers = self.peers().await;
        let local_len = self.ledger.read().await.len();
        let candidate = self.resolver.longest_valid_chain(&peers, local_len).await;

        let (replaced, chain) = {
            let mut ledger = self.ledger.write().await;
            let replaced = match candidate {
                Some(candidate) => {
                    info!(peer = %candidate.address, "adopting peer chain");
                    ledger.replace_chain(candidate.chain)
                }
                None => false,
            };
            (replaced, ledger.chain().to_vec())
        };

        if replaced && self.cancel_mining().await {
            info!("cancelled mining on a replaced tip");
        }
        (replaced, chain)
    }
}
