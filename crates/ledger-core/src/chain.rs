//! The node's own chain and pending-transaction pool.

use crate::{
    constants::{GENESIS_PREVIOUS_HASH, GENESIS_PROOF, MINING_REWARD, REWARD_SENDER},
    error::LedgerError,
    pow::ProofOfWork,
    Amount, Block, Transaction,
};
use tracing::{debug, info};

/// Tip snapshot handed to a miner so the search can run without holding
/// the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MiningJob {
    pub last_proof: u64,
    pub previous_hash: String,
}

impl MiningJob {
    pub fn solve(&self, pow: &ProofOfWork) -> u64 {
        pow.solve(self.last_proof, &self.previous_hash)
    }
}

#[derive(Clone, Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    pow: ProofOfWork,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(ProofOfWork::default())
    }
}

impl Ledger {
    /// A ledger holding only the genesis block and an empty pool.
    pub fn new(pow: ProofOfWork) -> Self {
        let mut ledger = Self {
            chain: Vec::new(),
            pending: Vec::new(),
            pow,
        };
        ledger.genesis();
        ledger
    }

    fn genesis(&mut self) {
        self.mine_block(GENESIS_PROOF, GENESIS_PREVIOUS_HASH);
    }

    pub fn pow(&self) -> ProofOfWork {
        self.pow
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn last_block(&self) -> Result<&Block, LedgerError> {
        self.chain.last().ok_or(LedgerError::EmptyChain)
    }

    fn next_index(&self) -> u64 {
        self.chain.last().map_or(1, |b| b.index + 1)
    }

    /// Queue a transaction; returns the index of the block it will land in.
    pub fn record_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<Amount>,
    ) -> u64 {
        let tx = Transaction::new(sender, recipient, amount);
        debug!(
            sender = %tx.sender,
            recipient = %tx.recipient,
            amount = %tx.amount,
            "transaction queued"
        );
        self.pending.push(tx);
        self.next_index()
    }

    /// Seal the pending pool into a new block on top of the chain. The proof
    /// is taken as given; the ledger does not check its own writes.
    pub fn mine_block(&mut self, proof: u64, previous_hash: impl Into<String>) -> Block {
        let block = Block::new(
            self.next_index(),
            std::mem::take(&mut self.pending),
            proof,
            previous_hash,
        );
        self.chain.push(block.clone());
        block
    }

    pub fn mining_job(&self) -> Result<MiningJob, LedgerError> {
        let last = self.last_block()?;
        Ok(MiningJob {
            last_proof: last.proof,
            previous_hash: last.fingerprint(),
        })
    }

    /// Reward `miner` and seal a block for a proof found against
    /// `previous_hash`. Fails when the tip moved during the search.
    pub fn forge(
        &mut self,
        proof: u64,
        previous_hash: &str,
        miner: &str,
    ) -> Result<Block, LedgerError> {
        let actual = self.last_block()?.fingerprint();
        if actual != previous_hash {
            return Err(LedgerError::StaleTip {
                expected: previous_hash.to_string(),
                actual,
            });
        }
        self.record_transaction(REWARD_SENDER, miner, MINING_REWARD);
        let block = self.mine_block(proof, previous_hash);
        info!(index = block.index, proof, "new block forged");
        Ok(block)
    }

    /// Solve against the current tip and forge in one step.
    pub fn mine_next(&mut self, miner: &str) -> Result<Block, LedgerError> {
        let job = self.mining_job()?;
        let proof = job.solve(&self.pow);
        self.forge(proof, &job.previous_hash, miner)
    }

    /// Adopt `candidate` if it is strictly longer than the current chain.
    /// Validity is the caller's concern.
    pub fn replace_chain(&mut self, candidate: Vec<Block>) -> bool {
        if candidate.len() <= self.chain.len() {
            return false;
        }
        info!(old = self.chain.len(), new = candidate.len(), "chain replaced");
        self.chain = candidate;
        true
    }
}
