use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// `last_block` was read before genesis existed. Construction always
    /// creates genesis, so hitting this is a contract violation.
    #[error("chain is empty: genesis block was never created")]
    EmptyChain,
    #[error("invalid peer address: {0:?}")]
    InvalidAddress(String),
    #[error("stale tip: proof was found for {expected} but the tip is now {actual}")]
    StaleTip { expected: String, actual: String },
}

/// First reason a candidate chain was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("chain has no blocks")]
    Empty,
    #[error("first block is not a genesis block")]
    BadGenesis,
    #[error("block {index} breaks index contiguity (expected {expected})")]
    IndexGap { index: u64, expected: u64 },
    #[error("block {index} does not link to the fingerprint of its predecessor")]
    BrokenLink { index: u64 },
    #[error("block {index} carries a proof that fails the work check")]
    InvalidProof { index: u64 },
}

/// Failure to obtain a chain from a peer. Always skipped by the resolver.
#[derive(Debug, Error)]
pub enum PeerError {
    #[error("peer {0} unreachable: {1}")]
    Unreachable(String, String),
    #[error("peer {0} timed out")]
    Timeout(String),
    #[error("peer {0} answered with status {1}")]
    BadStatus(String, u16),
    #[error("peer {0} sent a malformed chain: {1}")]
    Malformed(String, String),
}
