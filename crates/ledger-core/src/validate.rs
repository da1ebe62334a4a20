use crate::{error::ValidationError, pow::ProofOfWork, Block};
use tracing::debug;

/// Structural and proof-of-work checks for chains received from peers.
///
/// A block's proof is checked against the fingerprint of the block it
/// extends, the same reference the miner searched against.
#[derive(Clone, Copy, Debug)]
pub struct ChainValidator {
    pow: ProofOfWork,
}

impl ChainValidator {
    pub fn new(pow: ProofOfWork) -> Self {
        Self { pow }
    }

    pub fn check_chain(&self, chain: &[Block]) -> Result<(), ValidationError> {
        let first = chain.first().ok_or(ValidationError::Empty)?;
        if !first.is_genesis() {
            return Err(ValidationError::BadGenesis);
        }

        for pair in chain.windows(2) {
            let (prev, block) = (&pair[0], &pair[1]);
            if block.index != prev.index + 1 {
                return Err(ValidationError::IndexGap {
                    index: block.index,
                    expected: prev.index + 1,
                });
            }
            let reference = prev.fingerprint();
            if block.previous_hash != reference {
                return Err(ValidationError::BrokenLink { index: block.index });
            }
            if !self.pow.is_valid(prev.proof, block.proof, &reference) {
                return Err(ValidationError::InvalidProof { index: block.index });
            }
        }
        Ok(())
    }

    pub fn is_valid_chain(&self, chain: &[Block]) -> bool {
        match self.check_chain(chain) {
            Ok(()) => true,
            Err(e) => {
                debug!(len = chain.len(), "chain rejected: {e}");
                false
            }
        }
    }
}
