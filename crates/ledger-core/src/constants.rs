pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
/// Highest difficulty expressible as leading zero hex digits of a digest.
pub const MAX_DIFFICULTY: u32 = HASH_HEX_SIZE as u32;
/// Highest difficulty a node will mine at. A `u64` proof spans 16^16
/// candidates, so stricter targets are not expected to have any solution.
pub const MAX_SOLVABLE_DIFFICULTY: u32 = 16;
pub const DEFAULT_DIFFICULTY: u32 = 4;
pub const GENESIS_PROOF: u64 = 100;
pub const GENESIS_PREVIOUS_HASH: &str = "1";
pub const MINING_REWARD: u64 = 1;
/// Sender recorded on reward transactions: coins minted by mining, not transferred.
pub const REWARD_SENDER: &str = "0";
pub const PEER_TIMEOUT_SECS: u64 = 5;
