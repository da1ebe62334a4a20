use crate::constants::{DEFAULT_LISTEN, NODE_ID_BYTES};
use anyhow::{Context, Result};
use clap::Parser;
use ledger_core::constants::{DEFAULT_DIFFICULTY, MAX_SOLVABLE_DIFFICULTY, PEER_TIMEOUT_SECS};
use rand::RngCore;
use std::{net::SocketAddr, time::Duration};

#[derive(Parser, Debug, Clone)]
#[command(name = "ledger-node")]
#[command(about = "Proof-of-work ledger node with longest-chain consensus")]
pub struct Args {
    /// Address to listen on, e.g. 127.0.0.1:5000
    #[arg(long, env = "LEDGER_LISTEN", default_value = DEFAULT_LISTEN)]
    pub listen: String,

    /// Leading zero hex digits a proof digest must carry
    #[arg(
        long,
        env = "LEDGER_DIFFICULTY",
        default_value_t = DEFAULT_DIFFICULTY,
        value_parser = clap::value_parser!(u32).range(0..=MAX_SOLVABLE_DIFFICULTY as i64)
    )]
    pub difficulty: u32,

    /// Identifier credited with mining rewards (random when omitted)
    #[arg(long, env = "LEDGER_NODE_ID")]
    pub node_id: Option<String>,

    /// Peer to register at startup; repeatable
    #[arg(long = "peer", env = "LEDGER_PEERS", value_delimiter = ',')]
    pub peers: Vec<String>,

    /// Per-peer timeout when fetching chains during resolution
    #[arg(long, env = "LEDGER_PEER_TIMEOUT_SECS", default_value_t = PEER_TIMEOUT_SECS)]
    pub peer_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub listen: SocketAddr,
    pub difficulty: u32,
    pub node_id: String,
    pub peers: Vec<String>,
    pub peer_timeout: Duration,
}

impl NodeConfig {
    /// Defaults suitable for a local node on `listen`.
    pub fn new(listen: SocketAddr) -> Self {
        Self {
            listen,
            difficulty: DEFAULT_DIFFICULTY,
            node_id: random_node_id(),
            peers: Vec::new(),
            peer_timeout: Duration::from_secs(PEER_TIMEOUT_SECS),
        }
    }
}

impl TryFrom<Args> for NodeConfig {
    type Error = anyhow::Error;

    fn try_from(args: Args) -> Result<Self> {
        let listen = args
            .listen
            .parse()
            .with_context(|| format!("invalid listen address {:?}", args.listen))?;
        Ok(Self {
            listen,
            difficulty: args.difficulty,
            node_id: args.node_id.unwrap_or_else(random_node_id),
            peers: args.peers,
            peer_timeout: Duration::from_secs(args.peer_timeout_secs),
        })
    }
}

pub fn random_node_id() -> String {
    let mut bytes = [0u8; NODE_ID_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
