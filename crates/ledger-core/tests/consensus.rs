use std::{collections::HashMap, time::Duration};

use ledger_core::{
    Block, ChainValidator, ConsensusResolver, Ledger, PeerChain, PeerClient, PeerError,
    PeerRegistry, ProofOfWork,
};

const DIFFICULTY: u32 = 2;

enum Reply {
    Chain(Vec<Block>),
    /// Claims a different length than the chain it carries.
    Lying(usize, Vec<Block>),
    Timeout,
}

/// In-memory stand-in for the HTTP peer client.
#[derive(Default)]
struct FakePeers {
    replies: HashMap<String, Reply>,
}

impl FakePeers {
    fn with(mut self, address: &str, reply: Reply) -> Self {
        self.replies.insert(address.to_string(), reply);
        self
    }
}

impl PeerClient for FakePeers {
    async fn fetch_chain(&self, address: &str) -> Result<PeerChain, PeerError> {
        match self.replies.get(address) {
            Some(Reply::Chain(chain)) => Ok(PeerChain {
                length: chain.len(),
                chain: chain.clone(),
            }),
            Some(Reply::Lying(length, chain)) => Ok(PeerChain {
                length: *length,
                chain: chain.clone(),
            }),
            Some(Reply::Timeout) => {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Err(PeerError::Timeout(address.to_string()))
            }
            None => Err(PeerError::Unreachable(
                address.to_string(),
                "connection refused".into(),
            )),
        }
    }
}

fn pow() -> ProofOfWork {
    ProofOfWork::new(DIFFICULTY)
}

fn mined_ledger(len: usize, miner: &str) -> Ledger {
    let mut ledger = Ledger::new(pow());
    while ledger.len() < len {
        ledger.record_transaction("alice", miner, ledger.len() as u64);
        ledger.mine_next(miner).expect("mine");
    }
    ledger
}

fn chain_of(len: usize, miner: &str) -> Vec<Block> {
    mined_ledger(len, miner).chain().to_vec()
}

fn registry(addresses: &[&str]) -> PeerRegistry {
    let mut peers = PeerRegistry::new();
    for addr in addresses {
        peers.register(addr).expect("valid address");
    }
    peers
}

fn resolver(client: FakePeers) -> ConsensusResolver<FakePeers> {
    ConsensusResolver::new(client, ChainValidator::new(pow()))
}

#[tokio::test]
async fn adopts_longest_of_several_longer_chains() {
    let five = chain_of(5, "five");
    let client = FakePeers::default()
        .with("a:1", Reply::Chain(five.clone()))
        .with("b:2", Reply::Chain(chain_of(4, "four")));
    let mut local = mined_ledger(3, "local");

    let replaced = resolver(client)
        .resolve_conflicts(&mut local, &registry(&["a:1", "b:2"]))
        .await;

    assert!(replaced);
    assert_eq!(local.chain(), five.as_slice());
}

#[tokio::test]
async fn keeps_local_chain_when_peers_are_not_longer() {
    let client = FakePeers::default()
        .with("a:1", Reply::Chain(chain_of(2, "two")))
        .with("b:2", Reply::Chain(chain_of(3, "three")));
    let mut local = mined_ledger(3, "local");
    let before = local.chain().to_vec();

    let replaced = resolver(client)
        .resolve_conflicts(&mut local, &registry(&["a:1", "b:2"]))
        .await;

    assert!(!replaced);
    assert_eq!(local.chain(), before.as_slice());
}

#[tokio::test]
async fn tolerates_unreachable_and_timed_out_peers() {
    let longer = chain_of(4, "peer");
    let client = FakePeers::default()
        .with("slow:1", Reply::Timeout)
        .with("good:2", Reply::Chain(longer.clone()));
    let mut local = mined_ledger(2, "local");

    let replaced = resolver(client)
        .resolve_conflicts(&mut local, &registry(&["slow:1", "good:2", "gone:3"]))
        .await;

    assert!(replaced);
    assert_eq!(local.chain(), longer.as_slice());
}

#[tokio::test]
async fn ignores_longer_but_invalid_chain() {
    let mut forged = chain_of(6, "forger");
    forged[2].transactions[0].amount = 1_000_000u64.into();
    let honest = chain_of(4, "honest");
    let client = FakePeers::default()
        .with("a:1", Reply::Chain(forged))
        .with("b:2", Reply::Chain(honest.clone()));
    let mut local = mined_ledger(2, "local");

    assert!(
        resolver(client)
            .resolve_conflicts(&mut local, &registry(&["a:1", "b:2"]))
            .await
    );
    assert_eq!(local.chain(), honest.as_slice());
}

#[tokio::test]
async fn rejects_chain_mined_at_lower_difficulty() {
    let mut easy = Ledger::new(ProofOfWork::new(0));
    for _ in 0..5 {
        easy.mine_next("cheap").expect("mine");
    }
    let client = FakePeers::default().with("a:1", Reply::Chain(easy.chain().to_vec()));
    let mut local = mined_ledger(2, "local");

    assert!(
        !resolver(client)
            .resolve_conflicts(&mut local, &registry(&["a:1"]))
            .await
    );
    assert_eq!(local.len(), 2);
}

#[tokio::test]
async fn skips_peer_misreporting_length() {
    let client = FakePeers::default().with("a:1", Reply::Lying(9, chain_of(2, "liar")));
    let mut local = mined_ledger(2, "local");

    assert!(
        !resolver(client)
            .resolve_conflicts(&mut local, &registry(&["a:1"]))
            .await
    );
}

#[tokio::test]
async fn equal_length_candidates_favor_later_peer() {
    let first = chain_of(4, "first");
    let second = chain_of(4, "second");
    let client = FakePeers::default()
        .with("a:1", Reply::Chain(first))
        .with("b:2", Reply::Chain(second.clone()));

    let candidate = resolver(client)
        .longest_valid_chain(registry(&["b:2", "a:1"]).all(), 2)
        .await
        .expect("candidate");

    assert_eq!(candidate.address, "b:2");
    assert_eq!(candidate.chain, second);
}

#[tokio::test]
async fn no_peers_means_no_replacement() {
    let mut local = mined_ledger(1, "local");
    assert!(
        !resolver(FakePeers::default())
            .resolve_conflicts(&mut local, &PeerRegistry::new())
            .await
    );
    assert_eq!(local.len(), 1);
}
