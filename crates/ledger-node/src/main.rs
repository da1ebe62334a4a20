use clap::Parser;
use ledger_node::{serve, Args, NodeConfig, NodeState};
use tokio::net::TcpListener;
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = NodeConfig::try_from(Args::parse())?;
    let state = NodeState::new(&config)?;
    let listener = TcpListener::bind(config.listen).await?;
    serve(listener, state).await
}
