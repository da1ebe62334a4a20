pub mod api;
pub mod config;
mod constants;
pub mod peer_client;
pub mod state;

use anyhow::Result;
use std::{future::Future, io};
use tokio::net::TcpListener;
use tracing::{info, warn};

pub use config::{Args, NodeConfig};
pub use state::NodeState;

/// Serve the node's routes on an already-bound listener until the task is
/// dropped or ctrl-c arrives.
pub async fn serve(listener: TcpListener, state: NodeState) -> Result<()> {
    info!(
        node_id = state.node_id(),
        difficulty = state.difficulty(),
        "ledger-node listening on http://{}",
        listener.local_addr()?
    );
    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(until_signal(tokio::signal::ctrl_c()))
        .await?;
    Ok(())
}

/// Resolves once `signal` fires. If the listener cannot be installed the
/// server keeps running without graceful shutdown.
async fn until_signal(signal: impl Future<Output = io::Result<()>>) {
    match signal.await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => {
            warn!("cannot listen for ctrl-c, graceful shutdown disabled: {e}");
            std::future::pending::<()>().await;
        }
    }
}
