use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Number;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "CLI client for the proof-of-work ledger node")]
struct Cli {
    /// Node base URL (e.g. http://127.0.0.1:5000)
    #[arg(long, global = true, env = "LEDGER_NODE", default_value = "http://127.0.0.1:5000")]
    node: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the node's full chain
    Chain,
    /// Mine a block on the node
    Mine,
    /// Submit a transaction
    Submit {
        /// Sender
        #[arg(long)]
        sender: String,
        /// Recipient
        #[arg(long)]
        recipient: String,
        /// Amount; any JSON number, e.g. 2.5 or -3
        #[arg(long, allow_negative_numbers = true)]
        amount: Number,
    },
    /// Show transactions waiting for the next block
    Pending,
    /// Register peers with the node
    Register {
        /// Peer addresses (host:port or URL)
        #[arg(required = true)]
        nodes: Vec<String>,
    },
    /// Ask the node to adopt the longest valid peer chain
    Resolve,
}

#[derive(Serialize)]
struct Tx {
    sender: String,
    recipient: String,
    amount: Number,
}

#[derive(Serialize)]
struct Nodes {
    nodes: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    let node = cli.node.trim_end_matches('/');
    let client = reqwest::Client::new();

    let req = match cli.cmd {
        Command::Chain => client.get(format!("{node}/chain")),
        Command::Mine => client.get(format!("{node}/mine")),
        Command::Pending => client.get(format!("{node}/transactions/pending")),
        Command::Resolve => client.get(format!("{node}/nodes/resolve")),
        Command::Submit {
            sender,
            recipient,
            amount,
        } => client
            .post(format!("{node}/transactions/new"))
            .json(&Tx {
                sender,
                recipient,
                amount,
            }),
        Command::Register { nodes } => client
            .post(format!("{node}/nodes/register"))
            .json(&Nodes { nodes }),
    };

    let res = req.send().await?;
    let status = res.status();
    let body = res.text().await?;
    debug!(%status, "response received");

    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{body}"),
    }
    if !status.is_success() {
        bail!("node answered with status {status}");
    }
    Ok(())
}
