//! HTTP routes exposing the ledger.

use crate::state::{MineError, NodeState};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use ledger_core::{Amount, Block, Transaction};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

type ApiResult<T> = Result<(StatusCode, Json<T>), (StatusCode, Json<ApiError>)>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

fn api_error(status: StatusCode, error: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (status, Json(ApiError { error: error.into() }))
}

fn malformed(rejection: JsonRejection) -> (StatusCode, Json<ApiError>) {
    api_error(StatusCode::BAD_REQUEST, rejection.body_text())
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MineResponse {
    pub message: String,
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

#[derive(Debug, Deserialize)]
pub struct TxIn {
    pub sender: String,
    pub recipient: String,
    pub amount: Amount,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TxAccepted {
    pub message: String,
    pub index: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PendingResponse {
    pub transactions: Vec<Transaction>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChainResponse {
    pub chain: Vec<Block>,
    pub length: usize,
}

#[derive(Debug, Deserialize)]
pub struct RegisterIn {
    pub nodes: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub total_nodes: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub message: String,
    pub replaced: bool,
    pub chain: Vec<Block>,
}

pub fn router(state: NodeState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(Health { status: "ok" }) }))
        .route("/mine", get(mine))
        .route("/transactions/new", post(new_transaction))
        .route("/transactions/pending", get(pending))
        .route("/chain", get(full_chain))
        .route("/nodes/register", post(register_nodes))
        .route("/nodes/resolve", get(consensus))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn mine(State(state): State<NodeState>) -> ApiResult<MineResponse> {
    let block = state.mine().await.map_err(|e| {
        warn!("mining failed: {e}");
        match e {
            MineError::Stale(_) => api_error(StatusCode::CONFLICT, e.to_string()),
            MineError::Cancelled => api_error(StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
            MineError::Worker(_) | MineError::Ledger(_) => {
                api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    })?;

    Ok((
        StatusCode::OK,
        Json(MineResponse {
            message: "New Block Forged".into(),
            index: block.index,
            transactions: block.transactions,
            proof: block.proof,
            previous_hash: block.previous_hash,
        }),
    ))
}

async fn new_transaction(
    State(state): State<NodeState>,
    body: Result<Json<TxIn>, JsonRejection>,
) -> ApiResult<TxAccepted> {
    let Json(tx) = body.map_err(malformed)?;
    let index = state
        .record_transaction(Transaction::new(tx.sender, tx.recipient, tx.amount))
        .await;
    Ok((
        StatusCode::CREATED,
        Json(TxAccepted {
            message: format!("Transaction will be added to Block {index}"),
            index,
        }),
    ))
}

async fn pending(State(state): State<NodeState>) -> Json<PendingResponse> {
    let transactions = state.pending().await;
    Json(PendingResponse {
        count: transactions.len(),
        transactions,
    })
}

async fn full_chain(State(state): State<NodeState>) -> Json<ChainResponse> {
    let chain = state.chain().await;
    Json(ChainResponse {
        length: chain.len(),
        chain,
    })
}

async fn register_nodes(
    State(state): State<NodeState>,
    body: Result<Json<RegisterIn>, JsonRejection>,
) -> ApiResult<RegisterResponse> {
    let Json(input) = body.map_err(malformed)?;
    let total_nodes = state.register_peers(&input.nodes).await;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "New nodes have been added".into(),
            total_nodes,
        }),
    ))
}

async fn consensus(State(state): State<NodeState>) -> Json<ResolveResponse> {
    let (replaced, chain) = state.resolve().await;
    let message = if replaced {
        "Our chain was replaced"
    } else {
        "Our chain is authoritative"
    };
    Json(ResolveResponse {
        message: message.into(),
        replaced,
        chain,
    })
}
