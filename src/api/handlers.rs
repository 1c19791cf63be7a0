//! REST API handlers for ledger operations

use crate::core::{
    format_amount, parse_amount, Amount, AmountError, Block, LedgerError, LedgerState,
    Transaction,
};
use crate::mining::BlockAssembler;
use crate::storage::Storage;
use crate::wallet::{WalletInfo, WalletManager};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    /// Single writer lock over the whole ledger
    pub ledger: Arc<RwLock<LedgerState>>,
    pub storage: Arc<Storage>,
    pub wallet_manager: Arc<WalletManager>,
}

impl ApiState {
    pub fn new(ledger: LedgerState, storage: Storage, wallet_manager: WalletManager) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            storage: Arc::new(storage),
            wallet_manager: Arc::new(wallet_manager),
        }
    }
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct BalanceResponse {
    pub address: String,
    /// Spendable minor units
    pub balance: Amount,
    /// Coinbase credits in minor units
    pub mined: Amount,
    pub formatted: String,
    pub utxo_count: usize,
}

#[derive(Serialize)]
pub struct WalletResponse {
    pub address: String,
    pub public_key: String,
    pub label: Option<String>,
}

#[derive(Serialize)]
pub struct SendResponse {
    pub tx_id: String,
    pub inputs: usize,
    pub outputs: usize,
    pub fee: Amount,
}

#[derive(Serialize)]
pub struct MineResponse {
    pub status: &'static str,
    pub height: u64,
    pub hash: String,
    pub reward: Amount,
    pub transactions: usize,
    pub dropped: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ApiError {
    pub error: String,
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct BalanceQuery {
    pub address: Option<String>,
}

/// Amount in coins: a decimal string, or a JSON integer of whole coins.
///
/// Fractional JSON numbers arrive as `f64` and are refused rather than
/// rounded; send them as strings.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum AmountField {
    Number(serde_json::Number),
    Text(String),
}

impl AmountField {
    fn to_units(&self, decimals: u32) -> Result<Amount, AmountError> {
        match self {
            AmountField::Number(n) => match n.as_u64() {
                Some(coins) => parse_amount(&coins.to_string(), decimals),
                None => Err(AmountError::Invalid(format!(
                    "{} (fractional amounts must be quoted strings)",
                    n
                ))),
            },
            AmountField::Text(s) => parse_amount(s, decimals),
        }
    }
}

#[derive(Deserialize)]
pub struct SendRequest {
    pub from: String,
    pub to: String,
    pub amount: AmountField,
    pub fee: Option<AmountField>,
}

#[derive(Deserialize, Default)]
pub struct MineRequest {
    pub address: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct CreateWalletRequest {
    pub label: Option<String>,
}

// ============================================================================
// Error mapping
// ============================================================================

/// HTTP status for a ledger error
pub fn status_for(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        e if !e.is_rejection() => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        status,
        Json(ApiError {
            error: message.into(),
        }),
    )
}

fn ledger_error(err: LedgerError) -> (StatusCode, Json<ApiError>) {
    let status = status_for(&err);
    if status.is_server_error() {
        log::error!("Request failed: {}", err);
    }
    api_error(status, err.to_string())
}

/// Optional JSON body: an empty body means all defaults
fn optional_json<T: for<'de> Deserialize<'de> + Default>(body: &Bytes) -> ApiResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("bad json: {}", e)))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}

/// GET /status - Current tip
pub async fn get_status(State(state): State<ApiState>) -> Json<Block> {
    let ledger = state.ledger.read().await;
    Json(ledger.tip.clone())
}

/// GET /balance?address= - Spendable balance and mined credits
pub async fn get_balance(
    State(state): State<ApiState>,
    Query(query): Query<BalanceQuery>,
) -> ApiResult<Json<BalanceResponse>> {
    let address = match query.address.filter(|a| !a.is_empty()) {
        Some(address) => address,
        None => return Err(api_error(StatusCode::BAD_REQUEST, "address required")),
    };

    let ledger = state.ledger.read().await;
    let balance = ledger.balance(&address);
    Ok(Json(BalanceResponse {
        balance,
        mined: ledger.mined_balance(&address),
        formatted: format_amount(balance, ledger.params.decimals),
        utxo_count: ledger.utxo.select_by_account(&address).count(),
        address,
    }))
}

/// GET /mempool - Pending transactions in arrival order
pub async fn get_mempool(State(state): State<ApiState>) -> Json<Vec<Transaction>> {
    let ledger = state.ledger.read().await;
    Json(ledger.mempool.transactions().to_vec())
}

/// POST /wallet/new - Create a wallet
pub async fn create_wallet(
    State(state): State<ApiState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<WalletResponse>)> {
    let req: CreateWalletRequest = optional_json(&body)?;

    match state.wallet_manager.create_wallet(req.label.as_deref()) {
        Ok(wallet) => Ok((
            StatusCode::CREATED,
            Json(WalletResponse {
                address: wallet.address().to_string(),
                public_key: wallet.public_key(),
                label: wallet.label,
            }),
        )),
        Err(e) => Err(ledger_error(e.into())),
    }
}

/// GET /wallet/list - Public wallet information
pub async fn list_wallets(State(state): State<ApiState>) -> ApiResult<Json<Vec<WalletInfo>>> {
    state
        .wallet_manager
        .list_wallets()
        .map(Json)
        .map_err(|e| ledger_error(e.into()))
}

/// POST /tx/send - Build, sign and queue a payment
pub async fn send_transaction(
    State(state): State<ApiState>,
    Json(req): Json<SendRequest>,
) -> ApiResult<(StatusCode, Json<SendResponse>)> {
    if req.from.is_empty() || req.to.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "from, to, amount required"));
    }

    let wallet = state
        .wallet_manager
        .load_wallet(&req.from)
        .map_err(|e| ledger_error(e.into()))?;

    let mut ledger = state.ledger.write().await;
    let decimals = ledger.params.decimals;
    let bad_amount = |e: AmountError| api_error(StatusCode::BAD_REQUEST, e.to_string());
    let amount = req.amount.to_units(decimals).map_err(bad_amount)?;
    let fee = match &req.fee {
        Some(fee) => fee.to_units(decimals).map_err(bad_amount)?,
        None => 0,
    };

    let (tx, fee) = state
        .storage
        .commit(&mut ledger, |s| {
            let tx = wallet.create_transaction(&s.utxo, &req.to, amount, fee)?;
            let fee = s.submit_transaction(tx.clone())?;
            Ok((tx, fee))
        })
        .map_err(ledger_error)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SendResponse {
            tx_id: tx.id,
            inputs: tx.inputs.len(),
            outputs: tx.outputs.len(),
            fee,
        }),
    ))
}

/// POST /mine - Assemble one block
pub async fn mine_block(State(state): State<ApiState>, body: Bytes) -> ApiResult<Json<MineResponse>> {
    let req: MineRequest = optional_json(&body)?;

    let miner = match req.address.filter(|a| !a.is_empty()) {
        Some(address) => address,
        None => state
            .wallet_manager
            .default_address()
            .map_err(|e| ledger_error(e.into()))?
            .ok_or_else(|| {
                api_error(
                    StatusCode::BAD_REQUEST,
                    "no miner address provided and wallet empty; create a wallet first",
                )
            })?,
    };

    let mut ledger = state.ledger.write().await;
    let (block, stats) = state
        .storage
        .commit(&mut ledger, |s| BlockAssembler::new(&miner).assemble(s))
        .map_err(ledger_error)?;

    Ok(Json(MineResponse {
        status: "mined",
        height: block.height,
        hash: block.hash.clone(),
        reward: block.coinbase_amount,
        transactions: stats.included,
        dropped: stats.rejected.into_iter().map(|r| r.tx_id).collect(),
    }))
}
