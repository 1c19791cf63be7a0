//! REST API module
//!
//! Exposes ledger operations over HTTP. Errors are JSON `{"error": ...}`;
//! rejected requests map to 4xx, internal failures to 500.
//!
//! # Endpoints
//!
//! - `GET /health` - Liveness
//! - `GET /status` - Current tip block
//! - `GET /balance?address=` - Spendable balance and mined credits
//! - `GET /mempool` - Pending transactions
//! - `POST /wallet/new` - Create wallet (201)
//! - `GET /wallet/list` - List wallets
//! - `POST /tx/send` - Queue a payment `{from, to, amount, fee?}` (202)
//! - `POST /mine` - Assemble a block `{address?}`

pub mod handlers;
pub mod routes;

pub use handlers::ApiState;
pub use routes::{create_router, ApiConfig, DEFAULT_LISTEN};
