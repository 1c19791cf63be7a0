//! REST API routes configuration

use crate::api::handlers::{self, ApiState};
use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

/// Default listen address
pub const DEFAULT_LISTEN: &str = ":18444";

/// HTTP service configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `host:port`, or `:port` for all interfaces
    pub listen: String,
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ApiConfig {
    /// Address suitable for binding a listener
    pub fn bind_addr(&self) -> String {
        if self.listen.starts_with(':') {
            format!("0.0.0.0{}", self.listen)
        } else {
            self.listen.clone()
        }
    }
}

/// Create the API router with all routes
pub fn create_router(state: ApiState, config: &ApiConfig) -> Router {
    // Configure CORS for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        // Ledger queries
        .route("/status", get(handlers::get_status))
        .route("/balance", get(handlers::get_balance))
        .route("/mempool", get(handlers::get_mempool))
        // Wallets
        .route("/wallet/new", post(handlers::create_wallet))
        .route("/wallet/list", get(handlers::list_wallets))
        // Mutations
        .route("/tx/send", post(handlers::send_transaction))
        .route("/mine", post(handlers::mine_block))
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(cors)
}
