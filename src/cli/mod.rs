//! Command-line interface handlers

pub mod commands;

pub use commands::{
    cmd_backup_list, cmd_backup_restore, cmd_init, cmd_mempool, cmd_mine, cmd_send, cmd_status, cmd_wallet_balance, cmd_wallet_list,
    cmd_wallet_new, AppState, CliResult, WALLETS_DIR,
};
