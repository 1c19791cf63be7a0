//! Wallet module for key custody, coin selection and payment construction

pub mod selector;
pub mod wallet;

pub use selector::{select_coins, CoinSelection};
pub use wallet::{Wallet, WalletError, WalletInfo, WalletManager};
