//! Core ledger components
//!
//! This module contains the fundamental building blocks:
//! - Amounts (fixed-point minor units) and chain parameters
//! - Transactions (canonical encoding, identity, signing)
//! - The UTXO set and transaction validation
//! - Blocks and the owned ledger state

pub mod amount;
pub mod block;
pub mod error;
pub mod ledger;
pub mod params;
pub mod transaction;
pub mod utxo;
pub mod validation;

pub use amount::{
    coins_to_units, format_amount, parse_amount, unit_scale, Amount, AmountError, MAX_DECIMALS,
};
pub use block::{Block, BlockHeader, BLOCK_VERSION, DEFAULT_DIFFICULTY_TARGET};
pub use error::LedgerError;
pub use ledger::{LedgerState, LedgerStats};
pub use params::{ChainParams, ParamsError, PARAMS_FILE, SECONDS_PER_YEAR};
pub use transaction::{
    canonical_bytes, identity, OutPoint, Transaction, TransactionBuilder, TransactionInput,
    TransactionOutput,
};
pub use utxo::{UtxoSet, UTXO};
pub use validation::{compute_fee, TransactionValidator};
