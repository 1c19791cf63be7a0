//! BitFuture Coin ledger: a single-node UTXO ledger engine in Rust
//!
//! This crate provides:
//! - ECDSA digital signatures (secp256k1) and base-58 account identifiers
//! - UTXO-based transactions with a canonical, proof-free identity
//! - Validation of ownership proofs and value conservation
//! - Greedy coin selection and a validated mempool
//! - Local block assembly with a halving subsidy schedule
//! - JSON snapshot persistence, an HTTP API and a CLI
//!
//! # Example
//!
//! ```rust
//! use bfc_ledger::core::{ChainParams, LedgerState};
//! use bfc_ledger::mining::BlockAssembler;
//! use bfc_ledger::wallet::Wallet;
//!
//! let mut ledger = LedgerState::genesis(ChainParams::default());
//! let alice = Wallet::new("BFC");
//! let bob = Wallet::new("BFC");
//!
//! // Mint a subsidy to alice
//! BlockAssembler::new(alice.address()).assemble(&mut ledger).unwrap();
//!
//! // Pay bob, leaving a fee for the next block
//! let tx = alice
//!     .create_transaction(&ledger.utxo, bob.address(), 1_000_000_000, 10_000)
//!     .unwrap();
//! ledger.submit_transaction(tx).unwrap();
//!
//! let (block, stats) = BlockAssembler::new(bob.address()).assemble(&mut ledger).unwrap();
//! assert_eq!(stats.total_fees, 10_000);
//! assert_eq!(ledger.balance(bob.address()), 1_000_000_000 + block.coinbase_amount);
//! ```

pub mod api;
pub mod cli;
pub mod core;
pub mod crypto;
pub mod mining;
pub mod storage;
pub mod wallet;

// Re-export commonly used types
pub use crate::api::{create_router, ApiConfig, ApiState};
pub use crate::core::{
    Block, ChainParams, LedgerError, LedgerState, OutPoint, Transaction, TransactionValidator,
    UtxoSet,
};
pub use crate::crypto::KeyPair;
pub use crate::mining::{BlockAssembler, Mempool};
pub use crate::storage::Storage;
pub use crate::wallet::{select_coins, Wallet, WalletManager};
