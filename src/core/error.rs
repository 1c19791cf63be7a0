//! Ledger error taxonomy

use crate::core::amount::Amount;
use crate::core::transaction::OutPoint;
use crate::crypto::KeyError;
use crate::storage::StorageError;
use thiserror::Error;

/// Errors produced by ledger operations.
///
/// Validation errors leave the ledger untouched; callers may retry with a
/// corrected transaction.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Input {index} references missing output {outpoint}")]
    MissingInput { index: usize, outpoint: OutPoint },
    #[error("Unknown output {0}")]
    UnknownOutput(OutPoint),
    #[error("Invalid signature for input {0}")]
    BadSignature(usize),
    #[error("Input {index} is owned by {owner}, but its key belongs to {derived}")]
    OwnershipMismatch {
        index: usize,
        owner: String,
        derived: String,
    },
    #[error("Outputs ({outputs}) exceed inputs ({inputs})")]
    ValueOverrun { inputs: Amount, outputs: Amount },
    #[error("Insufficient funds: have {have}, need {need}")]
    InsufficientFunds { have: Amount, need: Amount },
    #[error("Persistence failure: {0}")]
    PersistenceFailure(#[from] StorageError),
    #[error("No signing key for account {0}")]
    KeyNotFound(String),
    #[error("Key store error: {0}")]
    KeyStore(String),
    #[error("Output {0} is spent twice by the same transaction")]
    DuplicateInput(OutPoint),
    #[error("Output {0} already exists")]
    DuplicateOutput(OutPoint),
    #[error("Transaction {0} is already queued")]
    DuplicateTransaction(String),
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
    #[error("Amount overflow")]
    AmountOverflow,
    #[error("Crypto error: {0}")]
    Crypto(#[from] KeyError),
}

impl LedgerError {
    /// Whether the caller supplied something the ledger rejects, as opposed to
    /// an internal failure.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            LedgerError::PersistenceFailure(_)
                | LedgerError::KeyStore(_)
                | LedgerError::Crypto(_)
        )
    }
}
