//! Transaction pool (mempool) for pending transactions
//!
//! An arrival-ordered queue of transactions that passed validation against
//! the UTXO set at admission time. Queued transactions are not checked
//! against each other; conflicts surface during block assembly.

use crate::core::{Amount, LedgerError, Transaction, TransactionValidator, UtxoSet};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Memory pool for pending transactions
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Mempool {
    transactions: Vec<Transaction>,
}

impl Mempool {
    /// Create a new mempool
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `tx` against `utxo` and queue it. Returns the fee.
    pub fn admit(
        &mut self,
        tx: Transaction,
        utxo: &UtxoSet,
        ticker: &str,
    ) -> Result<Amount, LedgerError> {
        if self.contains(&tx.id) {
            return Err(LedgerError::DuplicateTransaction(tx.id));
        }

        let fee = TransactionValidator::new(utxo, ticker).validate(&tx)?;
        debug!(
            "Transaction {} validated: {} inputs, {} outputs",
            tx.id,
            tx.inputs.len(),
            tx.outputs.len()
        );

        info!("Admitted transaction {} (fee {})", tx.id, fee);
        self.transactions.push(tx);
        Ok(fee)
    }

    /// Remove and return every queued transaction in arrival order
    pub fn drain_all(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.transactions)
    }

    /// Get a transaction by ID
    pub fn get_transaction(&self, tx_id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.id == tx_id)
    }

    /// Check if transaction exists in pool
    pub fn contains(&self, tx_id: &str) -> bool {
        self.get_transaction(tx_id).is_some()
    }

    /// Queued transactions in arrival order
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Get the number of pending transactions
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Check if pool is empty
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
