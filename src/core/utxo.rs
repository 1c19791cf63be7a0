//! Unspent transaction output set
//!
//! The authoritative map from `txid:index` to a spendable output. Entries are
//! removed permanently when spent; there are no tombstones.

use crate::core::amount::Amount;
use crate::core::error::LedgerError;
use crate::core::transaction::{OutPoint, Transaction, TransactionOutput};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Unspent Transaction Output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UTXO {
    pub tx_id: String,
    pub output_index: u32,
    pub output: TransactionOutput,
}

impl UTXO {
    pub fn outpoint(&self) -> OutPoint {
        OutPoint::new(&self.tx_id, self.output_index)
    }
}

/// The set of unspent outputs
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct UtxoSet {
    entries: HashMap<String, UTXO>,
}

impl UtxoSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new output. Re-adding a live key is an error.
    pub fn add(
        &mut self,
        tx_id: &str,
        output_index: u32,
        output: TransactionOutput,
    ) -> Result<(), LedgerError> {
        let outpoint = OutPoint::new(tx_id, output_index);
        let key = outpoint.key();
        if self.entries.contains_key(&key) {
            return Err(LedgerError::DuplicateOutput(outpoint));
        }
        self.entries.insert(
            key,
            UTXO {
                tx_id: tx_id.to_string(),
                output_index,
                output,
            },
        );
        Ok(())
    }

    /// Remove and return an output
    pub fn spend(&mut self, outpoint: &OutPoint) -> Result<TransactionOutput, LedgerError> {
        self.entries
            .remove(&outpoint.key())
            .map(|utxo| utxo.output)
            .ok_or_else(|| LedgerError::UnknownOutput(outpoint.clone()))
    }

    pub fn lookup(&self, outpoint: &OutPoint) -> Option<&TransactionOutput> {
        self.entries.get(&outpoint.key()).map(|utxo| &utxo.output)
    }

    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.entries.contains_key(&outpoint.key())
    }

    /// Lazily enumerate outputs owned by `account`, in no particular order
    pub fn select_by_account<'a>(
        &'a self,
        account: &'a str,
    ) -> impl Iterator<Item = (OutPoint, &'a TransactionOutput)> + 'a {
        self.entries
            .values()
            .filter(move |utxo| utxo.output.is_owned_by(account))
            .map(|utxo| (utxo.outpoint(), &utxo.output))
    }

    /// Sum of outputs owned by `account`
    pub fn balance(&self, account: &str) -> Amount {
        self.select_by_account(account)
            .fold(0u64, |acc, (_, output)| acc.saturating_add(output.amount))
    }

    /// Sum of every unspent output
    pub fn total_value(&self) -> Amount {
        self.entries
            .values()
            .fold(0u64, |acc, utxo| acc.saturating_add(utxo.output.amount))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UTXO> {
        self.entries.values()
    }

    /// Spend every input and add every output of `tx`, or change nothing.
    ///
    /// All preconditions are checked before the first mutation.
    pub fn apply_transaction(&mut self, tx: &Transaction) -> Result<(), LedgerError> {
        let mut seen = HashSet::with_capacity(tx.inputs.len());
        for input in &tx.inputs {
            let outpoint = input.outpoint();
            if !self.contains(&outpoint) {
                return Err(LedgerError::UnknownOutput(outpoint));
            }
            if !seen.insert(outpoint.key()) {
                return Err(LedgerError::DuplicateInput(outpoint));
            }
        }

        for index in 0..tx.outputs.len() {
            let outpoint = OutPoint::new(&tx.id, index as u32);
            if self.contains(&outpoint) {
                return Err(LedgerError::DuplicateOutput(outpoint));
            }
        }

        for input in &tx.inputs {
            self.spend(&input.outpoint())?;
        }
        for (index, output) in tx.outputs.iter().enumerate() {
            self.add(&tx.id, index as u32, output.clone())?;
        }
        Ok(())
    }
}
