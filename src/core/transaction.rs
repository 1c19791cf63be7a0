//! Transaction handling for the ledger
//!
//! Implements a UTXO-based transaction model with digital signatures.
//!
//! A transaction's identity is the SHA-256 of its canonical encoding: the
//! ordered input references followed by the ordered outputs. Signatures and
//! public keys are not part of the encoding, so every input signs the same
//! digest and signing never changes the id.

use crate::core::amount::Amount;
use crate::core::error::LedgerError;
use crate::crypto::{sha256, KeyPair};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Out Point
// =============================================================================

/// Reference to an output of an earlier transaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutPoint {
    pub tx_id: String,
    pub output_index: u32,
}

impl OutPoint {
    pub fn new(tx_id: &str, output_index: u32) -> Self {
        Self {
            tx_id: tx_id.to_string(),
            output_index,
        }
    }

    /// Key used by the UTXO set (`txid:index`)
    pub fn key(&self) -> String {
        format!("{}:{}", self.tx_id, self.output_index)
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tx_id, self.output_index)
    }
}

// =============================================================================
// Transaction Input
// =============================================================================

/// Transaction input (reference to previous output)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionInput {
    /// Transaction ID of the previous transaction
    pub tx_id: String,
    /// Index of the output in the previous transaction
    pub output_index: u32,
    /// Hex-encoded compact ECDSA signature over the transaction id
    #[serde(default)]
    pub signature: String,
    /// Hex-encoded compressed public key of the spender
    #[serde(default)]
    pub public_key: String,
}

impl TransactionInput {
    /// Unsigned input spending `outpoint`
    pub fn new(outpoint: &OutPoint) -> Self {
        Self {
            tx_id: outpoint.tx_id.clone(),
            output_index: outpoint.output_index,
            signature: String::new(),
            public_key: String::new(),
        }
    }

    pub fn outpoint(&self) -> OutPoint {
        OutPoint::new(&self.tx_id, self.output_index)
    }

    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty() && !self.public_key.is_empty()
    }
}

// =============================================================================
// Transaction Output
// =============================================================================

/// Transaction output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionOutput {
    /// Receiving account identifier
    pub account: String,
    /// Amount in minor units
    pub amount: Amount,
}

impl TransactionOutput {
    pub fn new(account: &str, amount: Amount) -> Self {
        Self {
            account: account.to_string(),
            amount,
        }
    }

    /// Check if this output belongs to the given account
    pub fn is_owned_by(&self, account: &str) -> bool {
        self.account == account
    }
}

// =============================================================================
// Canonical encoding
// =============================================================================

fn put_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(bytes);
}

/// Canonical byte encoding of a transaction's economic content.
///
/// Layout (all integers little-endian):
/// `u32 n_inputs || (str tx_id, u32 index)* || u32 n_outputs || (str account, u64 amount)*`
/// where `str` is a `u32` length followed by UTF-8 bytes.
pub fn canonical_bytes(inputs: &[TransactionInput], outputs: &[TransactionOutput]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8 + inputs.len() * 72 + outputs.len() * 48);

    buf.extend_from_slice(&(inputs.len() as u32).to_le_bytes());
    for input in inputs {
        put_bytes(&mut buf, input.tx_id.as_bytes());
        buf.extend_from_slice(&input.output_index.to_le_bytes());
    }

    buf.extend_from_slice(&(outputs.len() as u32).to_le_bytes());
    for output in outputs {
        put_bytes(&mut buf, output.account.as_bytes());
        buf.extend_from_slice(&output.amount.to_le_bytes());
    }

    buf
}

/// Hex identity of `(inputs, outputs)`
pub fn identity(inputs: &[TransactionInput], outputs: &[TransactionOutput]) -> String {
    hex::encode(sha256(&canonical_bytes(inputs, outputs)))
}

// =============================================================================
// Transaction
// =============================================================================

/// A ledger transaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    /// Identity hash of the canonical encoding
    pub id: String,
    /// Transaction inputs
    pub inputs: Vec<TransactionInput>,
    /// Transaction outputs
    pub outputs: Vec<TransactionOutput>,
    /// Set only on coinbase transactions; keeps each block's mint unique
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coinbase_height: Option<u64>,
}

impl Transaction {
    /// Create a new transaction (unsigned)
    pub fn new(inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>) -> Self {
        let mut tx = Self {
            id: String::new(),
            inputs,
            outputs,
            coinbase_height: None,
        };
        tx.id = tx.calculate_hash();
        tx
    }

    /// Create a coinbase (minting) transaction for a block height
    pub fn coinbase(account: &str, amount: Amount, height: u64) -> Self {
        let mut tx = Self {
            id: String::new(),
            inputs: Vec::new(),
            outputs: vec![TransactionOutput::new(account, amount)],
            coinbase_height: Some(height),
        };
        tx.id = tx.calculate_hash();
        tx
    }

    pub fn is_coinbase(&self) -> bool {
        self.coinbase_height.is_some()
    }

    /// Canonical encoding; coinbase transactions append a height tag
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut buf = canonical_bytes(&self.inputs, &self.outputs);
        if let Some(height) = self.coinbase_height {
            buf.push(0x01);
            buf.extend_from_slice(&height.to_le_bytes());
        }
        buf
    }

    /// Calculate the transaction hash
    pub fn calculate_hash(&self) -> String {
        hex::encode(self.signing_data())
    }

    /// Digest signed by every input
    pub fn signing_data(&self) -> Vec<u8> {
        sha256(&self.canonical_bytes())
    }

    /// Recompute the id after any economic field changed
    pub fn refresh_id(&mut self) {
        self.id = self.calculate_hash();
    }

    /// Whether the stored id matches the content
    pub fn has_valid_id(&self) -> bool {
        self.id == self.calculate_hash()
    }

    /// Sign a single input with the provided key pair
    pub fn sign_input(&mut self, index: usize, key_pair: &KeyPair) -> Result<(), LedgerError> {
        let signing_data = self.signing_data();
        let input = self.inputs.get_mut(index).ok_or_else(|| {
            LedgerError::InvalidTransaction(format!("no input at index {}", index))
        })?;

        let signature = key_pair.sign(&signing_data)?;
        input.signature = hex::encode(signature);
        input.public_key = key_pair.public_key_hex();
        Ok(())
    }

    /// Sign all inputs with the provided key pair
    pub fn sign(&mut self, key_pair: &KeyPair) -> Result<(), LedgerError> {
        for index in 0..self.inputs.len() {
            self.sign_input(index, key_pair)?;
        }
        Ok(())
    }

    /// Sum of output amounts, `None` on overflow
    pub fn total_output(&self) -> Option<Amount> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, o| acc.checked_add(o.amount))
    }

    /// Stateless checks applied before anything is resolved against the UTXO set
    pub fn check_structure(&self) -> Result<(), LedgerError> {
        if self.is_coinbase() {
            return Err(LedgerError::InvalidTransaction(
                "coinbase transactions are created by block assembly only".to_string(),
            ));
        }
        if self.outputs.is_empty() {
            return Err(LedgerError::InvalidTransaction(
                "transaction has no outputs".to_string(),
            ));
        }
        if self.outputs.iter().any(|o| o.amount == 0) {
            return Err(LedgerError::InvalidTransaction(
                "zero-value output".to_string(),
            ));
        }
        if self.outputs.iter().any(|o| o.account.is_empty()) {
            return Err(LedgerError::InvalidTransaction(
                "output without account".to_string(),
            ));
        }
        if !self.has_valid_id() {
            return Err(LedgerError::InvalidTransaction(format!(
                "id {} does not match content",
                self.id
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Transaction Builder
// =============================================================================

/// Builder for creating transactions
#[derive(Default)]
pub struct TransactionBuilder {
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an input spending `outpoint`
    pub fn add_input(mut self, outpoint: &OutPoint) -> Self {
        self.inputs.push(TransactionInput::new(outpoint));
        self
    }

    /// Add an output
    pub fn add_output(mut self, account: &str, amount: Amount) -> Self {
        self.outputs.push(TransactionOutput::new(account, amount));
        self
    }

    /// Build and sign every input with one key
    pub fn build_and_sign(self, key_pair: &KeyPair) -> Result<Transaction, LedgerError> {
        let mut tx = self.build();
        tx.sign(key_pair)?;
        Ok(tx)
    }

    /// Build without signing
    pub fn build(self) -> Transaction {
        Transaction::new(self.inputs, self.outputs)
    }
}

// =============================================================================
// Tests
// =============================================================================
