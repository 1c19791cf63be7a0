//! Transaction validation against a UTXO snapshot
//!
//! Validation is a pure predicate: it reads the UTXO set and never mutates it.

use crate::core::amount::Amount;
use crate::core::error::LedgerError;
use crate::core::transaction::{Transaction, TransactionInput};
use crate::core::utxo::UtxoSet;
use crate::crypto::{derive_address, public_key_from_hex, verify_signature};
use log::debug;
use std::collections::HashSet;

/// Checks ownership proofs and value conservation
pub struct TransactionValidator<'a> {
    utxo: &'a UtxoSet,
    ticker: &'a str,
}

impl<'a> TransactionValidator<'a> {
    pub fn new(utxo: &'a UtxoSet, ticker: &'a str) -> Self {
        Self { utxo, ticker }
    }

    /// Validate `tx` and return its implicit fee
    pub fn validate(&self, tx: &Transaction) -> Result<Amount, LedgerError> {
        tx.check_structure()?;

        let digest = tx.signing_data();
        let mut seen = HashSet::with_capacity(tx.inputs.len());
        let mut input_total: Amount = 0;

        for (index, input) in tx.inputs.iter().enumerate() {
            let outpoint = input.outpoint();
            let resolved = self
                .utxo
                .lookup(&outpoint)
                .ok_or_else(|| LedgerError::MissingInput {
                    index,
                    outpoint: outpoint.clone(),
                })?;

            if !seen.insert(outpoint.key()) {
                return Err(LedgerError::DuplicateInput(outpoint));
            }

            let derived = self.verify_proof(index, input, &digest)?;
            if derived != resolved.account {
                return Err(LedgerError::OwnershipMismatch {
                    index,
                    owner: resolved.account.clone(),
                    derived,
                });
            }

            input_total = input_total
                .checked_add(resolved.amount)
                .ok_or(LedgerError::AmountOverflow)?;
        }

        if tx.inputs.is_empty() {
            return Err(LedgerError::InvalidTransaction(
                "transaction spends nothing".to_string(),
            ));
        }

        let output_total = tx.total_output().ok_or(LedgerError::AmountOverflow)?;
        if output_total > input_total {
            return Err(LedgerError::ValueOverrun {
                inputs: input_total,
                outputs: output_total,
            });
        }

        let fee = input_total - output_total;
        debug!(
            "Validated tx {} ({} inputs, fee {})",
            tx.id,
            tx.inputs.len(),
            fee
        );
        Ok(fee)
    }

    /// Verify one input's signature and return the account its key controls.
    /// Malformed keys or signatures count as bad signatures.
    fn verify_proof(
        &self,
        index: usize,
        input: &TransactionInput,
        digest: &[u8],
    ) -> Result<String, LedgerError> {
        let public_key =
            public_key_from_hex(&input.public_key).map_err(|_| LedgerError::BadSignature(index))?;
        let signature =
            hex::decode(&input.signature).map_err(|_| LedgerError::BadSignature(index))?;

        match verify_signature(&public_key, digest, &signature) {
            Ok(true) => Ok(derive_address(self.ticker, &public_key)),
            _ => Err(LedgerError::BadSignature(index)),
        }
    }
}

/// Fee of `tx` measured against `utxo` without checking proofs.
///
/// Used during block assembly, where every transaction was validated on
/// admission but its inputs may have been consumed since.
pub fn compute_fee(tx: &Transaction, utxo: &UtxoSet) -> Result<Amount, LedgerError> {
    let mut input_total: Amount = 0;
    for input in &tx.inputs {
        let outpoint = input.outpoint();
        let output = utxo
            .lookup(&outpoint)
            .ok_or(LedgerError::UnknownOutput(outpoint))?;
        input_total = input_total
            .checked_add(output.amount)
            .ok_or(LedgerError::AmountOverflow)?;
    }

    let output_total = tx.total_output().ok_or(LedgerError::AmountOverflow)?;
    input_total
        .checked_sub(output_total)
        .ok_or(LedgerError::ValueOverrun {
            inputs: input_total,
            outputs: output_total,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::{OutPoint, TransactionBuilder, TransactionOutput};
    use crate::crypto::KeyPair;

    const TICKER: &str = "BFC";

    fn funded(key_pair: &KeyPair, amounts: &[Amount]) -> (UtxoSet, Vec<OutPoint>) {
        let mut utxo = UtxoSet::new();
        let owner = key_pair.address(TICKER);
        let outpoints = amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| {
                let tx_id = format!("{:064x}", i + 1);
                utxo.add(&tx_id, 0, TransactionOutput::new(&owner, *amount))
                    .unwrap();
                OutPoint::new(&tx_id, 0)
            })
            .collect();
        (utxo, outpoints)
    }

    #[test]
    fn test_valid_transfer_returns_fee() {
        let alice = KeyPair::generate();
        let bob = KeyPair::generate();
        let (utxo, outs) = funded(&alice, &[10]);

        let tx = TransactionBuilder::new()
            .add_input(&outs[0])
            .add_output(&bob.address(TICKER), 7)
            .add_output(&alice.address(TICKER), 2)
            .build_and_sign(&alice)
            .unwrap();

        let validator = TransactionValidator::new(&utxo, TICKER);
        assert_eq!(validator.validate(&tx).unwrap(), 1);
        assert_eq!(compute_fee(&tx, &utxo).unwrap(), 1);
    }

    #[test]
    fn test_outputs_exceeding_inputs_rejected() {
        let alice = KeyPair::generate();
        let (utxo, outs) = funded(&alice, &[10]);

        let tx = TransactionBuilder::new()
            .add_input(&outs[0])
            .add_output("BFCbob", 12)
            .build_and_sign(&alice)
            .unwrap();

        let result = TransactionValidator::new(&utxo, TICKER).validate(&tx);
        assert!(matches!(
            result,
            Err(LedgerError::ValueOverrun {
                inputs: 10,
                outputs: 12
            })
        ));
    }

    #[test]
    fn test_missing_input_rejected() {
        let alice = KeyPair::generate();
        let (utxo, _) = funded(&alice, &[10]);

        let tx = TransactionBuilder::new()
            .add_input(&OutPoint::new("feed", 9))
            .add_output("BFCbob", 1)
            .build_and_sign(&alice)
            .unwrap();

        let result = TransactionValidator::new(&utxo, TICKER).validate(&tx);
        assert!(matches!(result, Err(LedgerError::MissingInput { index: 0, .. })));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let alice = KeyPair::generate();
        let (utxo, outs) = funded(&alice, &[10, 5]);

        let mut tx = TransactionBuilder::new()
            .add_input(&outs[0])
            .add_input(&outs[1])
            .add_output("BFCbob", 15)
            .build_and_sign(&alice)
            .unwrap();
        tx.inputs[1].signature = "00".repeat(64);

        let result = TransactionValidator::new(&utxo, TICKER).validate(&tx);
        assert!(matches!(result, Err(LedgerError::BadSignature(1))));

        tx.inputs[1].signature = "not hex".to_string();
        let result = TransactionValidator::new(&utxo, TICKER).validate(&tx);
        assert!(matches!(result, Err(LedgerError::BadSignature(1))));
    }

    #[test]
    fn test_signature_over_other_content_rejected() {
        let alice = KeyPair::generate();
        let (utxo, outs) = funded(&alice, &[10]);

        let mut tx = TransactionBuilder::new()
            .add_input(&outs[0])
            .add_output("BFCbob", 5)
            .build_and_sign(&alice)
            .unwrap();

        // Redirect the payment after signing
        tx.outputs[0].account = "BFCmallory".to_string();
        tx.refresh_id();

        let result = TransactionValidator::new(&utxo, TICKER).validate(&tx);
        assert!(matches!(result, Err(LedgerError::BadSignature(0))));
    }

    #[test]
    fn test_foreign_key_rejected() {
        let alice = KeyPair::generate();
        let mallory = KeyPair::generate();
        let (utxo, outs) = funded(&alice, &[10]);

        let tx = TransactionBuilder::new()
            .add_input(&outs[0])
            .add_output(&mallory.address(TICKER), 10)
            .build_and_sign(&mallory)
            .unwrap();

        let result = TransactionValidator::new(&utxo, TICKER).validate(&tx);
        match result {
            Err(LedgerError::OwnershipMismatch { index, owner, derived }) => {
                assert_eq!(index, 0);
                assert_eq!(owner, alice.address(TICKER));
                assert_eq!(derived, mallory.address(TICKER));
            }
            other => panic!("expected ownership mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_input_rejected() {
        let alice = KeyPair::generate();
        let (utxo, outs) = funded(&alice, &[10]);

        let tx = TransactionBuilder::new()
            .add_input(&outs[0])
            .add_input(&outs[0])
            .add_output("BFCbob", 20)
            .build_and_sign(&alice)
            .unwrap();

        let result = TransactionValidator::new(&utxo, TICKER).validate(&tx);
        assert!(matches!(result, Err(LedgerError::DuplicateInput(_))));
    }

    #[test]
    fn test_inputless_transfer_rejected() {
        let utxo = UtxoSet::new();
        let tx = TransactionBuilder::new().add_output("BFCbob", 1).build();

        let result = TransactionValidator::new(&utxo, TICKER).validate(&tx);
        assert!(matches!(result, Err(LedgerError::InvalidTransaction(_))));
    }

    #[test]
    fn test_validation_does_not_mutate() {
        let alice = KeyPair::generate();
        let (utxo, outs) = funded(&alice, &[10]);
        let before = utxo.clone();

        let tx = TransactionBuilder::new()
            .add_input(&outs[0])
            .add_output("BFCbob", 10)
            .build_and_sign(&alice)
            .unwrap();
        TransactionValidator::new(&utxo, TICKER).validate(&tx).unwrap();

        assert_eq!(utxo, before);
    }
}
