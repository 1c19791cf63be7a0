//! Coin selection
//!
//! Greedy first-fit over an account's unspent outputs. The result depends on
//! the UTXO set's enumeration order, which is not stable.

use crate::core::{Amount, LedgerError, OutPoint, UtxoSet};

/// Outputs chosen to fund a payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinSelection {
    pub selected: Vec<OutPoint>,
    pub total_selected: Amount,
}

impl CoinSelection {
    /// Amount left over after paying `target`
    pub fn change(&self, target: Amount) -> Amount {
        self.total_selected.saturating_sub(target)
    }
}

/// Take `account`'s outputs until they cover `target`
pub fn select_coins(
    utxo: &UtxoSet,
    account: &str,
    target: Amount,
) -> Result<CoinSelection, LedgerError> {
    let mut selected = Vec::new();
    let mut total_selected: Amount = 0;

    for (outpoint, output) in utxo.select_by_account(account) {
        if total_selected >= target {
            break;
        }
        selected.push(outpoint);
        total_selected = total_selected.saturating_add(output.amount);
    }

    if total_selected < target {
        return Err(LedgerError::InsufficientFunds {
            have: total_selected,
            need: target,
        });
    }

    Ok(CoinSelection {
        selected,
        total_selected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TransactionOutput;

    fn wallet_with(amounts: &[Amount]) -> UtxoSet {
        let mut utxo = UtxoSet::new();
        for (i, amount) in amounts.iter().enumerate() {
            utxo.add(&format!("tx{}", i), 0, TransactionOutput::new("BFCalice", *amount))
                .unwrap();
        }
        utxo.add("other", 0, TransactionOutput::new("BFCbob", 100))
            .unwrap();
        utxo
    }

    #[test]
    fn test_greedy_selection_takes_both() {
        let utxo = wallet_with(&[3, 4]);
        let selection = select_coins(&utxo, "BFCalice", 5).unwrap();

        assert_eq!(selection.selected.len(), 2);
        assert_eq!(selection.total_selected, 7);
        assert_eq!(selection.change(5), 2);
    }

    #[test]
    fn test_selection_stops_once_covered() {
        let utxo = wallet_with(&[10, 10, 10]);
        let selection = select_coins(&utxo, "BFCalice", 10).unwrap();
        assert_eq!(selection.selected.len(), 1);
        assert_eq!(selection.total_selected, 10);
    }

    #[test]
    fn test_insufficient_funds() {
        let utxo = wallet_with(&[3, 4]);
        let result = select_coins(&utxo, "BFCalice", 8);
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientFunds { have: 7, need: 8 })
        ));

        let result = select_coins(&utxo, "BFCnobody", 1);
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientFunds { have: 0, need: 1 })
        ));
    }

    #[test]
    fn test_zero_target_needs_no_coins() {
        let selection = select_coins(&UtxoSet::new(), "BFCalice", 0).unwrap();
        assert!(selection.selected.is_empty());
        assert_eq!(selection.total_selected, 0);

        let selection = select_coins(&wallet_with(&[3]), "BFCalice", 0).unwrap();
        assert!(selection.selected.is_empty());
    }

    #[test]
    fn test_only_owned_outputs_selected() {
        let utxo = wallet_with(&[3, 4]);
        let selection = select_coins(&utxo, "BFCalice", 7).unwrap();
        for outpoint in &selection.selected {
            assert_eq!(utxo.lookup(outpoint).unwrap().account, "BFCalice");
        }
    }
}
