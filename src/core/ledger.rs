//! Ledger state
//!
//! The single owned value holding everything the ledger knows: parameters,
//! tip, UTXO set, mempool and per-miner credits. Every operation takes it by
//! reference; callers serialize mutations (one writer at a time).

use crate::core::amount::Amount;
use crate::core::block::Block;
use crate::core::error::LedgerError;
use crate::core::params::ChainParams;
use crate::core::transaction::Transaction;
use crate::core::utxo::UtxoSet;
use crate::mining::Mempool;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete ledger snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerState {
    pub params: ChainParams,
    pub tip: Block,
    /// Coinbase credits per miner account
    #[serde(default)]
    pub balances: BTreeMap<String, Amount>,
    #[serde(default)]
    pub utxo: UtxoSet,
    #[serde(default)]
    pub mempool: Mempool,
    /// Premine plus every subsidy minted so far
    #[serde(default)]
    pub issued: Amount,
}

impl LedgerState {
    /// Fresh ledger at the genesis block
    pub fn genesis(params: ChainParams) -> Self {
        Self {
            params,
            tip: Block::genesis(),
            balances: BTreeMap::new(),
            utxo: UtxoSet::new(),
            mempool: Mempool::new(),
            issued: 0,
        }
    }

    /// Fresh ledger whose premine is credited to `premine_address` as a
    /// synthetic input-less output. The genesis block itself stays empty.
    pub fn with_premine(
        params: ChainParams,
        premine_address: Option<&str>,
    ) -> Result<Self, LedgerError> {
        let mut state = Self::genesis(params);
        let premine = state.params.premine_units();
        if premine == 0 {
            return Ok(state);
        }

        match premine_address {
            Some(address) => {
                let mint = Transaction::coinbase(address, premine, 0);
                state.utxo.apply_transaction(&mint)?;
                state.issued = premine;
                info!("Premined {} units to {}", premine, address);
            }
            None => warn!("Premine configured but no address given; nothing allocated"),
        }
        Ok(state)
    }

    /// Height of the current tip
    pub fn height(&self) -> u64 {
        self.tip.height
    }

    /// Spendable balance derived from the UTXO set
    pub fn balance(&self, account: &str) -> Amount {
        self.utxo.balance(account)
    }

    /// Total coinbase credited to `account`
    pub fn mined_balance(&self, account: &str) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Validate `tx` against the current UTXO set and queue it
    pub fn submit_transaction(&mut self, tx: Transaction) -> Result<Amount, LedgerError> {
        self.mempool.admit(tx, &self.utxo, &self.params.ticker)
    }

    /// Units that may still be minted, `None` when uncapped
    pub fn remaining_supply(&self) -> Option<Amount> {
        self.params
            .max_supply_units()
            .map(|cap| cap.saturating_sub(self.issued))
    }

    /// Limit a scheduled subsidy to what the supply cap still allows
    pub fn clamp_to_supply(&self, subsidy: Amount) -> Amount {
        match self.remaining_supply() {
            Some(remaining) => subsidy.min(remaining),
            None => subsidy,
        }
    }

    /// Get ledger statistics
    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            height: self.height(),
            tip_hash: self.tip.hash.clone(),
            utxo_count: self.utxo.len(),
            total_value: self.utxo.total_value(),
            issued: self.issued,
            mempool_size: self.mempool.len(),
        }
    }
}

/// Ledger statistics
#[derive(Debug, Clone, Serialize)]
pub struct LedgerStats {
    pub height: u64,
    pub tip_hash: String,
    pub utxo_count: usize,
    pub total_value: Amount,
    pub issued: Amount,
    pub mempool_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_state() {
        let state = LedgerState::genesis(ChainParams::default());
        assert_eq!(state.height(), 0);
        assert!(state.utxo.is_empty());
        assert!(state.mempool.is_empty());
        assert_eq!(state.issued, 0);
        assert_eq!(state.stats().total_value, 0);
    }

    #[test]
    fn test_premine_credits_address() {
        let params = ChainParams {
            premine: 1_000,
            ..ChainParams::default()
        };
        let state = LedgerState::with_premine(params, Some("BFCfounder")).unwrap();

        assert_eq!(state.balance("BFCfounder"), 100_000_000_000);
        assert_eq!(state.issued, 100_000_000_000);
        assert!(state.tip.transactions.is_empty());
        assert_eq!(state.mined_balance("BFCfounder"), 0);
    }

    #[test]
    fn test_premine_without_address_allocates_nothing() {
        let params = ChainParams {
            premine: 1_000,
            ..ChainParams::default()
        };
        let state = LedgerState::with_premine(params, None).unwrap();
        assert!(state.utxo.is_empty());
        assert_eq!(state.issued, 0);
    }

    #[test]
    fn test_supply_clamp() {
        let params = ChainParams {
            max_supply: 100,
            decimals: 0,
            ..ChainParams::default()
        };
        let mut state = LedgerState::genesis(params);
        state.issued = 90;
        assert_eq!(state.remaining_supply(), Some(10));
        assert_eq!(state.clamp_to_supply(50), 10);

        state.params.max_supply = 0;
        assert_eq!(state.remaining_supply(), None);
        assert_eq!(state.clamp_to_supply(50), 50);
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let params = ChainParams {
            premine: 5,
            ..ChainParams::default()
        };
        let state = LedgerState::with_premine(params, Some("BFCfounder")).unwrap();
        let json = serde_json::to_string_pretty(&state).unwrap();
        for key in ["params", "tip", "balances", "utxo", "mempool"] {
            assert!(json.contains(&format!("\"{}\"", key)));
        }

        let back: LedgerState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
