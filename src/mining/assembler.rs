//! Block assembly
//!
//! Drains the mempool, applies each transaction to the UTXO set on its own
//! (all or nothing per transaction), mints the coinbase and advances the tip.
//! There is no proof of work: assembly runs under the caller's authority.

use crate::core::{
    compute_fee, Amount, Block, ChainParams, LedgerError, LedgerState, Transaction,
};
use log::{info, warn};
use std::time::Instant;

/// Scheduled subsidy at `height`: the initial subsidy halved once per
/// completed halving period, floored to whole minor units.
pub fn subsidy_at(params: &ChainParams, height: u64) -> Amount {
    let blocks_per_halving = params.blocks_per_halving().max(1);
    let halvings = height / blocks_per_halving;
    if halvings >= u64::from(Amount::BITS) {
        return 0;
    }
    params.initial_subsidy_units() >> halvings
}

/// Transaction dropped during assembly
#[derive(Debug)]
pub struct RejectedTransaction {
    pub tx_id: String,
    pub error: LedgerError,
}

/// Assembly statistics
#[derive(Debug)]
pub struct AssemblyStats {
    /// Subsidy actually minted (after the supply cap)
    pub subsidy: Amount,
    pub total_fees: Amount,
    /// Transfers applied by the block
    pub included: usize,
    pub rejected: Vec<RejectedTransaction>,
    /// Time taken in milliseconds
    pub time_ms: u128,
}

/// Assembles blocks paying a fixed miner account
pub struct BlockAssembler {
    /// Account receiving subsidy and fees
    pub miner: String,
}

impl BlockAssembler {
    pub fn new(miner: &str) -> Self {
        Self {
            miner: miner.to_string(),
        }
    }

    /// Build the next block on top of `state.tip` and make it the new tip.
    ///
    /// A transaction that no longer applies (its input was consumed earlier
    /// in the batch, or its inputs no longer cover its outputs) is dropped
    /// without touching the UTXO set; the others still go in. On error the
    /// state, mempool included, is left exactly as it was.
    pub fn assemble(&self, state: &mut LedgerState) -> Result<(Block, AssemblyStats), LedgerError> {
        if self.miner.is_empty() {
            return Err(LedgerError::InvalidTransaction(
                "miner account must not be empty".to_string(),
            ));
        }

        let start = Instant::now();
        let height = state.height() + 1;
        let subsidy = state.clamp_to_supply(subsidy_at(&state.params, height));

        // Work on a staged copy; `state` is only touched once the coinbase is in
        let mut utxo = state.utxo.clone();
        let mut included: Vec<Transaction> = Vec::new();
        let mut rejected = Vec::new();
        let mut total_fees: Amount = 0;

        for tx in state.mempool.transactions().iter().cloned() {
            // Fee is measured before this transaction mutates anything
            let applied = compute_fee(&tx, &utxo)
                .and_then(|fee| utxo.apply_transaction(&tx).map(|_| fee));

            match applied {
                Ok(fee) => {
                    total_fees = total_fees.saturating_add(fee);
                    included.push(tx);
                }
                Err(error) => {
                    warn!("Dropping transaction {} from block {}: {}", tx.id, height, error);
                    rejected.push(RejectedTransaction {
                        tx_id: tx.id,
                        error,
                    });
                }
            }
        }

        let reward = subsidy.saturating_add(total_fees);
        let mut transactions = Vec::with_capacity(included.len() + 1);
        if reward > 0 {
            let coinbase = Transaction::coinbase(&self.miner, reward, height);
            utxo.apply_transaction(&coinbase)?;
            transactions.push(coinbase);
        }
        state.mempool.drain_all();
        state.utxo = utxo;
        let included_count = included.len();
        transactions.extend(included);

        let block = Block::new(
            height,
            state.tip.hash.clone(),
            transactions,
            reward,
            &self.miner,
        );

        state.issued = state.issued.saturating_add(subsidy);
        let credit = state.balances.entry(self.miner.clone()).or_insert(0);
        *credit = credit.saturating_add(reward);
        state.tip = block.clone();

        let stats = AssemblyStats {
            subsidy,
            total_fees,
            included: included_count,
            rejected,
            time_ms: start.elapsed().as_millis(),
        };

        info!(
            "Assembled block {} ({}): {} transactions, {} dropped, reward {} to {}",
            block.height,
            block.hash,
            stats.included,
            stats.rejected.len(),
            reward,
            self.miner
        );

        Ok((block, stats))
    }
}
