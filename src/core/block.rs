//! Block implementation for the ledger
//!
//! A block records one assembly step: the coinbase (when anything was minted
//! or collected) followed by the transfers applied in that step. The block
//! hash is a digest over the full header, so it is bound to the previous
//! block and to the exact transaction list through the merkle root.

use crate::core::amount::Amount;
use crate::core::transaction::Transaction;
use crate::crypto::{calculate_merkle_root_hex, double_sha256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Header version written by this implementation
pub const BLOCK_VERSION: u32 = 1;

/// Compact difficulty target recorded in every header. No proof of work is
/// performed; the value is carried for format stability.
pub const DEFAULT_DIFFICULTY_TARGET: u32 = 0x1d00ffff;

/// Block header containing metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockHeader {
    /// Block version
    pub version: u32,
    /// Hash of the previous block
    pub previous_hash: String,
    /// Merkle root of all transactions
    pub merkle_root: String,
    /// Block creation timestamp
    pub timestamp: DateTime<Utc>,
    /// Compact difficulty target
    pub difficulty_target: u32,
    pub nonce: u32,
}

impl BlockHeader {
    /// Byte encoding hashed into the block identifier
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(160);
        buf.extend_from_slice(&self.version.to_le_bytes());
        for field in [&self.previous_hash, &self.merkle_root] {
            buf.extend_from_slice(&(field.len() as u32).to_le_bytes());
            buf.extend_from_slice(field.as_bytes());
        }
        buf.extend_from_slice(&self.timestamp.timestamp().to_le_bytes());
        buf.extend_from_slice(&self.difficulty_target.to_le_bytes());
        buf.extend_from_slice(&self.nonce.to_le_bytes());
        buf
    }

    /// Calculate the hash of the block header
    pub fn hash(&self) -> String {
        hex::encode(double_sha256(&self.encode()))
    }
}

/// A block in the ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    /// Block height
    pub height: u64,
    /// Block header
    pub header: BlockHeader,
    /// Block hash (cached)
    pub hash: String,
    /// Subsidy plus fees paid to the miner
    pub coinbase_amount: Amount,
    /// Account credited with the coinbase
    pub miner: String,
    /// Coinbase first (if any), then applied transfers in order
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Create a new block on top of `previous_hash`
    pub fn new(
        height: u64,
        previous_hash: String,
        transactions: Vec<Transaction>,
        coinbase_amount: Amount,
        miner: &str,
    ) -> Self {
        let header = BlockHeader {
            version: BLOCK_VERSION,
            previous_hash,
            merkle_root: Self::calculate_merkle_root(&transactions),
            timestamp: Utc::now(),
            difficulty_target: DEFAULT_DIFFICULTY_TARGET,
            nonce: 0,
        };
        let hash = header.hash();

        Self {
            height,
            header,
            hash,
            coinbase_amount,
            miner: miner.to_string(),
            transactions,
        }
    }

    /// Create the genesis block: height 0, no parent, no transactions,
    /// nothing minted
    pub fn genesis() -> Self {
        Self::new(0, String::new(), Vec::new(), 0, "")
    }

    /// Calculate the merkle root from transaction ids
    fn calculate_merkle_root(transactions: &[Transaction]) -> String {
        let ids: Vec<String> = transactions.iter().map(|tx| tx.id.clone()).collect();
        calculate_merkle_root_hex(&ids)
    }

    /// Verify the block's merkle root
    pub fn verify_merkle_root(&self) -> bool {
        Self::calculate_merkle_root(&self.transactions) == self.header.merkle_root
    }

    /// Verify the block hash
    pub fn verify_hash(&self) -> bool {
        self.hash == self.header.hash()
    }

    /// Get the coinbase transaction (first transaction)
    pub fn coinbase_tx(&self) -> Option<&Transaction> {
        self.transactions.first().filter(|tx| tx.is_coinbase())
    }

    /// Transfers applied by this block, excluding the coinbase
    pub fn transfers(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|tx| !tx.is_coinbase())
    }

    pub fn is_genesis(&self) -> bool {
        self.height == 0
    }

    /// Get number of transactions in this block
    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_block() {
        let genesis = Block::genesis();
        assert_eq!(genesis.height, 0);
        assert!(genesis.is_genesis());
        assert!(genesis.transactions.is_empty());
        assert_eq!(genesis.coinbase_amount, 0);
        assert!(genesis.header.previous_hash.is_empty());
        assert_eq!(genesis.header.difficulty_target, 0x1d00ffff);
        assert!(genesis.verify_hash());
        assert!(genesis.verify_merkle_root());
    }

    #[test]
    fn test_block_links_to_parent() {
        let genesis = Block::genesis();
        let coinbase = Transaction::coinbase("BFCminer", 50, 1);
        let block = Block::new(1, genesis.hash.clone(), vec![coinbase], 50, "BFCminer");

        assert_eq!(block.header.previous_hash, genesis.hash);
        assert_ne!(block.hash, genesis.hash);
        assert_eq!(block.coinbase_tx().map(|tx| tx.id.len()), Some(64));
        assert_eq!(block.transfers().count(), 0);
    }

    #[test]
    fn test_merkle_root_verification() {
        let transactions = vec![Transaction::coinbase("BFCminer", 50, 1)];
        let mut block = Block::new(1, "0".repeat(64), transactions, 50, "BFCminer");
        assert!(block.verify_merkle_root());

        block.transactions[0].id = "tampered_id".to_string();
        assert!(!block.verify_merkle_root());
    }

    #[test]
    fn test_block_hash_covers_header() {
        let mut block = Block::genesis();
        assert!(block.verify_hash());

        block.header.nonce += 1;
        assert!(!block.verify_hash());

        let mut block = Block::genesis();
        block.header.previous_hash = "0".repeat(64);
        assert!(!block.verify_hash());

        let mut block = Block::genesis();
        block.header.difficulty_target = 0x207fffff;
        assert!(!block.verify_hash());
    }
}
