//! Wallet implementation for the ledger
//!
//! Key custody and payment construction. Private keys live only in the
//! wallets directory, one JSON file per account; the ledger snapshot never
//! contains them.

use crate::core::{Amount, LedgerError, Transaction, TransactionBuilder, UtxoSet};
use crate::crypto::{is_valid_address, KeyError, KeyPair};
use crate::wallet::selector::select_coins;
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Wallet-related errors
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("No key stored for account {0}")]
    KeyNotFound(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Crypto error: {0}")]
    CryptoError(#[from] KeyError),
    #[error("Wallet file {path} holds a key for {actual}")]
    AddressMismatch { path: String, actual: String },
}

impl From<WalletError> for LedgerError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::KeyNotFound(account) => LedgerError::KeyNotFound(account),
            other => LedgerError::KeyStore(other.to_string()),
        }
    }
}

/// Serializable wallet data for persistence
#[derive(Debug, Serialize, Deserialize)]
struct WalletData {
    private_key_hex: String,
    public_key_hex: String,
    address: String,
    label: Option<String>,
    created_at: DateTime<Utc>,
}

/// A signing identity bound to one account
pub struct Wallet {
    /// The key pair for signing transactions
    key_pair: KeyPair,
    ticker: String,
    address: String,
    /// Optional label for the wallet
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Wallet {
    /// Create a new wallet with a fresh key pair
    pub fn new(ticker: &str) -> Self {
        Self::from_key_pair(KeyPair::generate(), ticker)
    }

    /// Wrap an existing key pair
    pub fn from_key_pair(key_pair: KeyPair, ticker: &str) -> Self {
        let address = key_pair.address(ticker);
        Self {
            key_pair,
            ticker: ticker.to_string(),
            address,
            label: None,
            created_at: Utc::now(),
        }
    }

    /// Import a wallet from a private key
    pub fn from_private_key(private_key_hex: &str, ticker: &str) -> Result<Self, WalletError> {
        let key_pair = KeyPair::from_private_key_hex(private_key_hex)?;
        Ok(Self::from_key_pair(key_pair, ticker))
    }

    /// Get the wallet's address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Get the wallet's public key (hex)
    pub fn public_key(&self) -> String {
        self.key_pair.public_key_hex()
    }

    /// Spendable balance in `utxo`
    pub fn balance(&self, utxo: &UtxoSet) -> Amount {
        utxo.balance(&self.address)
    }

    /// Build and sign a payment of `amount` to `recipient`, leaving `fee`
    /// unclaimed for the miner. Change goes back to this wallet.
    pub fn create_transaction(
        &self,
        utxo: &UtxoSet,
        recipient: &str,
        amount: Amount,
        fee: Amount,
    ) -> Result<Transaction, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidTransaction(
                "amount must be greater than zero".to_string(),
            ));
        }
        if !is_valid_address(&self.ticker, recipient) {
            return Err(LedgerError::InvalidTransaction(format!(
                "malformed recipient {}",
                recipient
            )));
        }

        let target = amount.checked_add(fee).ok_or(LedgerError::AmountOverflow)?;
        let selection = select_coins(utxo, &self.address, target)?;

        let mut builder = TransactionBuilder::new();
        for outpoint in &selection.selected {
            builder = builder.add_input(outpoint);
        }
        builder = builder.add_output(recipient, amount);

        let change = selection.change(target);
        if change > 0 {
            builder = builder.add_output(&self.address, change);
        }

        builder.build_and_sign(&self.key_pair)
    }

    /// Save wallet to file, readable by the owner only
    pub fn save(&self, path: &Path) -> Result<(), WalletError> {
        let data = WalletData {
            private_key_hex: self.key_pair.private_key_hex(),
            public_key_hex: self.public_key(),
            address: self.address.clone(),
            label: self.label.clone(),
            created_at: self.created_at,
        };
        let json = serde_json::to_string_pretty(&data)?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    /// Load wallet from file
    pub fn load(path: &Path, ticker: &str) -> Result<Self, WalletError> {
        let json = fs::read_to_string(path)?;
        let data: WalletData = serde_json::from_str(&json)?;

        let mut wallet = Self::from_private_key(&data.private_key_hex, ticker)?;
        if wallet.address != data.address {
            return Err(WalletError::AddressMismatch {
                path: path.display().to_string(),
                actual: wallet.address,
            });
        }
        wallet.label = data.label;
        wallet.created_at = data.created_at;
        Ok(wallet)
    }

    /// Export wallet info (without private key)
    pub fn export_public_info(&self) -> WalletInfo {
        WalletInfo {
            address: self.address.clone(),
            public_key: self.public_key(),
            label: self.label.clone(),
            created_at: self.created_at,
        }
    }
}

/// Public wallet information (safe to share)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletInfo {
    pub address: String,
    pub public_key: String,
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Wallet manager for handling multiple wallets
pub struct WalletManager {
    wallets_dir: PathBuf,
    ticker: String,
}

impl WalletManager {
    /// Create a new wallet manager
    pub fn new(wallets_dir: &Path, ticker: &str) -> Result<Self, WalletError> {
        fs::create_dir_all(wallets_dir)?;
        Ok(Self {
            wallets_dir: wallets_dir.to_path_buf(),
            ticker: ticker.to_string(),
        })
    }

    fn wallet_path(&self, address: &str) -> PathBuf {
        self.wallets_dir.join(format!("{}.json", address))
    }

    /// Create and save a new wallet
    pub fn create_wallet(&self, label: Option<&str>) -> Result<Wallet, WalletError> {
        let mut wallet = Wallet::new(&self.ticker);
        wallet.label = label.map(str::to_string);
        wallet.save(&self.wallet_path(wallet.address()))?;

        info!("Created wallet {}", wallet.address());
        Ok(wallet)
    }

    /// All wallets, oldest first
    pub fn list_wallets(&self) -> Result<Vec<WalletInfo>, WalletError> {
        let mut wallets = Vec::new();

        for entry in fs::read_dir(&self.wallets_dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                match Wallet::load(&path, &self.ticker) {
                    Ok(wallet) => wallets.push(wallet.export_public_info()),
                    Err(e) => log::warn!("Skipping unreadable wallet {}: {}", path.display(), e),
                }
            }
        }

        wallets.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.address.cmp(&b.address))
        });
        Ok(wallets)
    }

    /// Load a specific wallet by address
    pub fn load_wallet(&self, address: &str) -> Result<Wallet, WalletError> {
        let path = self.wallet_path(address);
        if !is_valid_address(&self.ticker, address) || !path.exists() {
            return Err(WalletError::KeyNotFound(address.to_string()));
        }
        Wallet::load(&path, &self.ticker)
    }

    /// Address of the oldest wallet, if any
    pub fn default_address(&self) -> Result<Option<String>, WalletError> {
        Ok(self.list_wallets()?.into_iter().next().map(|w| w.address))
    }
}
