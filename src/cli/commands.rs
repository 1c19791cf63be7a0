//! CLI commands for the ledger
//!
//! Implements all command handlers for the CLI interface. Every mutating
//! command goes through `Storage::commit`, so a failed save leaves both the
//! file and the in-memory state as they were.

use crate::core::{format_amount, parse_amount, ChainParams, LedgerState};
use crate::mining::BlockAssembler;
use crate::storage::{Storage, StorageConfig};
use crate::wallet::WalletManager;
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Directory under the data dir holding wallet key files
pub const WALLETS_DIR: &str = "wallets";

/// Application state
pub struct AppState {
    pub ledger: LedgerState,
    pub storage: Storage,
    pub wallet_manager: WalletManager,
}

impl AppState {
    /// Open an initialized ledger
    pub fn open(data_dir: PathBuf) -> CliResult<Self> {
        let storage = Storage::new(storage_config(&data_dir))?;
        let ledger = storage.load()?;
        let wallet_manager = WalletManager::new(&data_dir.join(WALLETS_DIR), &ledger.params.ticker)?;

        Ok(Self {
            ledger,
            storage,
            wallet_manager,
        })
    }

    fn decimals(&self) -> u32 {
        self.ledger.params.decimals
    }

    fn fmt(&self, units: u64) -> String {
        format!(
            "{} {}",
            format_amount(units, self.decimals()),
            self.ledger.params.ticker
        )
    }
}

fn storage_config(data_dir: &Path) -> StorageConfig {
    StorageConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    }
}

/// Initialize a new ledger from a parameters file
pub fn cmd_init(
    data_dir: &Path,
    params_path: Option<&Path>,
    premine_address: Option<&str>,
) -> CliResult<()> {
    let storage = Storage::new(storage_config(data_dir))?;

    if storage.exists() {
        return Err(format!("ledger already exists in {}", data_dir.display()).into());
    }

    let params = ChainParams::load(params_path)?;
    let ledger = LedgerState::with_premine(params, premine_address)?;
    storage.save(&ledger)?;

    println!("✅ Ledger initialized!");
    println!("   📁 Data directory: {}", data_dir.display());
    println!(
        "   🪙 {} ({}), {} decimals",
        ledger.params.name, ledger.params.ticker, ledger.params.decimals
    );
    println!(
        "   ⏱️  {}s blocks, halving every {} blocks",
        ledger.params.target_block_time_secs,
        ledger.params.blocks_per_halving()
    );
    println!("   🧱 Genesis block hash: {}", ledger.tip.hash);
    if ledger.issued > 0 {
        println!(
            "   💰 Premine: {}",
            format_amount(ledger.issued, ledger.params.decimals)
        );
    }

    Ok(())
}

/// Assemble blocks, paying `address` or the first wallet
pub fn cmd_mine(state: &mut AppState, address: Option<&str>, count: u32) -> CliResult<()> {
    let miner = match address {
        Some(address) => address.to_string(),
        None => state.wallet_manager.default_address()?.ok_or(
            "no miner address provided and wallet empty; run 'bfc wallet new'",
        )?,
    };
    let assembler = BlockAssembler::new(&miner);

    println!("⛏️  Assembling {} block(s) for: {}", count, miner);

    for _ in 0..count {
        let (block, stats) = state
            .storage
            .commit(&mut state.ledger, |ledger| assembler.assemble(ledger))?;

        println!("\n   Block {} assembled!", block.height);
        println!("   ├─ Hash: {}", block.hash);
        println!("   ├─ Transactions: {}", stats.included);
        println!("   ├─ Subsidy: {}", state.fmt(stats.subsidy));
        println!("   ├─ Fees: {}", state.fmt(stats.total_fees));
        if !stats.rejected.is_empty() {
            println!("   ├─ Dropped: {}", stats.rejected.len());
        }
        println!("   └─ Time: {}ms", stats.time_ms);
    }

    println!(
        "\n💰 Spendable balance for miner: {}",
        state.fmt(state.ledger.balance(&miner))
    );

    Ok(())
}

/// Show the tip and mined credits
pub fn cmd_status(state: &AppState) -> CliResult<()> {
    let tip = &state.ledger.tip;
    let stats = state.ledger.stats();

    println!("⛓️  Ledger status");
    println!("   ├─ Height: {}", tip.height);
    println!("   ├─ Hash: {}", tip.hash);
    println!("   ├─ Time: {}", tip.header.timestamp.to_rfc3339());
    println!("   ├─ Transactions: {}", tip.tx_count());
    println!("   ├─ Coinbase: {}", state.fmt(tip.coinbase_amount));
    println!("   ├─ Issued: {}", state.fmt(stats.issued));
    println!("   ├─ UTXOs: {}", stats.utxo_count);
    println!("   └─ Pending: {}", stats.mempool_size);

    if !state.ledger.balances.is_empty() {
        println!("\n   Mined credits:");
        for (account, credit) in &state.ledger.balances {
            println!("   └─ {}: {}", account, state.fmt(*credit));
        }
    }

    Ok(())
}

/// Create a new wallet
pub fn cmd_wallet_new(state: &AppState, label: Option<&str>) -> CliResult<()> {
    let wallet = state.wallet_manager.create_wallet(label)?;

    println!("🔐 New wallet created!");
    println!("   📍 Address: {}", wallet.address());
    println!("   🔑 Public Key: {}", wallet.public_key());
    if let Some(l) = &wallet.label {
        println!("   🏷️  Label: {}", l);
    }
    println!("\n   ⚠️  IMPORTANT: Your private key is stored in the wallets directory.");
    println!("   Back up this directory to avoid losing access to your funds!");

    Ok(())
}

/// List all wallets
pub fn cmd_wallet_list(state: &AppState) -> CliResult<()> {
    let wallets = state.wallet_manager.list_wallets()?;

    if wallets.is_empty() {
        println!("📭 No wallets found. Create one with: bfc wallet new");
        return Ok(());
    }

    println!("📋 Wallets:");
    for (i, info) in wallets.iter().enumerate() {
        let label = info.label.as_deref().unwrap_or("-");
        println!(
            "   {}) {} ({}) - {}",
            i + 1,
            info.address,
            label,
            state.fmt(state.ledger.balance(&info.address))
        );
    }

    Ok(())
}

/// Get wallet balance
pub fn cmd_wallet_balance(state: &AppState, address: &str) -> CliResult<()> {
    let outputs: Vec<_> = state.ledger.utxo.select_by_account(address).collect();

    println!("💰 Balance for {}", address);
    println!("   Spendable: {}", state.fmt(state.ledger.balance(address)));
    println!("   Mined: {}", state.fmt(state.ledger.mined_balance(address)));
    println!("   UTXOs: {}", outputs.len());

    if !outputs.is_empty() {
        println!("\n   Transaction outputs:");
        for (outpoint, output) in outputs.iter().take(10) {
            println!("   └─ {} = {}", outpoint, state.fmt(output.amount));
        }
        if outputs.len() > 10 {
            println!("   ... and {} more", outputs.len() - 10);
        }
    }

    Ok(())
}

/// Send coins
pub fn cmd_send(
    state: &mut AppState,
    from: &str,
    to: &str,
    amount: &str,
    fee: Option<&str>,
) -> CliResult<()> {
    let decimals = state.decimals();
    let amount = parse_amount(amount, decimals)?;
    let fee = match fee {
        Some(fee) => parse_amount(fee, decimals)?,
        None => 0,
    };

    let wallet = state.wallet_manager.load_wallet(from)?;

    let tx = state.storage.commit(&mut state.ledger, |ledger| {
        let tx = wallet.create_transaction(&ledger.utxo, to, amount, fee)?;
        ledger.submit_transaction(tx.clone())?;
        Ok(tx)
    })?;

    println!(
        "📤 tx queued: {} (inputs={} outputs={})",
        tx.id,
        tx.inputs.len(),
        tx.outputs.len()
    );
    println!("   Amount: {}", state.fmt(amount));
    if fee > 0 {
        println!("   Fee: {}", state.fmt(fee));
    }

    Ok(())
}

/// Show pending transactions
pub fn cmd_mempool(state: &AppState) -> CliResult<()> {
    let mempool = &state.ledger.mempool;

    println!("📬 Mempool: {} pending transaction(s)", mempool.len());
    for tx in mempool.transactions() {
        let total = tx.total_output().unwrap_or(u64::MAX);
        println!(
            "   └─ {} ({} in, {} out, {})",
            tx.id,
            tx.inputs.len(),
            tx.outputs.len(),
            state.fmt(total)
        );
    }

    Ok(())
}

/// List snapshot backups, newest first
pub fn cmd_backup_list(state: &AppState) -> CliResult<()> {
    let backups = state.storage.list_backups();

    if backups.is_empty() {
        println!("📭 No backups in {}", state.storage.data_dir().display());
        return Ok(());
    }

    println!("🗄️  Backups in {}:", state.storage.data_dir().display());
    for index in backups {
        println!("   └─ #{}", index);
    }

    Ok(())
}

/// Replace the ledger with backup `index`
pub fn cmd_backup_restore(state: &mut AppState, index: usize) -> CliResult<()> {
    state.ledger = state.storage.restore_backup(index)?;

    println!("♻️  Restored backup #{}", index);
    println!("   ├─ Height: {}", state.ledger.height());
    println!("   └─ Hash: {}", state.ledger.tip.hash);

    Ok(())
}
