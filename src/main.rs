//! BitFuture Coin ledger CLI
//!
//! A command-line interface for the single-node ledger.

use bfc_ledger::api::{create_router, ApiConfig, ApiState, DEFAULT_LISTEN};
use bfc_ledger::cli::{self, AppState};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "bfc")]
#[command(version = "0.1.0")]
#[command(about = "Single-node UTXO ledger with local block assembly", long_about = None)]
struct Cli {
    /// Data directory for the ledger snapshot and wallets
    #[arg(short, long, default_value = ".bfc_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new ledger at genesis
    Init {
        /// Chain parameters file (default: search for params.json)
        #[arg(short, long)]
        params: Option<PathBuf>,

        /// Account receiving the configured premine
        #[arg(long)]
        premine_address: Option<String>,
    },

    /// Assemble new blocks
    Mine {
        /// Account credited with subsidy and fees; default: first wallet address
        #[arg(short, long)]
        address: Option<String>,

        /// Number of blocks to assemble
        #[arg(short, long, default_value = "1")]
        count: u32,
    },

    /// Show the current tip and mined credits
    Status,

    /// Wallet operations
    Wallet {
        #[command(subcommand)]
        action: WalletCommands,
    },

    /// Transaction operations
    Tx {
        #[command(subcommand)]
        action: TxCommands,
    },

    /// Show pending transactions
    Mempool,

    /// Snapshot backups
    Backup {
        #[command(subcommand)]
        action: BackupCommands,
    },

    /// Serve the HTTP API
    Rpc {
        /// Address to listen on (`:port` binds all interfaces)
        #[arg(short, long, default_value = DEFAULT_LISTEN)]
        listen: String,

        /// Per-request timeout in seconds
        #[arg(long, default_value = "30")]
        timeout: u64,
    },
}

#[derive(Subcommand)]
enum WalletCommands {
    /// Create a new wallet
    New {
        /// Optional label for the wallet
        #[arg(short, long)]
        label: Option<String>,
    },

    /// List all wallets
    List,

    /// Show wallet balance
    Balance {
        /// Wallet address
        #[arg(short, long)]
        address: String,
    },
}

#[derive(Subcommand)]
enum BackupCommands {
    /// List available backups
    List,

    /// Restore a backup over the current ledger
    Restore {
        /// Backup index (0 is the most recent)
        #[arg(short, long, default_value = "0")]
        index: usize,
    },
}

#[derive(Subcommand)]
enum TxCommands {
    /// Pay from one of your wallets
    Send {
        /// Sender's wallet address
        #[arg(short, long)]
        from: String,

        /// Recipient's address
        #[arg(short, long)]
        to: String,

        /// Amount to send, in coins ("1.5")
        #[arg(short, long)]
        amount: String,

        /// Fee left for the miner, in coins
        #[arg(long)]
        fee: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Init runs before any ledger exists
    if let Commands::Init {
        params,
        premine_address,
    } = &cli.command
    {
        return cli::cmd_init(&cli.data_dir, params.as_deref(), premine_address.as_deref());
    }

    let mut state = AppState::open(cli.data_dir)?;

    match cli.command {
        Commands::Init { .. } => unreachable!(),

        Commands::Mine { address, count } => {
            cli::cmd_mine(&mut state, address.as_deref(), count)?;
        }

        Commands::Status => {
            cli::cmd_status(&state)?;
        }

        Commands::Wallet { action } => match action {
            WalletCommands::New { label } => {
                cli::cmd_wallet_new(&state, label.as_deref())?;
            }
            WalletCommands::List => {
                cli::cmd_wallet_list(&state)?;
            }
            WalletCommands::Balance { address } => {
                cli::cmd_wallet_balance(&state, &address)?;
            }
        },

        Commands::Tx { action } => match action {
            TxCommands::Send {
                from,
                to,
                amount,
                fee,
            } => {
                cli::cmd_send(&mut state, &from, &to, &amount, fee.as_deref())?;
            }
        },

        Commands::Mempool => {
            cli::cmd_mempool(&state)?;
        }

        Commands::Backup { action } => match action {
            BackupCommands::List => {
                cli::cmd_backup_list(&state)?;
            }
            BackupCommands::Restore { index } => {
                cli::cmd_backup_restore(&mut state, index)?;
            }
        },

        Commands::Rpc { listen, timeout } => {
            let config = ApiConfig {
                listen,
                request_timeout: Duration::from_secs(timeout),
            };
            run_rpc(state, config)?;
        }
    }

    Ok(())
}

fn run_rpc(state: AppState, config: ApiConfig) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let api_state = ApiState::new(state.ledger, state.storage, state.wallet_manager);
        let app = create_router(api_state, &config);
        let addr = config.bind_addr();

        println!("🌐 RPC listening on {}", addr);
        println!("   GET  /status              - Current tip");
        println!("   GET  /balance?address=    - Balance");
        println!("   GET  /mempool             - Pending transactions");
        println!("   POST /wallet/new          - Create wallet");
        println!("   GET  /wallet/list         - List wallets");
        println!("   POST /tx/send             - Queue payment");
        println!("   POST /mine                - Assemble block");
        log::info!("RPC listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                tokio::signal::ctrl_c().await.ok();
                println!("\n📴 Shutting down RPC server...");
            })
            .await?;

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}
