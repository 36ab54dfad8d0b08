//! # Caja Register Library
//!
//! The `caja` command line: parses arguments, loads configuration, opens
//! the data directory and runs one command.
//!
//! ## Module Organization
//! ```text
//! caja_register/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── cli.rs          ◄─── clap definitions
//! ├── config.rs       ◄─── AppConfig (defaults → caja.toml → CAJA_* → flags)
//! ├── error.rs        ◄─── AppError for every command
//! ├── services/       ◄─── Checkout, Session, Inventory, Customer, Ledger
//! └── commands/       ◄─── One handler per subcommand, text or JSON output
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Parse arguments (clap)                                              │
//! │  2. Initialize logging (stderr, RUST_LOG or info,caja=debug)            │
//! │  3. Load config, apply --data-dir                                       │
//! │  4. Open store, create missing documents                                │
//! │  5. Dispatch the command                                                │
//! │  6. Error? print it on stderr, exit status 1                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod services;

use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use caja_store::{Store, StoreConfig};

use cli::Cli;
use commands::{Context, Output};
use config::AppConfig;
use error::AppResult;

/// Parses the command line and runs it.
pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let output = Output { json: cli.json };
    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&err);
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> AppResult<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        debug!(data_dir = %dir.display(), "Data dir from command line");
        config.data_dir = dir;
    }

    let store = Store::open(StoreConfig::new(&config.data_dir)).await?;
    info!(data_dir = %store.data_dir().display(), "Store opened");

    let ctx = Context::new(store, config, cli.json);
    commands::dispatch(cli.command, &ctx).await
}

/// Initializes the tracing subscriber on stderr.
///
/// ## Log Levels
/// - Default: `info,caja=debug`
/// - `RUST_LOG=warn` keeps the register quiet
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,caja=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
