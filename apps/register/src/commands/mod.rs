//! # Commands Module
//!
//! One handler per top-level subcommand. Handlers parse operator strings
//! into domain values, call a service and print the outcome.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (Context, Output, dispatch)
//! ├── session.rs   ◄─── login, logout, status, report session
//! ├── sale.rs      ◄─── sell, ticket next
//! ├── register.rs  ◄─── interactive register loop
//! ├── product.rs   ◄─── product, report expiry, reprice
//! ├── customer.rs  ◄─── customer
//! ├── ledger.rs    ◄─── op, balance
//! └── config.rs    ◄─── config show/path
//! ```
//!
//! ## Command Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  caja customer pay Juan 45                                              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  clap ──► Commands::Customer { Pay { name, amount } }                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  commands::customer::handle(cmd, &ctx)                                  │
//! │    parse_money("amount", "45") ──► Money                                │
//! │    ctx.customers().pay(..)     ──► Customer                             │
//! │    ctx.output.print(&customer, |c| human text)                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  stdout (text or --json)                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod customer;
pub mod ledger;
pub mod product;
pub mod register;
pub mod sale;
pub mod session;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

use caja_core::{DiscountRate, Money};
use caja_store::Store;

use crate::cli::Commands;
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::services::{
    CheckoutService, CustomerService, InventoryService, LedgerService, SessionService,
};

// =============================================================================
// Context
// =============================================================================

/// Everything a command needs: the opened store, the loaded config and
/// the output mode.
pub struct Context {
    pub store: Store,
    pub config: AppConfig,
    pub output: Output,
}

impl Context {
    pub fn new(store: Store, config: AppConfig, json: bool) -> Self {
        Context {
            store,
            config,
            output: Output { json },
        }
    }

    /// Local wall-clock time, the timestamp for every record.
    pub fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    pub fn checkout(&self) -> CheckoutService<'_> {
        CheckoutService::new(&self.store, &self.config)
    }

    pub fn sessions(&self) -> SessionService<'_> {
        SessionService::new(&self.store, &self.config)
    }

    pub fn inventory(&self) -> InventoryService<'_> {
        InventoryService::new(&self.store, &self.config)
    }

    pub fn customers(&self) -> CustomerService<'_> {
        CustomerService::new(&self.store, &self.config)
    }

    pub fn ledger(&self) -> LedgerService<'_> {
        LedgerService::new(&self.store, &self.config)
    }

    pub fn money(&self, amount: Money) -> String {
        self.config.format_currency(amount)
    }
}

// =============================================================================
// Output
// =============================================================================

/// Text for people, JSON for scripts.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    /// Prints `value` as pretty JSON, or runs `human` to print text.
    pub fn print<T, F>(&self, value: &T, human: F) -> AppResult<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&T),
    {
        if self.json {
            let rendered = serde_json::to_string_pretty(value)
                .map_err(|e| AppError::internal(format!("Could not render JSON: {}", e)))?;
            println!("{}", rendered);
        } else {
            human(value);
        }
        Ok(())
    }

    /// Prints a failure on stderr in the selected format.
    pub fn error(&self, err: &AppError) {
        if self.json {
            match serde_json::to_string_pretty(err) {
                Ok(rendered) => eprintln!("{}", rendered),
                Err(_) => eprintln!("error {}", err),
            }
        } else {
            eprintln!("error {}", err);
        }
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Runs one parsed command.
pub async fn dispatch(command: Commands, ctx: &Context) -> AppResult<()> {
    match &command {
        Commands::Login { username, .. } => debug!(username = ?username, "Dispatching login"),
        other => debug!(command = ?other, "Dispatching"),
    }
    match command {
        Commands::Login { username, password } => session::login(ctx, username, password).await,
        Commands::Logout { notes } => session::logout(ctx, &notes).await,
        Commands::Status => session::status(ctx).await,
        Commands::Sell { inputs, payments } => sale::sell(ctx, &inputs, &payments).await,
        Commands::Register => register::run(ctx).await,
        Commands::Ticket { command } => sale::ticket(ctx, command).await,
        Commands::Product { command } => product::handle(ctx, command).await,
        Commands::Report { command } => product::report(ctx, command).await,
        Commands::Reprice { command } => product::reprice(ctx, command).await,
        Commands::Customer { command } => customer::handle(ctx, command).await,
        Commands::Op { command } => ledger::operation(ctx, command).await,
        Commands::Balance { command } => ledger::balance(ctx, command).await,
        Commands::Config { command } => config::handle(ctx, command),
    }
}

// =============================================================================
// Argument Parsing
// =============================================================================

/// Parses an amount typed by the operator ("45", "12,50").
pub fn parse_money(field: &str, input: &str) -> AppResult<Money> {
    Money::parse(input)
        .ok_or_else(|| AppError::validation(format!("{} '{}' is not a valid amount", field, input.trim())))
}

pub fn parse_optional_money(field: &str, input: Option<&str>) -> AppResult<Option<Money>> {
    input.map(|value| parse_money(field, value)).transpose()
}

/// Parses a percentage between 0 and 100.
pub fn parse_percent(input: &str) -> AppResult<DiscountRate> {
    DiscountRate::parse_percent(input)
        .ok_or_else(|| AppError::validation(format!("'{}' is not a percentage between 0 and 100", input.trim())))
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("'{}' is not a date (YYYY-MM-DD)", input.trim())))
}

pub fn parse_optional_date(input: Option<&str>) -> AppResult<Option<NaiveDate>> {
    input.map(parse_date).transpose()
}
