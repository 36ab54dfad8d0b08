//! # Command Line Definition
//!
//! ```text
//! caja [--data-dir DIR] [--config FILE] [--json] <command>
//!
//!   login / logout / status          cashier session
//!   sell / register / ticket next    tickets
//!   product / report / reprice       catalog and stock
//!   customer                         credit customers
//!   op / balance                     cash ledger
//!   config show                      effective settings
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "caja",
    version = env!("CARGO_PKG_VERSION"),
    about = "Point-of-sale register: tickets, payments and session closing",
    long_about = None
)]
pub struct Cli {
    /// Data directory (overrides config and CAJA_DATA_DIR)
    #[arg(global = true, long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Config file (default: platform config dir/caja.toml)
    #[arg(global = true, long = "config")]
    pub config: Option<PathBuf>,

    /// Print results and errors as JSON
    #[arg(global = true, long = "json")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start a cashier session
    Login {
        /// User name from usuarios.json (default: configured cashier)
        username: Option<String>,

        /// Password; read from stdin when omitted
        #[arg(long, short)]
        password: Option<String>,
    },

    /// End the session and store its closing report
    Logout {
        /// Reported amounts, FIELD=amount (repeatable)
        #[arg(long = "note", short = 'n')]
        notes: Vec<String>,
    },

    /// Show the logged-in cashier and running session totals
    Status,

    /// Sell in one shot: every input, then every payment
    Sell {
        /// Register inputs: CODE, QTY*CODE, GRAMS*CODE, AMOUNT+CODE or text
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Payment, method:amount[:customer] (repeatable)
        #[arg(long = "pay", short = 'p', required = true)]
        payments: Vec<String>,
    },

    /// Interactive register reading one input per line
    Register,

    /// Ticket numbering
    Ticket {
        #[command(subcommand)]
        command: TicketCommand,
    },

    /// Catalog maintenance
    Product {
        #[command(subcommand)]
        command: ProductCommand,
    },

    /// Expiry and session reports
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },

    /// Discount products close to expiry
    Reprice {
        #[command(subcommand)]
        command: RepriceCommand,
    },

    /// Credit customers
    Customer {
        #[command(subcommand)]
        command: CustomerCommand,
    },

    /// Record a manual cash operation
    Op {
        #[command(subcommand)]
        command: OpCommand,
    },

    /// Cash and bank balances
    Balance {
        #[command(subcommand)]
        command: BalanceCommand,
    },

    /// Configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum TicketCommand {
    /// Number the next ticket will get today
    Next,

    /// Print a stored ticket
    Show {
        /// Ticket number, e.g. 01-03-2024-1
        number: String,
    },
}

/// Optional product fields shared by add and update.
#[derive(Debug, Args, Default)]
pub struct ProductFields {
    /// Description
    #[arg(long)]
    pub description: Option<String>,

    /// List price (per kg for weighable products)
    #[arg(long)]
    pub price: Option<String>,

    /// Standing discount in percent
    #[arg(long)]
    pub discount: Option<String>,

    /// Cost price
    #[arg(long)]
    pub cost: Option<String>,

    /// Expiry date, YYYY-MM-DD
    #[arg(long)]
    pub expiry: Option<String>,
}

/// Optional fields that travel with a restock or a count.
#[derive(Debug, Args, Default)]
pub struct StockFields {
    #[arg(long)]
    pub cost: Option<String>,

    #[arg(long)]
    pub price: Option<String>,

    /// Expiry date, YYYY-MM-DD
    #[arg(long)]
    pub expiry: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    /// Add a product
    Add {
        code: String,

        #[command(flatten)]
        fields: ProductFields,

        /// Sold by weight, price per kg
        #[arg(long)]
        weighable: bool,

        /// Initial stock
        #[arg(long)]
        stock: Option<f64>,
    },

    /// Change fields of a product
    Update {
        code: String,

        /// New code
        #[arg(long = "code")]
        new_code: Option<String>,

        #[command(flatten)]
        fields: ProductFields,

        /// Sold by weight (true/false)
        #[arg(long)]
        weighable: Option<bool>,
    },

    /// Remove a product
    Remove { code: String },

    /// List the catalog
    List,

    /// Receive stock (whole units or kg)
    Restock {
        code: String,
        quantity: i64,

        #[command(flatten)]
        fields: StockFields,
    },

    /// Overwrite stock with a manual count
    Count {
        code: String,
        quantity: f64,

        #[command(flatten)]
        fields: StockFields,
    },
}

#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// Products with an expiry date, soonest first
    Expiry {
        /// Only products expiring within this many days
        #[arg(long)]
        within: Option<i64>,
    },

    /// Closing report of a session (default: latest)
    Session { session_id: Option<String> },
}

#[derive(Debug, Subcommand)]
pub enum RepriceCommand {
    /// Discount every product inside the expiry window
    Expiring {
        /// Discount in percent
        percent: String,
    },

    /// Discount one product
    Product {
        code: String,

        /// Discount in percent
        percent: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum CustomerCommand {
    /// Register a credit customer
    Add {
        name: String,

        #[arg(long)]
        document: Option<String>,

        #[arg(long)]
        vip: bool,
    },

    /// List customers and their debt
    List,

    /// Add a manual charge
    Charge {
        name: String,
        amount: String,

        /// Ticket the charge belongs to
        #[arg(long)]
        ticket: Option<String>,
    },

    /// Register a debt payment
    Pay { name: String, amount: String },

    /// Set the VIP flag and document
    Vip {
        name: String,

        /// VIP on (true) or off (false)
        #[arg(long)]
        set: Option<bool>,

        #[arg(long)]
        document: Option<String>,
    },

    /// Remove a customer without debt
    Remove { name: String },
}

/// Amount and destination of a manual operation.
#[derive(Debug, Args)]
pub struct OpArgs {
    pub amount: String,

    /// cash or bank
    #[arg(long, default_value = "cash")]
    pub account: String,

    #[arg(long, default_value = "")]
    pub note: String,
}

#[derive(Debug, Subcommand)]
pub enum OpCommand {
    /// Money in
    Income(OpArgs),

    /// Money out
    Expense(OpArgs),
}

#[derive(Debug, Subcommand)]
pub enum BalanceCommand {
    /// Current balances and recent adjustments
    Show {
        /// How many adjustments to show
        #[arg(long, default_value_t = 10)]
        history: usize,
    },

    /// Override balances
    Set {
        #[arg(long)]
        cash: Option<String>,

        #[arg(long)]
        bank: Option<String>,

        #[arg(long, default_value = "manual adjustment")]
        note: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,

    /// Print where the config file is looked up
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sell_with_payments() {
        let cli = Cli::try_parse_from([
            "caja", "--data-dir", "/tmp/d", "sell", "3*A1", "20+B2", "--pay", "cash:50", "-p",
            "credit:10:Juan",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/d")));
        match cli.command {
            Commands::Sell { inputs, payments } => {
                assert_eq!(inputs, vec!["3*A1", "20+B2"]);
                assert_eq!(payments, vec!["cash:50", "credit:10:Juan"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_logout_notes_and_nested_commands() {
        let cli = Cli::try_parse_from(["caja", "logout", "-n", "EFECTIVO=1500", "--note", "BBVA=20"]).unwrap();
        assert!(matches!(cli.command, Commands::Logout { ref notes } if notes.len() == 2));

        let cli = Cli::try_parse_from(["caja", "op", "expense", "250", "--account", "bank", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::Op { command: OpCommand::Expense(ref args) } if args.account == "bank"
        ));

        assert!(Cli::try_parse_from(["caja", "sell", "A1"]).is_err());

        let cli = Cli::try_parse_from(["caja", "ticket", "show", "01-03-2024-1"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Ticket { command: TicketCommand::Show { ref number } } if number == "01-03-2024-1"
        ));
    }
}
