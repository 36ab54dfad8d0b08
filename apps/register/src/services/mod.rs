//! # Services
//!
//! Orchestration between the pure rules in `caja-core` and the documents
//! in `caja-store`. Commands parse input and print; services do the work.
//!
//! ```text
//! services/
//! ├── mod.rs        ◄─── You are here
//! ├── checkout.rs   ◄─── Ticket building, payments, close side effects
//! ├── session.rs    ◄─── Login, logout, closing reports
//! ├── inventory.rs  ◄─── Catalog edits, stock, expiry, repricing
//! ├── customer.rs   ◄─── Credit customers and debt
//! └── ledger.rs     ◄─── Cash operations and balances
//! ```
//!
//! Every service borrows the [`Store`](caja_store::Store) and the
//! [`AppConfig`](crate::config::AppConfig); none of them keeps state
//! between calls.

pub mod checkout;
pub mod customer;
pub mod inventory;
pub mod ledger;
pub mod session;

pub use checkout::{CheckoutService, PaymentRequest, SaleReceipt};
pub use customer::CustomerService;
pub use inventory::{InventoryService, ProductPatch};
pub use ledger::LedgerService;
pub use session::{LogoutOutcome, SessionService};
