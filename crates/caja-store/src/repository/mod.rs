//! # Repository Module
//!
//! One repository per JSON document in the data directory.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Register service                                                      │
//! │       │                                                                 │
//! │       │  store.products().update(|catalog| inventory::restock(...))    │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── all(&self)             strict read                                │
//! │  ├── all_or_empty(&self)    lenient read (display only)                │
//! │  ├── get_by_code(&self, code)                                          │
//! │  └── update(&self, f)       read, mutate with core rules, write        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  JsonDocument<Vec<Product>>  →  inventario.json                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Business rules stay in `caja-core`; repositories only load, hand the
//! data to a closure and persist the result.
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - catalog
//! - [`TicketRepository`](ticket::TicketRepository) - closed tickets, numbering
//! - [`CustomerRepository`](customer::CustomerRepository) - credit customers
//! - [`OperationRepository`](operation::OperationRepository) - cash income/expense log
//! - [`BalanceRepository`](balance::BalanceRepository) - cash and bank balances
//! - [`ReportRepository`](report::ReportRepository) - closing reports
//! - [`SessionRepository`](session::SessionRepository) - active session and login log
//! - [`UserRepository`](user::UserRepository) - cashier credentials

pub mod balance;
pub mod customer;
pub mod operation;
pub mod product;
pub mod report;
pub mod session;
pub mod ticket;
pub mod user;
