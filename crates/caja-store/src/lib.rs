//! # caja-store: File Store for the Caja register
//!
//! This crate persists the register's data as JSON documents in a single
//! data directory, using `tokio::fs` for async file access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Caja Data Flow                                  │
//! │                                                                         │
//! │  caja CLI command (sell, logout, restock, ...)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  caja-store (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    Store      │    │  Repositories │    │  Bootstrap   │  │   │
//! │  │   │  (store.rs)   │    │ (product.rs)  │    │              │  │   │
//! │  │   │               │    │               │    │ missing docs │  │   │
//! │  │   │ data_dir      │◄───│ TicketRepo    │    │ → empty      │  │   │
//! │  │   │               │    │ CustomerRepo  │    │              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │                               │   │
//! │  │                        JsonDocument<T>                          │   │
//! │  │                    (strict / lenient / atomic)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Data directory                                                 │   │
//! │  │   inventario.json  tickets.json  clientes.json  balance.json    │   │
//! │  │   registro_operaciones.json  cajas_rendidas.json  session.json  │   │
//! │  │   sesiones.json  usuarios.json                                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - Data directory configuration and the `Store` handle
//! - [`document`] - Typed JSON documents with atomic writes
//! - [`bootstrap`] - Creates missing documents
//! - [`error`] - Store error types
//! - [`repository`] - One repository per document
//!
//! ## Usage
//!
//! ```rust,ignore
//! use caja_store::{Store, StoreConfig};
//!
//! let store = Store::open(StoreConfig::new("./datos")).await?;
//!
//! let next = store.tickets().next_number(today).await?;
//! let catalog = store.products().all().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bootstrap;
pub mod document;
pub mod error;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use document::JsonDocument;
pub use error::{StoreError, StoreResult};
pub use store::{Store, StoreConfig};

// Repository re-exports for convenience
pub use repository::balance::BalanceRepository;
pub use repository::customer::CustomerRepository;
pub use repository::operation::OperationRepository;
pub use repository::product::ProductRepository;
pub use repository::report::ReportRepository;
pub use repository::session::SessionRepository;
pub use repository::ticket::TicketRepository;
pub use repository::user::UserRepository;
