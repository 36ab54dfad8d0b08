//! # caja-core: Pure Business Logic for the Caja register
//!
//! This crate is the **heart** of Caja. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Caja Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    caja (command line)                          │   │
//! │  │    sell ──► checkout ──► logout ──► report                      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ caja-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────────┐   │   │
//! │  │   │ resolver │  │ pricing  │  │  ticket  │  │reconciliation│   │   │
//! │  │   │ matching │  │  money   │  │ payment  │  │   ledger     │   │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO FILES • NO CLOCK • PURE FUNCTIONS                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 caja-store (JSON documents)                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Ticket, Payment, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//! - [`matching`] - Approximate string similarity
//! - [`resolver`] - Operator input → product + quantity
//! - [`pricing`] - Line subtotals and repricing
//! - [`ticket`] - Ticket accumulator state machine and numbering
//! - [`payment`] - Split payments, change, VIP credit discount
//! - [`reconciliation`] - End-of-session closing report
//! - [`customer`] - Customer credit ledger
//! - [`ledger`] - Cash operations and account balances
//! - [`inventory`] - Catalog maintenance, stock, expiry
//! - [`session`] - Cashier sessions and credentials
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: File system access and the clock are FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use caja_core::money::Money;
//! use caja_core::types::DiscountRate;
//!
//! let price = Money::from_cents(1000); // $10.00
//! let discounted = price.apply_discount(DiscountRate::from_bps(1000)); // 10% off
//! assert_eq!(discounted.cents(), 900);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod customer;
pub mod error;
pub mod inventory;
pub mod ledger;
pub mod matching;
pub mod money;
pub mod payment;
pub mod pricing;
pub mod reconciliation;
pub mod resolver;
pub mod session;
pub mod ticket;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use caja_core::Money` instead of
// `use caja_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single ticket.
pub const MAX_TICKET_LINES: usize = 100;

/// Maximum units of a single line for unit-counted products.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum grams on a single weighable line (100 kg).
pub const MAX_LINE_GRAMS: i64 = 100_000;

/// Default similarity cutoff for approximate product matching.
pub const DEFAULT_FUZZY_CUTOFF: f64 = 0.8;

/// Default VIP discount on credit charges (10%).
pub const DEFAULT_VIP_DISCOUNT_BPS: u32 = 1000;

/// Products closer than this many days to expiry are repriced in bulk.
pub const DEFAULT_EXPIRY_WINDOW_DAYS: i64 = 30;

/// Closing-note fields the cashier reports at logout.
pub const DEFAULT_CLOSING_NOTE_FIELDS: [&str; 5] =
    ["SALDO SUBE", "SALDO LG", "BBVA", "MERCADOPAGO", "EFECTIVO"];
