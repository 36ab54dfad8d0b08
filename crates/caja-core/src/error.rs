//! # Error Types
//!
//! Domain-specific error types for caja-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  caja-core errors (this file)                                          │
//! │  ├── CoreError        - Lookup, state machine, payment, ledger rules   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  caja-store errors (separate crate)                                    │
//! │  └── StoreError       - File read/write failures                       │
//! │                                                                         │
//! │  register errors (in app)                                              │
//! │  └── AppError         - What the operator sees (code + message)        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → AppError → stderr                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error aborts the operation before anything is mutated.

use thiserror::Error;

use crate::money::Money;
use crate::types::{PaymentMethod, TicketState};

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No product matches the operator input.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// More than one product matches the operator input.
    ///
    /// ## User Workflow
    /// ```text
    /// Input: "leche"
    ///      │
    ///      ▼
    /// Fuzzy match: LECHE ENTERA, LECHE DESCREMADA
    ///      │
    ///      ▼
    /// AmbiguousMatch { query: "leche", candidates: [..] }
    ///      │
    ///      ▼
    /// Operator refines the input (never auto-picked)
    /// ```
    #[error("'{query}' matches {} products: {}", candidates.len(), candidates.join(", "))]
    AmbiguousMatch {
        query: String,
        candidates: Vec<String>,
    },

    /// The `<amount>+<code>` form was used on a unit-counted product.
    #[error("Product {code} is not sold by weight")]
    NotWeighable { code: String },

    /// A weighable product was entered without a weight.
    #[error("Product {code} is sold by weight: enter <grams>*{code} or <amount>+{code}")]
    WeightRequired { code: String },

    /// Unit-counted products only accept whole quantities.
    #[error("Quantity for {code} must be a whole number of units")]
    FractionalQuantity { code: String },

    /// Ticket is not in a state that allows the requested operation.
    #[error("Ticket is {current:?}, cannot {operation}")]
    InvalidTicketState {
        current: TicketState,
        operation: String,
    },

    /// Checkout needs at least one line with a positive total.
    #[error("Ticket has no billable lines")]
    EmptyTicket,

    /// Line index does not exist on the ticket.
    #[error("Ticket has no line {0}")]
    LineNotFound(usize),

    /// Ticket has exceeded maximum allowed lines.
    #[error("Ticket cannot have more than {max} lines")]
    TicketTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A non-cash payment larger than what is still owed.
    #[error("{method} payment of {amount} exceeds remaining {remaining}")]
    Overpayment {
        method: PaymentMethod,
        amount: Money,
        remaining: Money,
    },

    /// Ticket cannot close while money is still owed.
    #[error("Payment incomplete: {remaining} still due")]
    PaymentIncomplete { remaining: Money },

    /// Credit payments must name a customer.
    #[error("Credit payment requires a customer")]
    CustomerRequired,

    /// Customer lookup failed.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// A debt payment larger than the outstanding debt.
    #[error("Payment of {amount} exceeds debt of {debt}")]
    DebtExceeded { debt: Money, amount: Money },

    /// Customers with outstanding debt cannot be deleted.
    #[error("Customer {name} still owes {debt}")]
    CustomerHasDebt { name: String, debt: Money },

    /// Login rejected.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Payment amount is invalid.
    #[error("Invalid payment amount: {reason}")]
    InvalidPaymentAmount { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when operator input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed number, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., duplicate product code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
