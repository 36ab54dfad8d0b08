//! # Domain Types
//!
//! Core domain types shared by the register, the store and the reports.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Ticket      │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  code (unique)  │   │  ticket_number  │   │  method         │       │
//! │  │  description    │   │  session_id     │   │  amount         │       │
//! │  │  price          │   │  line_items     │   │  customer?      │       │
//! │  │  is_weighable   │   │  total, change  │   │  discount       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  DiscountRate   │   │  TicketState    │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  Open           │   │  Cash           │       │
//! │  │  1000 = 10%     │   │  AwaitingPayment│   │  Transfer       │       │
//! │  └─────────────────┘   │  Closed         │   │  CardTerminal   │       │
//! │                        │  Abandoned      │   │  Credit         │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `LineItem` freezes code, description and unit price at insertion time,
//! so later catalog edits never rewrite a closed ticket.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Discount Rate
// =============================================================================

/// Discount represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1000 bps = 10% (the VIP credit discount)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Creates a discount rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Parses a percentage typed by the operator ("10", "12.5").
    ///
    /// ## Example
    /// ```rust
    /// use caja_core::types::DiscountRate;
    ///
    /// assert_eq!(DiscountRate::parse_percent("12.5"), Some(DiscountRate::from_bps(1250)));
    /// assert_eq!(DiscountRate::parse_percent("101"), None);
    /// ```
    pub fn parse_percent(input: &str) -> Option<Self> {
        // Two-decimal percent and basis points share the same integer scale.
        let bps = Money::parse(input)?.cents();
        if (0..=10_000).contains(&bps) {
            Some(DiscountRate(bps as u32))
        } else {
            None
        }
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero discount.
    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    /// Checks if the discount is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for DiscountRate {
    fn default() -> Self {
        DiscountRate::zero()
    }
}

impl fmt::Display for DiscountRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percentage())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog (`inventario.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Business identifier, unique ignoring case.
    pub code: String,

    /// Display name shown to the cashier and searched by fuzzy matching.
    pub description: String,

    /// List price before discount. Per kilogram when `is_weighable`.
    pub price: Money,

    /// Standing discount applied at sale time.
    #[serde(default)]
    pub discount: DiscountRate,

    /// Sold by weight (grams at the register, kilograms in stock).
    #[serde(default)]
    pub is_weighable: bool,

    /// Units on hand, or kilograms when weighable. May go negative.
    #[serde(default)]
    pub stock_quantity: f64,

    /// Last purchase cost.
    #[serde(default)]
    pub cost: Option<Money>,

    /// Date of the last restock.
    #[serde(default)]
    pub ingress_date: Option<NaiveDate>,

    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
}

impl Product {
    /// Creates a product with no discount, stock or dates.
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        price: Money,
        is_weighable: bool,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            price,
            discount: DiscountRate::zero(),
            is_weighable,
            stock_quantity: 0.0,
            cost: None,
            ingress_date: None,
            expiry_date: None,
        }
    }

    /// Unit price after the product's standing discount.
    #[inline]
    pub fn effective_price(&self) -> Money {
        self.price.apply_discount(self.discount)
    }

    /// Case-insensitive code comparison.
    #[inline]
    pub fn has_code(&self, code: &str) -> bool {
        self.code.to_lowercase() == code.trim().to_lowercase()
    }

    /// Unit the register records this product in.
    #[inline]
    pub fn sale_unit(&self) -> Unit {
        if self.is_weighable {
            Unit::Grams
        } else {
            Unit::Units
        }
    }
}

// =============================================================================
// Line Items
// =============================================================================

/// Quantity unit of a ticket line, fixed when the line is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Whole units of a counted product.
    Units,
    /// Whole grams of a weighable product.
    Grams,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Units => write!(f, "u"),
            Unit::Grams => write!(f, "g"),
        }
    }
}

/// A line on a ticket.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product code at time of sale (frozen).
    pub code: String,
    /// Description at time of sale (frozen).
    pub description: String,
    /// Units or grams, per `unit`.
    pub quantity: i64,
    pub unit: Unit,
    /// Effective unit price (per kg for grams) at time of sale (frozen).
    pub unit_price: Money,
    pub subtotal: Money,
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a share of the ticket was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash. The only method that may exceed what is owed.
    Cash,
    /// Bank transfer.
    Transfer,
    /// Card on the external terminal.
    CardTerminal,
    /// Added to a customer's running debt.
    Credit,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::Transfer,
        PaymentMethod::CardTerminal,
        PaymentMethod::Credit,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::CardTerminal => "card_terminal",
            PaymentMethod::Credit => "credit",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "efectivo" => Ok(PaymentMethod::Cash),
            "transfer" | "transferencia" => Ok(PaymentMethod::Transfer),
            "card" | "card_terminal" | "posnet" => Ok(PaymentMethod::CardTerminal),
            "credit" | "cuenta_corriente" | "fiado" => Ok(PaymentMethod::Credit),
            _ => Err(ValidationError::NotAllowed {
                field: "payment method".to_string(),
                allowed: PaymentMethod::ALL.iter().map(|m| m.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A payment towards a ticket.
/// A ticket can have multiple payments for split tender scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub method: PaymentMethod,
    /// Amount received. For credit, the amount added to the customer's debt.
    pub amount: Money,
    /// Customer name, credit only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    /// VIP discount granted on this credit share.
    #[serde(default, skip_serializing_if = "Money::is_zero")]
    pub discount: Money,
}

impl Payment {
    /// A payment with no customer and no discount.
    pub fn new(method: PaymentMethod, amount: Money) -> Self {
        Self {
            method,
            amount,
            customer: None,
            discount: Money::zero(),
        }
    }
}

// =============================================================================
// Ticket
// =============================================================================

/// Lifecycle of a ticket while it is being built.
///
/// ```text
///   Open ──begin_checkout──► AwaitingPayment ──close──► Closed
///    │  ◄──cancel_checkout──┘
///    └──abandon (no lines)──► Abandoned
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketState {
    Open,
    AwaitingPayment,
    Closed,
    Abandoned,
}

impl Default for TicketState {
    fn default() -> Self {
        TicketState::Open
    }
}

/// A closed ticket (`tickets.json`). Immutable once persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// `dd-mm-yyyy-n`, sequence resets daily.
    pub ticket_number: String,
    pub day: NaiveDate,
    pub issued_at: NaiveDateTime,
    pub cashier: String,
    pub session_id: String,
    pub line_items: Vec<LineItem>,
    /// Sum of line subtotals.
    pub total: Money,
    /// VIP discount granted on credit payments.
    #[serde(default)]
    pub discount: Money,
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub change: Money,
}

impl Ticket {
    /// What the customer owed after discounts.
    #[inline]
    pub fn amount_due(&self) -> Money {
        self.total - self.discount
    }

    /// Sum of all payments received.
    pub fn paid(&self) -> Money {
        self.payments.iter().map(|p| p.amount).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
