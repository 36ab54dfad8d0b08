//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With floats:                                                           │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every division (discount, grams → kg) rounds half-up to the cent    │
//! │    exactly once, in i128, at the point it happens.                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use caja_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(1099); // $10.99
//!
//! // Arithmetic operations
//! let doubled = price * 2;            // $21.98
//! let total = price + Money::from_cents(500); // $15.99
//!
//! // Operator input is parsed as a decimal string, never through f64
//! assert_eq!(Money::parse("20.5"), Some(Money::from_cents(2050)));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::types::DiscountRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for stock-value deltas, expenses
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serialized as a bare integer**: `"price": 1099` in every JSON document
///
/// ## User Workflow Context
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Money is Used                                  │
/// │                                                                         │
/// │  Product.price ──► LineItem.unit_price ──► LineItem.subtotal           │
/// │                                                  │                      │
/// │  Ticket.total ◄──────────────────────────────────┘                      │
/// │       │                                                                 │
/// │       └──► Payment.amount ──► ClosingReport buckets                    │
/// │                                                                         │
/// │  EVERY monetary value in the system flows through this type            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use caja_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use caja_core::money::Money;
    ///
    /// let price = Money::from_major_minor(10, 99); // $10.99
    /// assert_eq!(price.cents(), 1099);
    ///
    /// let negative = Money::from_major_minor(-5, 50); // -$5.50
    /// assert_eq!(negative.cents(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Parses a decimal amount typed by the operator.
    ///
    /// Accepts `.` or `,` as the decimal separator and an optional leading
    /// sign. More than two decimals round half-up to the cent. Returns
    /// `None` for anything that is not a plain decimal number.
    ///
    /// ## Example
    /// ```rust
    /// use caja_core::money::Money;
    ///
    /// assert_eq!(Money::parse("120"), Some(Money::from_cents(12000)));
    /// assert_eq!(Money::parse("4,5"), Some(Money::from_cents(450)));
    /// assert_eq!(Money::parse("0.125"), Some(Money::from_cents(13)));
    /// assert_eq!(Money::parse("12a"), None);
    /// ```
    pub fn parse(input: &str) -> Option<Money> {
        let input = input.trim();
        let (negative, digits) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input.strip_prefix('+').unwrap_or(input)),
        };

        let (whole, frac) = match digits.find(['.', ',']) {
            Some(pos) => (&digits[..pos], &digits[pos + 1..]),
            None => (digits, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return None;
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }

        let whole_value: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };

        let mut frac_digits = frac.chars().map(|c| c as i64 - '0' as i64);
        let tenths = frac_digits.next().unwrap_or(0);
        let hundredths = frac_digits.next().unwrap_or(0);
        let round_up = frac_digits.next().map_or(false, |d| d >= 5);

        let cents = whole_value
            .checked_mul(100)?
            .checked_add(tenths * 10 + hundredths + i64::from(round_up))?;

        Some(Money(if negative { -cents } else { cents }))
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    ///
    /// ## Example
    /// ```rust
    /// use caja_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).major(), 10);
    /// assert_eq!(Money::from_cents(-550).major(), -5);
    /// ```
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies by `numerator / denominator`, rounding half-up (away from
    /// zero) to the cent.
    ///
    /// This is the single rounding point for every fractional amount:
    /// weighable subtotals (`grams / 1000`) and percentage discounts
    /// (`bps / 10000`) both go through here.
    ///
    /// ## Example
    /// ```rust
    /// use caja_core::money::Money;
    ///
    /// // 333 g of a $12.99/kg product = $4.32567 → $4.33
    /// let price = Money::from_cents(1299);
    /// assert_eq!(price.mul_ratio(333, 1000).cents(), 433);
    /// ```
    pub fn mul_ratio(&self, numerator: i64, denominator: i64) -> Money {
        if denominator == 0 {
            return Money::zero();
        }
        // Out of range saturates toward the sign of the result.
        self.checked_mul_ratio(numerator, denominator).unwrap_or_else(|| {
            if self.0.signum() * numerator.signum() * denominator.signum() < 0 {
                Money(i64::MIN)
            } else {
                Money(i64::MAX)
            }
        })
    }

    /// Like [`mul_ratio`](Self::mul_ratio), but `None` when the denominator
    /// is zero or the result does not fit in an `i64` of cents.
    pub fn checked_mul_ratio(&self, numerator: i64, denominator: i64) -> Option<Money> {
        if denominator == 0 {
            return None;
        }
        let product = self.0 as i128 * numerator as i128;
        let denominator = denominator as i128;
        let (product, denominator) = if denominator < 0 {
            (-product, -denominator)
        } else {
            (product, denominator)
        };
        let half = denominator / 2;
        let rounded = if product >= 0 {
            (product + half) / denominator
        } else {
            -((-product + half) / denominator)
        };
        i64::try_from(rounded).ok().map(Money)
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Applies a percentage discount and returns the discounted amount.
    ///
    /// The result is `amount × (1 - rate)` rounded half-up once, so the
    /// discounted price is exact to the cent.
    ///
    /// ## Example
    /// ```rust
    /// use caja_core::money::Money;
    /// use caja_core::types::DiscountRate;
    ///
    /// let credit = Money::from_cents(5000); // $50.00
    /// let charged = credit.apply_discount(DiscountRate::from_bps(1000)); // 10% off
    /// assert_eq!(charged.cents(), 4500); // $45.00
    /// ```
    pub fn apply_discount(&self, rate: DiscountRate) -> Money {
        if rate.is_zero() {
            return *self;
        }
        let keep_bps = 10_000 - i64::from(rate.bps().min(10_000));
        self.mul_ratio(keep_bps, 10_000)
    }

    /// Returns the larger of `self` and zero.
    #[inline]
    pub fn clamp_non_negative(self) -> Money {
        if self.0 < 0 {
            Money::zero()
        } else {
            self
        }
    }

    /// Formats the amount as a plain decimal without a currency symbol.
    ///
    /// ## Example
    /// ```rust
    /// use caja_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(-550).to_decimal_string(), "-5.50");
    /// ```
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.major().abs(), self.cents_part())
    }
}

// =============================================================================
// Bulk Repricing
// =============================================================================

/// Rounds a price up to the next multiple of 50 currency units.
///
/// Used only when repricing stock that is about to expire, never at sale
/// time. Prices that are already a multiple of 100 stay put. Below the
/// halfway mark the price climbs to the next `..50`, from there on to the
/// next `..00`.
///
/// ```text
///   533.00 → 550.00     550.00 → 600.00     1000.00 → 1000.00
/// ```
///
/// ## Example
/// ```rust
/// use caja_core::money::{round_up_price, Money};
///
/// assert_eq!(round_up_price(Money::from_major_minor(533, 0)), Money::from_major_minor(550, 0));
/// ```
pub fn round_up_price(price: Money) -> Money {
    const HUNDRED: i64 = 100 * 100;
    const FIFTY: i64 = 50 * 100;

    let cents = price.cents();
    let remainder = cents.rem_euclid(HUNDRED);
    if remainder == 0 {
        return price;
    }
    let base = cents - remainder;
    if remainder < FIFTY {
        Money::from_cents(base + FIFTY)
    } else {
        Money::from_cents(base + HUNDRED)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// The register's configured currency symbol is applied by the app layer.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.major().abs(), self.cents_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
