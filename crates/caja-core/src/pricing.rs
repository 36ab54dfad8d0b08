//! # Pricing
//!
//! Line subtotals, weight-from-amount conversion and expiry repricing.
//!
//! ```text
//!   effective_unit_price = price × (1 - discount)          (half-up, cents)
//!
//!   Units:  subtotal = units × effective_unit_price
//!   Grams:  subtotal = grams / 1000 × effective_unit_price (half-up, cents)
//! ```

use crate::error::{CoreResult, ValidationError};
use crate::money::{round_up_price, Money};
use crate::types::{DiscountRate, LineItem, Product, Unit};

/// Subtotal of `quantity` at `unit_price`, in the line's unit.
///
/// ## Example
/// ```rust
/// use caja_core::money::Money;
/// use caja_core::pricing::line_subtotal;
/// use caja_core::types::Unit;
///
/// let per_kg = Money::from_cents(400);
/// assert_eq!(line_subtotal(per_kg, 5000, Unit::Grams).cents(), 2000);
/// ```
pub fn line_subtotal(unit_price: Money, quantity: i64, unit: Unit) -> Money {
    match unit {
        Unit::Units => unit_price.multiply_quantity(quantity),
        Unit::Grams => unit_price.mul_ratio(quantity, 1000),
    }
}

/// Builds a ticket line for `product`, freezing its current effective price.
pub fn price_line(product: &Product, quantity: i64, unit: Unit) -> LineItem {
    let unit_price = product.effective_price();
    LineItem {
        code: product.code.clone(),
        description: product.description.clone(),
        quantity,
        unit,
        unit_price,
        subtotal: line_subtotal(unit_price, quantity, unit),
    }
}

/// Recomputes a line after its quantity changed. The unit never changes.
pub fn reprice_line(line: &mut LineItem, quantity: i64) {
    line.quantity = quantity;
    line.subtotal = line_subtotal(line.unit_price, quantity, line.unit);
}

/// Grams of a weighable product that `amount` buys at `price_per_kg`.
///
/// The list price (before discount) is used, so the weighed amount is what
/// the customer asked for at the shelf price.
pub fn grams_for_amount(amount: Money, price_per_kg: Money) -> CoreResult<i64> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        }
        .into());
    }
    if !price_per_kg.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "price per kilogram".to_string(),
        }
        .into());
    }
    Money::from_cents(1000)
        .checked_mul_ratio(amount.cents(), price_per_kg.cents())
        .map(|grams| grams.cents())
        .ok_or_else(|| {
            ValidationError::InvalidFormat {
                field: "amount".to_string(),
                reason: format!("{} buys more than can be weighed", amount),
            }
            .into()
        })
}

/// New list price when `discount` is applied to stock close to expiry.
///
/// The discounted price is rounded up with [`round_up_price`], so shelf
/// prices stay on ..00 / ..50 steps. A zero discount leaves the price alone.
pub fn expiry_price(price: Money, discount: DiscountRate) -> Money {
    if discount.is_zero() {
        return price;
    }
    round_up_price(price.apply_discount(discount))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_unit_lines() {
        let product = Product::new("A1", "Arroz", Money::from_cents(1000), false);
        let line = price_line(&product, 3, Unit::Units);
        assert_eq!(line.subtotal.cents(), 3000);
        assert_eq!(line.unit_price.cents(), 1000);
    }

    #[test]
    fn test_weighable_subtotal_rounds_to_cent() {
        // 333 g at $12.99/kg = 4.32567 → 4.33
        assert_eq!(line_subtotal(Money::from_cents(1299), 333, Unit::Grams).cents(), 433);
        // 1 g at $4.00/kg = 0.4 cents → 0
        assert_eq!(line_subtotal(Money::from_cents(400), 1, Unit::Grams).cents(), 0);
    }

    #[test]
    fn test_discount_applies_to_unit_price() {
        let mut product = Product::new("B2", "Bananas", Money::from_cents(400), true);
        product.discount = DiscountRate::from_bps(2500);
        let line = price_line(&product, 5000, Unit::Grams);
        assert_eq!(line.unit_price.cents(), 300);
        assert_eq!(line.subtotal.cents(), 1500);
    }

    #[test]
    fn test_reprice_line_keeps_unit() {
        let product = Product::new("B2", "Bananas", Money::from_cents(400), true);
        let mut line = price_line(&product, 5000, Unit::Grams);
        reprice_line(&mut line, 2500);
        assert_eq!(line.unit, Unit::Grams);
        assert_eq!(line.subtotal.cents(), 1000);
    }

    #[test]
    fn test_grams_for_amount() {
        assert_eq!(
            grams_for_amount(Money::from_cents(2000), Money::from_cents(400)).unwrap(),
            5000
        );
        // $10 at $3.00/kg = 3333.33 g → 3333
        assert_eq!(
            grams_for_amount(Money::from_cents(1000), Money::from_cents(300)).unwrap(),
            3333
        );
        assert!(grams_for_amount(Money::zero(), Money::from_cents(400)).is_err());
        assert!(grams_for_amount(Money::from_cents(100), Money::zero()).is_err());

        // 1000 × amount / 1 cent does not fit in i64
        assert!(matches!(
            grams_for_amount(Money::from_cents(i64::MAX / 100), Money::from_cents(1)),
            Err(CoreError::Validation(ValidationError::InvalidFormat { .. }))
        ));
    }

    #[test]
    fn test_expiry_price() {
        let price = Money::from_major_minor(600, 0);
        // 600 - 10% = 540 → 550
        assert_eq!(
            expiry_price(price, DiscountRate::from_bps(1000)),
            Money::from_major_minor(550, 0)
        );
        assert_eq!(expiry_price(price, DiscountRate::zero()), price);
    }
}
