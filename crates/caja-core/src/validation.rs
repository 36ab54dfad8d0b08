//! # Validation Module
//!
//! Input validation utilities for the register.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Command line (clap)                                          │
//! │  └── Type validation (argument parsing)                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Business rule validation (codes, amounts, quantities)             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Domain operations                                            │
//! │  └── Uniqueness, state machine, debt limits                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use caja_core::validation::{validate_code, validate_quantity};
//!
//! assert!(validate_code("A1").is_ok());
//! assert!(validate_quantity(5).is_ok());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{DiscountRate, Product};
use crate::{MAX_ITEM_QUANTITY, MAX_LINE_GRAMS, MAX_TICKET_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product code.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - No whitespace (codes are typed at the register as a single token)
///
/// ## Example
/// ```rust
/// use caja_core::validation::validate_code;
///
/// assert!(validate_code("COKE-330").is_ok());
/// assert!(validate_code("").is_err());
/// assert!(validate_code("has space").is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.chars().count() > 50 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 50,
        });
    }

    // '*' and '+' are quantity operators in the register grammar.
    if code
        .chars()
        .any(|c| c.is_whitespace() || c == '*' || c == '+')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must not contain spaces, '*' or '+'".to_string(),
        });
    }

    Ok(())
}

/// Validates a product description.
pub fn validate_description(description: &str) -> ValidationResult<()> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if description.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a customer name.
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customer name".to_string(),
        });
    }

    if name.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "customer name".to_string(),
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Register: "3*A1"                                                       │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(3) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"     │
/// │       └── OK → line added                                              │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a weight in whole grams.
pub fn validate_grams(grams: i64) -> ValidationResult<()> {
    if grams <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "grams".to_string(),
        });
    }

    if grams > MAX_LINE_GRAMS {
        return Err(ValidationError::OutOfRange {
            field: "grams".to_string(),
            min: 1,
            max: MAX_LINE_GRAMS,
        });
    }

    Ok(())
}

/// Validates a price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
///
/// ## Example
/// ```rust
/// use caja_core::money::Money;
/// use caja_core::validation::validate_price;
///
/// assert!(validate_price(Money::from_cents(1099)).is_ok());
/// assert!(validate_price(Money::zero()).is_ok());
/// assert!(validate_price(Money::from_cents(-100)).is_err());
/// ```
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an amount of money that must be strictly positive
/// (payments, debt charges, cash operations).
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a discount rate.
///
/// ## Rules
/// - Must be between 0 and 10000 bps (0% to 100%)
pub fn validate_discount(rate: DiscountRate) -> ValidationResult<()> {
    if rate.bps() > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates ticket size before adding one more line.
pub fn validate_ticket_size(current_lines: usize) -> ValidationResult<()> {
    if current_lines >= MAX_TICKET_LINES {
        return Err(ValidationError::OutOfRange {
            field: "ticket lines".to_string(),
            min: 0,
            max: MAX_TICKET_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates every field of a product before it enters the catalog.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_code(&product.code)?;
    validate_description(&product.description)?;
    validate_price(product.price)?;
    validate_discount(product.discount)?;
    if let Some(cost) = product.cost {
        if cost.is_negative() {
            return Err(ValidationError::OutOfRange {
                field: "cost".to_string(),
                min: 0,
                max: i64::MAX,
            });
        }
    }
    if !product.stock_quantity.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "stock".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_code() {
        assert!(validate_code("COKE-330").is_ok());
        assert!(validate_code("A1").is_ok());
        assert!(validate_code("leche_1l").is_ok());

        assert!(validate_code("").is_err());
        assert!(validate_code("   ").is_err());
        assert!(validate_code("has space").is_err());
        assert!(validate_code("3*A1").is_err());
        assert!(validate_code(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_description() {
        assert!(validate_description("Leche entera 1L").is_ok());
        assert!(validate_description("").is_err());
        assert!(validate_description(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_grams() {
        assert!(validate_grams(1).is_ok());
        assert!(validate_grams(5000).is_ok());
        assert!(validate_grams(0).is_err());
        assert!(validate_grams(MAX_LINE_GRAMS + 1).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("amount", Money::from_cents(1)).is_ok());
        assert!(validate_amount("amount", Money::zero()).is_err());
        assert!(validate_amount("amount", Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_discount() {
        assert!(validate_discount(DiscountRate::zero()).is_ok());
        assert!(validate_discount(DiscountRate::from_bps(10_000)).is_ok());
        assert!(validate_discount(DiscountRate::from_bps(10_001)).is_err());
    }

    #[test]
    fn test_validate_ticket_size() {
        assert!(validate_ticket_size(0).is_ok());
        assert!(validate_ticket_size(MAX_TICKET_LINES - 1).is_ok());
        assert!(validate_ticket_size(MAX_TICKET_LINES).is_err());
    }

    #[test]
    fn test_validate_product() {
        let mut product = Product::new("A1", "Arroz", Money::from_cents(1000), false);
        assert!(validate_product(&product).is_ok());

        product.cost = Some(Money::from_cents(-1));
        assert!(validate_product(&product).is_err());

        product.cost = None;
        product.price = Money::from_cents(-5);
        assert!(validate_product(&product).is_err());
    }
}
