//! # Product Resolver
//!
//! Turns what the cashier types into exactly one product and a quantity.
//!
//! ## Input Grammar
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  "a1"          → 1 unit of A1                                           │
//! │  "3*a1"        → 3 units of A1     (grams when A1 is weighable)         │
//! │  "20+b2"       → $20.00 worth of B2, weighable only                     │
//! │  "leche ent"   → fuzzy match on code + description tokens               │
//! │                                                                         │
//! │  '+' is checked before '*'. Input is trimmed and lower-cased.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Matching Order
//! 1. Exact case-insensitive code match wins outright.
//! 2. Otherwise every search token must approximately match a token of
//!    `code + " " + description` ([`crate::matching`]).
//! 3. Zero matches → `ProductNotFound`, several → `AmbiguousMatch`.

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::matching::all_tokens_match;
use crate::money::Money;
use crate::pricing::grams_for_amount;
use crate::types::{Product, Unit};
use crate::validation::{validate_grams, validate_quantity};

// =============================================================================
// Parsed Input
// =============================================================================

/// Quantity part of the operator input, before the product is known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuantityRequest {
    /// Plain identifier.
    Default,
    /// `<qty>*<identifier>`.
    Multiplier(f64),
    /// `<amount>+<identifier>`.
    Amount(Money),
}

/// Operator input split into quantity and identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedInput {
    pub identifier: String,
    pub request: QuantityRequest,
}

/// Parses the register grammar. Does not look at the catalog.
///
/// ## Example
/// ```rust
/// use caja_core::resolver::{parse_input, QuantityRequest};
///
/// let parsed = parse_input(" 3*A1 ").unwrap();
/// assert_eq!(parsed.identifier, "a1");
/// assert_eq!(parsed.request, QuantityRequest::Multiplier(3.0));
/// ```
pub fn parse_input(input: &str) -> CoreResult<ParsedInput> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return Err(ValidationError::Required {
            field: "product".to_string(),
        }
        .into());
    }

    let (request, identifier) = if let Some((amount, identifier)) = input.split_once('+') {
        let amount = Money::parse(amount).ok_or_else(|| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: format!("'{}' is not a number", amount.trim()),
        })?;
        (QuantityRequest::Amount(amount), identifier)
    } else if let Some((qty, identifier)) = input.split_once('*') {
        let qty = parse_quantity(qty)?;
        (QuantityRequest::Multiplier(qty), identifier)
    } else {
        (QuantityRequest::Default, input.as_str())
    };

    let identifier = identifier.trim();
    if identifier.is_empty() {
        return Err(ValidationError::Required {
            field: "product".to_string(),
        }
        .into());
    }

    Ok(ParsedInput {
        identifier: identifier.to_string(),
        request,
    })
}

/// Converts an integral `f64` to `i64`, rejecting values outside its range.
fn whole_number(value: f64, field: &str) -> CoreResult<i64> {
    // 2^63 is exact in f64; anything at or beyond it does not fit.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if !(-LIMIT..LIMIT).contains(&value) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("{} is too large", value),
        }
        .into());
    }
    Ok(value as i64)
}

fn parse_quantity(raw: &str) -> CoreResult<f64> {
    let raw = raw.trim().replace(',', ".");
    let parsed: f64 = raw.parse().map_err(|_| ValidationError::InvalidFormat {
        field: "quantity".to_string(),
        reason: format!("'{}' is not a number", raw),
    })?;
    if !parsed.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: format!("'{}' is not a number", raw),
        }
        .into());
    }
    Ok(parsed)
}

// =============================================================================
// Product Lookup
// =============================================================================

/// Finds the single product an identifier refers to.
pub fn find_product<'a>(
    catalog: &'a [Product],
    identifier: &str,
    cutoff: f64,
) -> CoreResult<&'a Product> {
    if let Some(product) = catalog.iter().find(|p| p.has_code(identifier)) {
        return Ok(product);
    }

    let search: Vec<&str> = identifier.split_whitespace().collect();
    let matches: Vec<&Product> = catalog
        .iter()
        .filter(|product| {
            let haystack = format!("{} {}", product.code, product.description).to_lowercase();
            let target: Vec<&str> = haystack.split_whitespace().collect();
            all_tokens_match(&search, &target, cutoff)
        })
        .collect();

    match matches.as_slice() {
        [] => Err(CoreError::ProductNotFound(identifier.to_string())),
        [single] => Ok(single),
        several => Err(CoreError::AmbiguousMatch {
            query: identifier.to_string(),
            candidates: several
                .iter()
                .map(|p| format!("{} ({})", p.code, p.description))
                .collect(),
        }),
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// A product plus the validated quantity to put on a ticket line.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedItem<'a> {
    pub product: &'a Product,
    /// Units, or grams when `unit` is `Grams`.
    pub quantity: i64,
    pub unit: Unit,
}

/// Resolves operator input against the catalog.
///
/// ## Example
/// ```rust
/// use caja_core::money::Money;
/// use caja_core::resolver::resolve;
/// use caja_core::types::{Product, Unit};
///
/// let catalog = vec![Product::new("B2", "Bananas", Money::from_cents(400), true)];
/// let item = resolve(&catalog, "20+b2", 0.8).unwrap();
/// assert_eq!(item.quantity, 5000);
/// assert_eq!(item.unit, Unit::Grams);
/// ```
pub fn resolve<'a>(catalog: &'a [Product], input: &str, cutoff: f64) -> CoreResult<ResolvedItem<'a>> {
    let parsed = parse_input(input)?;
    let product = find_product(catalog, &parsed.identifier, cutoff)?;

    let quantity = match (parsed.request, product.is_weighable) {
        (QuantityRequest::Default, false) => 1,
        (QuantityRequest::Default, true) => {
            return Err(CoreError::WeightRequired {
                code: product.code.clone(),
            })
        }
        (QuantityRequest::Multiplier(qty), false) => {
            if qty.fract() != 0.0 {
                return Err(CoreError::FractionalQuantity {
                    code: product.code.clone(),
                });
            }
            let units = whole_number(qty, "quantity")?;
            validate_quantity(units)?;
            units
        }
        (QuantityRequest::Multiplier(grams), true) => {
            if grams <= 0.0 {
                return Err(ValidationError::MustBePositive {
                    field: "grams".to_string(),
                }
                .into());
            }
            let grams = whole_number(grams.round(), "grams")?;
            validate_grams(grams)?;
            grams
        }
        (QuantityRequest::Amount(_), false) => {
            return Err(CoreError::NotWeighable {
                code: product.code.clone(),
            })
        }
        (QuantityRequest::Amount(amount), true) => {
            let grams = grams_for_amount(amount, product.price)?;
            validate_grams(grams)?;
            grams
        }
    };

    Ok(ResolvedItem {
        product,
        quantity,
        unit: product.sale_unit(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
