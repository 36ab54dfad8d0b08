//! # Inventory Maintenance
//!
//! Catalog edits, stock movements and expiry-driven repricing over the
//! in-memory product list. The store loads and saves the list; every rule
//! lives here.
//!
//! ## Stock Units
//! ```text
//!   unit-counted  stock_quantity in units   sale of 3 u    → -3.0
//!   weighable     stock_quantity in kg      sale of 750 g  → -0.75
//! ```
//!
//! ## Expiry Classes
//! ```text
//!   days_left < 0   Expired
//!   days_left < 30  Critical   ← bulk repricing window
//!   days_left < 60  Warning
//!   otherwise       Fresh
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::pricing::expiry_price;
use crate::types::{DiscountRate, LineItem, Product, Unit};
use crate::validation::{validate_code, validate_product, validate_quantity};

// =============================================================================
// Lookup
// =============================================================================

pub fn find_by_code<'a>(catalog: &'a [Product], code: &str) -> Option<&'a Product> {
    catalog.iter().find(|p| p.has_code(code))
}

pub fn find_by_code_mut<'a>(catalog: &'a mut [Product], code: &str) -> Option<&'a mut Product> {
    catalog.iter_mut().find(|p| p.has_code(code))
}

fn require_mut<'a>(catalog: &'a mut [Product], code: &str) -> CoreResult<&'a mut Product> {
    find_by_code_mut(catalog, code).ok_or_else(|| CoreError::ProductNotFound(code.trim().to_string()))
}

// =============================================================================
// Catalog Edits
// =============================================================================

/// Adds a new product. Codes are unique ignoring case.
pub fn add_product(catalog: &mut Vec<Product>, product: Product) -> CoreResult<()> {
    validate_product(&product)?;
    if find_by_code(catalog, &product.code).is_some() {
        return Err(ValidationError::Duplicate {
            field: "code".to_string(),
            value: product.code,
        }
        .into());
    }
    catalog.push(product);
    Ok(())
}

/// Replaces the product stored under `code`. The code itself may change
/// as long as it stays unique.
pub fn update_product(catalog: &mut [Product], code: &str, updated: Product) -> CoreResult<()> {
    validate_product(&updated)?;
    let renamed = !updated.has_code(code);
    if renamed && find_by_code(catalog, &updated.code).is_some() {
        return Err(ValidationError::Duplicate {
            field: "code".to_string(),
            value: updated.code,
        }
        .into());
    }
    let product = require_mut(catalog, code)?;
    *product = updated;
    Ok(())
}

pub fn remove_product(catalog: &mut Vec<Product>, code: &str) -> CoreResult<Product> {
    let index = catalog
        .iter()
        .position(|p| p.has_code(code))
        .ok_or_else(|| CoreError::ProductNotFound(code.trim().to_string()))?;
    Ok(catalog.remove(index))
}

// =============================================================================
// Stock Movements
// =============================================================================

/// Optional fields that travel with a restock or a stock count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockUpdate {
    pub cost: Option<Money>,
    pub price: Option<Money>,
    pub expiry_date: Option<NaiveDate>,
}

impl StockUpdate {
    fn apply(&self, product: &mut Product) -> CoreResult<()> {
        for (field, value) in [("cost", self.cost), ("price", self.price)] {
            if value.map_or(false, |v| v.is_negative()) {
                return Err(ValidationError::OutOfRange {
                    field: field.to_string(),
                    min: 0,
                    max: i64::MAX,
                }
                .into());
            }
        }
        if let Some(cost) = self.cost {
            product.cost = Some(cost);
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(expiry) = self.expiry_date {
            product.expiry_date = Some(expiry);
        }
        Ok(())
    }
}

/// Receives `quantity` new units (or kg) and stamps today's ingress date.
pub fn restock<'a>(
    catalog: &'a mut [Product],
    code: &str,
    quantity: i64,
    update: &StockUpdate,
    today: NaiveDate,
) -> CoreResult<&'a Product> {
    validate_quantity(quantity)?;
    let product = require_mut(catalog, code)?;
    update.apply(product)?;
    product.stock_quantity += quantity as f64;
    product.ingress_date = Some(today);
    Ok(&*product)
}

/// Overwrites the stock with a manual count.
pub fn set_count<'a>(
    catalog: &'a mut [Product],
    code: &str,
    quantity: f64,
    update: &StockUpdate,
) -> CoreResult<&'a Product> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(ValidationError::InvalidFormat {
            field: "stock count".to_string(),
            reason: "must be a non-negative number".to_string(),
        }
        .into());
    }
    let product = require_mut(catalog, code)?;
    if !product.is_weighable && quantity.fract() != 0.0 {
        return Err(CoreError::FractionalQuantity {
            code: product.code.clone(),
        });
    }
    update.apply(product)?;
    product.stock_quantity = quantity;
    Ok(&*product)
}

/// Takes sold lines out of stock.
///
/// A line whose product is no longer in the catalog brings it back with
/// negative stock, so the sale is never lost from inventory.
/// Returns the codes that had to be re-created.
pub fn apply_sale(catalog: &mut Vec<Product>, lines: &[LineItem]) -> Vec<String> {
    let mut recreated = Vec::new();
    for line in lines {
        let sold = match line.unit {
            Unit::Units => line.quantity as f64,
            Unit::Grams => line.quantity as f64 / 1000.0,
        };
        match find_by_code_mut(catalog, &line.code) {
            Some(product) => product.stock_quantity -= sold,
            None => {
                let mut product = Product::new(
                    line.code.clone(),
                    line.description.clone(),
                    line.unit_price,
                    line.unit == Unit::Grams,
                );
                product.stock_quantity = -sold;
                catalog.push(product);
                recreated.push(line.code.clone());
            }
        }
    }
    recreated
}

// =============================================================================
// Expiry
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    Expired,
    Critical,
    Warning,
    Fresh,
}

impl ExpiryStatus {
    pub fn classify(days_left: i64) -> Self {
        match days_left {
            d if d < 0 => ExpiryStatus::Expired,
            d if d < 30 => ExpiryStatus::Critical,
            d if d < 60 => ExpiryStatus::Warning,
            _ => ExpiryStatus::Fresh,
        }
    }
}

/// One row of the expiry report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiryEntry {
    pub code: String,
    pub description: String,
    pub price: Money,
    pub stock_quantity: f64,
    pub expiry_date: NaiveDate,
    pub days_left: i64,
    pub status: ExpiryStatus,
}

/// Products with an expiry date, soonest first.
///
/// `within_days` keeps only products expiring in fewer than that many days
/// (already-expired ones included).
pub fn expiry_report(catalog: &[Product], today: NaiveDate, within_days: Option<i64>) -> Vec<ExpiryEntry> {
    let mut entries: Vec<ExpiryEntry> = catalog
        .iter()
        .filter_map(|product| {
            let expiry_date = product.expiry_date?;
            let days_left = (expiry_date - today).num_days();
            if within_days.map_or(false, |limit| days_left >= limit) {
                return None;
            }
            Some(ExpiryEntry {
                code: product.code.clone(),
                description: product.description.clone(),
                price: product.price,
                stock_quantity: product.stock_quantity,
                expiry_date,
                days_left,
                status: ExpiryStatus::classify(days_left),
            })
        })
        .collect();
    entries.sort_by(|a, b| a.expiry_date.cmp(&b.expiry_date).then_with(|| a.code.cmp(&b.code)));
    entries
}

// =============================================================================
// Repricing
// =============================================================================

/// A price change made by repricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceChange {
    pub code: String,
    pub old_price: Money,
    pub new_price: Money,
}

/// Discounts every product expiring within `window_days` and rounds the
/// result up to a ..00 / ..50 step. A zero discount changes nothing.
pub fn reprice_expiring(
    catalog: &mut [Product],
    today: NaiveDate,
    window_days: i64,
    discount: DiscountRate,
) -> Vec<PriceChange> {
    if discount.is_zero() {
        return Vec::new();
    }
    catalog
        .iter_mut()
        .filter(|p| {
            p.expiry_date
                .map_or(false, |date| (date - today).num_days() < window_days)
        })
        .map(|product| reprice(product, discount))
        .collect()
}

/// Same as [`reprice_expiring`] for a single product, regardless of expiry.
pub fn reprice_product(catalog: &mut [Product], code: &str, discount: DiscountRate) -> CoreResult<PriceChange> {
    validate_code(code)?;
    let product = require_mut(catalog, code)?;
    Ok(reprice(product, discount))
}

fn reprice(product: &mut Product, discount: DiscountRate) -> PriceChange {
    let old_price = product.price;
    product.price = expiry_price(old_price, discount);
    PriceChange {
        code: product.code.clone(),
        old_price,
        new_price: product.price,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn catalog() -> Vec<Product> {
        vec![
            Product::new("A1", "Arroz", Money::from_major_minor(600, 0), false),
            Product::new("B2", "Bananas", Money::from_major_minor(400, 0), true),
        ]
    }

    #[test]
    fn test_add_update_remove() {
        let mut catalog = catalog();
        assert!(add_product(&mut catalog, Product::new("a1", "Otro", Money::zero(), false)).is_err());
        assert!(add_product(&mut catalog, Product::new("", "Sin código", Money::zero(), false)).is_err());
        add_product(&mut catalog, Product::new("C3", "Café", Money::from_cents(100), false)).unwrap();

        let mut renamed = catalog[2].clone();
        renamed.code = "B2".to_string();
        assert!(update_product(&mut catalog, "C3", renamed.clone()).is_err());

        renamed.code = "C4".to_string();
        update_product(&mut catalog, "c3", renamed).unwrap();
        assert!(find_by_code(&catalog, "c4").is_some());

        let removed = remove_product(&mut catalog, "C4").unwrap();
        assert_eq!(removed.description, "Café");
        assert!(matches!(remove_product(&mut catalog, "C4"), Err(CoreError::ProductNotFound(_))));
    }

    #[test]
    fn test_restock_and_count() {
        let mut catalog = catalog();
        let update = StockUpdate {
            cost: Some(Money::from_cents(300)),
            expiry_date: Some(day(20)),
            ..StockUpdate::default()
        };
        let product = restock(&mut catalog, "a1", 12, &update, day(1)).unwrap();
        assert_eq!(product.stock_quantity, 12.0);
        assert_eq!(product.ingress_date, Some(day(1)));
        assert_eq!(product.cost, Some(Money::from_cents(300)));
        assert!(restock(&mut catalog, "a1", 0, &update, day(1)).is_err());

        let product = set_count(&mut catalog, "b2", 2.5, &StockUpdate::default()).unwrap();
        assert_eq!(product.stock_quantity, 2.5);
        assert!(set_count(&mut catalog, "a1", 2.5, &StockUpdate::default()).is_err());
        assert!(set_count(&mut catalog, "a1", -1.0, &StockUpdate::default()).is_err());
    }

    #[test]
    fn test_apply_sale_converts_grams_and_recreates_missing() {
        let mut catalog = catalog();
        catalog[0].stock_quantity = 10.0;
        catalog[1].stock_quantity = 3.0;
        let lines = vec![
            LineItem {
                code: "A1".into(),
                description: "Arroz".into(),
                quantity: 3,
                unit: Unit::Units,
                unit_price: Money::from_cents(1000),
                subtotal: Money::from_cents(3000),
            },
            LineItem {
                code: "B2".into(),
                description: "Bananas".into(),
                quantity: 750,
                unit: Unit::Grams,
                unit_price: Money::from_cents(400),
                subtotal: Money::from_cents(300),
            },
            LineItem {
                code: "Z9".into(),
                description: "Borrado".into(),
                quantity: 500,
                unit: Unit::Grams,
                unit_price: Money::from_cents(200),
                subtotal: Money::from_cents(100),
            },
        ];

        let recreated = apply_sale(&mut catalog, &lines);
        assert_eq!(recreated, vec!["Z9".to_string()]);
        assert_eq!(catalog[0].stock_quantity, 7.0);
        assert!((catalog[1].stock_quantity - 2.25).abs() < 1e-9);
        let z9 = find_by_code(&catalog, "Z9").unwrap();
        assert!(z9.is_weighable);
        assert!((z9.stock_quantity + 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_expiry_classification_and_order() {
        let mut catalog = catalog();
        catalog[0].expiry_date = Some(day(31)); // 30 days → Warning
        catalog[1].expiry_date = Some(day(1)); // 0 days → Critical
        let mut expired = Product::new("C3", "Café", Money::from_cents(100), false);
        expired.expiry_date = NaiveDate::from_ymd_opt(2024, 2, 28);
        catalog.push(expired);
        catalog.push(Product::new("D4", "Sin fecha", Money::from_cents(100), false));

        let report = expiry_report(&catalog, day(1), None);
        let codes: Vec<&str> = report.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["C3", "B2", "A1"]);
        assert_eq!(report[0].status, ExpiryStatus::Expired);
        assert_eq!(report[1].status, ExpiryStatus::Critical);
        assert_eq!(report[2].status, ExpiryStatus::Warning);

        let soon = expiry_report(&catalog, day(1), Some(30));
        assert_eq!(soon.len(), 2);

        assert_eq!(ExpiryStatus::classify(60), ExpiryStatus::Fresh);
    }

    #[test]
    fn test_reprice_expiring_window_and_rounding() {
        let mut catalog = catalog();
        catalog[0].expiry_date = Some(day(10)); // 9 days
        catalog[1].expiry_date = Some(day(31)); // 30 days, outside window

        let changes = reprice_expiring(&mut catalog, day(1), 30, DiscountRate::from_bps(1000));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].code, "A1");
        // 600 - 10% = 540 → 550
        assert_eq!(catalog[0].price, Money::from_major_minor(550, 0));
        assert_eq!(catalog[1].price, Money::from_major_minor(400, 0));

        assert!(reprice_expiring(&mut catalog, day(1), 30, DiscountRate::zero()).is_empty());
    }

    #[test]
    fn test_reprice_product() {
        let mut catalog = catalog();
        // 400 - 20% = 320 → 350
        let change = reprice_product(&mut catalog, "b2", DiscountRate::from_bps(2000)).unwrap();
        assert_eq!(change.new_price, Money::from_major_minor(350, 0));
        assert!(reprice_product(&mut catalog, "zz", DiscountRate::from_bps(2000)).is_err());
    }
}
