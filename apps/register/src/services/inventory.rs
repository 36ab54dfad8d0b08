//! # Inventory Service
//!
//! Catalog maintenance on top of `inventario.json`: edits, restocks,
//! manual counts, the expiry report and repricing.
//!
//! Every write goes through [`ProductRepository::update`], so a rejected
//! edit leaves the file untouched.
//!
//! [`ProductRepository::update`]: caja_store::ProductRepository::update

use chrono::NaiveDate;
use tracing::info;

use caja_core::inventory::{self, ExpiryEntry, PriceChange, StockUpdate};
use caja_core::{DiscountRate, Money, Product};
use caja_store::Store;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

/// Fields to change on an existing product. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub code: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub discount: Option<DiscountRate>,
    pub is_weighable: Option<bool>,
    pub cost: Option<Money>,
    pub expiry_date: Option<NaiveDate>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        *self == ProductPatch::default()
    }

    fn apply_to(&self, product: &Product) -> Product {
        let mut updated = product.clone();
        if let Some(code) = &self.code {
            updated.code = code.trim().to_string();
        }
        if let Some(description) = &self.description {
            updated.description = description.trim().to_string();
        }
        if let Some(price) = self.price {
            updated.price = price;
        }
        if let Some(discount) = self.discount {
            updated.discount = discount;
        }
        if let Some(is_weighable) = self.is_weighable {
            updated.is_weighable = is_weighable;
        }
        if let Some(cost) = self.cost {
            updated.cost = Some(cost);
        }
        if let Some(expiry) = self.expiry_date {
            updated.expiry_date = Some(expiry);
        }
        updated
    }
}

pub struct InventoryService<'a> {
    store: &'a Store,
    config: &'a AppConfig,
}

impl<'a> InventoryService<'a> {
    pub fn new(store: &'a Store, config: &'a AppConfig) -> Self {
        InventoryService { store, config }
    }

    pub async fn list(&self) -> Vec<Product> {
        let mut catalog = self.store.products().all_or_empty().await;
        catalog.sort_by(|a, b| a.code.to_lowercase().cmp(&b.code.to_lowercase()));
        catalog
    }

    pub async fn add(&self, product: Product) -> AppResult<Product> {
        let added = self
            .store
            .products()
            .update(|catalog| {
                inventory::add_product(catalog, product.clone())?;
                Ok::<_, AppError>(product)
            })
            .await?;
        info!(code = %added.code, price = %added.price, "Product added");
        Ok(added)
    }

    pub async fn update(&self, code: &str, patch: &ProductPatch) -> AppResult<Product> {
        if patch.is_empty() {
            return Err(AppError::validation("Nothing to update"));
        }
        let updated = self
            .store
            .products()
            .update(|catalog| {
                let current = inventory::find_by_code(catalog, code)
                    .ok_or_else(|| AppError::not_found("Product", code))?;
                let updated = patch.apply_to(current);
                inventory::update_product(catalog, code, updated.clone())?;
                Ok::<_, AppError>(updated)
            })
            .await?;
        info!(code = %code, new_code = %updated.code, "Product updated");
        Ok(updated)
    }

    pub async fn remove(&self, code: &str) -> AppResult<Product> {
        let removed = self
            .store
            .products()
            .update(|catalog| Ok::<_, AppError>(inventory::remove_product(catalog, code)?))
            .await?;
        info!(code = %removed.code, "Product removed");
        Ok(removed)
    }

    /// Receives stock and stamps `today` as the ingress date.
    pub async fn restock(
        &self,
        code: &str,
        quantity: i64,
        update: &StockUpdate,
        today: NaiveDate,
    ) -> AppResult<Product> {
        let product = self
            .store
            .products()
            .update(|catalog| {
                Ok::<_, AppError>(inventory::restock(catalog, code, quantity, update, today)?.clone())
            })
            .await?;
        info!(code = %product.code, added = quantity, stock = product.stock_quantity, "Restocked");
        Ok(product)
    }

    /// Overwrites stock with a manual count.
    pub async fn count(&self, code: &str, quantity: f64, update: &StockUpdate) -> AppResult<Product> {
        let product = self
            .store
            .products()
            .update(|catalog| {
                Ok::<_, AppError>(inventory::set_count(catalog, code, quantity, update)?.clone())
            })
            .await?;
        info!(code = %product.code, stock = product.stock_quantity, "Stock counted");
        Ok(product)
    }

    pub async fn expiry_report(&self, today: NaiveDate, within_days: Option<i64>) -> Vec<ExpiryEntry> {
        let catalog = self.store.products().all_or_empty().await;
        inventory::expiry_report(&catalog, today, within_days)
    }

    /// Discounts everything expiring inside the configured window.
    pub async fn reprice_expiring(&self, today: NaiveDate, discount: DiscountRate) -> AppResult<Vec<PriceChange>> {
        if discount.is_zero() {
            return Ok(Vec::new());
        }
        let window = self.config.expiry_window_days;
        let changes = self
            .store
            .products()
            .update(|catalog| {
                Ok::<_, AppError>(inventory::reprice_expiring(catalog, today, window, discount))
            })
            .await?;
        info!(count = changes.len(), discount = %discount, window_days = window, "Repriced expiring products");
        Ok(changes)
    }

    pub async fn reprice_product(&self, code: &str, discount: DiscountRate) -> AppResult<PriceChange> {
        let change = self
            .store
            .products()
            .update(|catalog| Ok::<_, AppError>(inventory::reprice_product(catalog, code, discount)?))
            .await?;
        info!(code = %change.code, old = %change.old_price, new = %change.new_price, "Product repriced");
        Ok(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::services::test_support::{at, fixture};
    use caja_core::inventory::ExpiryStatus;

    fn day(d: u32) -> NaiveDate {
        at(d, 0).date()
    }

    #[tokio::test]
    async fn test_add_rejects_duplicate_code() {
        let (store, config) = fixture().await;
        let service = InventoryService::new(&store, &config);

        let added = service
            .add(Product::new("D4", "Dulce de leche", Money::from_cents(2500), false))
            .await
            .unwrap();
        assert_eq!(added.code, "D4");

        let err = service
            .add(Product::new("a1", "Otro", Money::from_cents(100), false))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(store.products().count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_update_patch_and_rename() {
        let (store, config) = fixture().await;
        let service = InventoryService::new(&store, &config);

        let patch = ProductPatch {
            code: Some("A10".to_string()),
            price: Some(Money::from_cents(1100)),
            ..ProductPatch::default()
        };
        let updated = service.update("a1", &patch).await.unwrap();
        assert_eq!(updated.code, "A10");
        assert_eq!(updated.price.cents(), 1100);
        assert_eq!(updated.description, "Alfajor triple");
        assert!(store.products().get_by_code("A1").await.unwrap().is_none());

        let clash = ProductPatch {
            code: Some("B2".to_string()),
            ..ProductPatch::default()
        };
        assert!(service.update("A10", &clash).await.is_err());
        assert!(service.update("A10", &ProductPatch::default()).await.is_err());
        assert_eq!(
            service.update("ZZ", &patch).await.unwrap_err().code,
            ErrorCode::NotFound
        );
    }

    #[tokio::test]
    async fn test_restock_and_count() {
        let (store, config) = fixture().await;
        let service = InventoryService::new(&store, &config);

        let update = StockUpdate {
            cost: Some(Money::from_cents(700)),
            ..StockUpdate::default()
        };
        let product = service.restock("A1", 5, &update, day(4)).await.unwrap();
        assert_eq!(product.stock_quantity, 25.0);
        assert_eq!(product.cost, Some(Money::from_cents(700)));
        assert_eq!(product.ingress_date, Some(day(4)));

        assert!(service.restock("A1", 0, &StockUpdate::default(), day(4)).await.is_err());

        let counted = service.count("B2", 2.5, &StockUpdate::default()).await.unwrap();
        assert_eq!(counted.stock_quantity, 2.5);
        assert!(service.count("A1", 2.5, &StockUpdate::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_remove_product() {
        let (store, config) = fixture().await;
        let service = InventoryService::new(&store, &config);

        service.remove("C3").await.unwrap();
        assert_eq!(store.products().count().await.unwrap(), 2);
        assert_eq!(service.remove("C3").await.unwrap_err().code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_expiry_report_and_bulk_reprice() {
        let (store, config) = fixture().await;
        let service = InventoryService::new(&store, &config);

        // Mar 5 is "today": B2 expired, A1 in 5 days, C3 in 45 days
        let expiries = [
            ("A1", day(10)),
            ("B2", day(1)),
            ("C3", day(5) + chrono::Duration::days(45)),
        ];
        for (code, expiry) in expiries {
            let patch = ProductPatch {
                expiry_date: Some(expiry),
                ..ProductPatch::default()
            };
            service.update(code, &patch).await.unwrap();
        }

        let report = service.expiry_report(day(5), None).await;
        let codes: Vec<&str> = report.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["B2", "A1", "C3"]);
        assert_eq!(report[0].status, ExpiryStatus::Expired);
        assert_eq!(report[1].status, ExpiryStatus::Critical);
        assert_eq!(report[2].status, ExpiryStatus::Warning);

        let within = service.expiry_report(day(5), Some(30)).await;
        assert_eq!(within.len(), 2);

        assert!(service
            .reprice_expiring(day(5), DiscountRate::zero())
            .await
            .unwrap()
            .is_empty());

        // $8.00 and $3.20 both climb to the next 50 step
        let changes = service
            .reprice_expiring(day(5), DiscountRate::from_bps(2000))
            .await
            .unwrap();
        assert_eq!(changes.len(), 2);
        let catalog = store.products().all().await.unwrap();
        assert_eq!(inventory::find_by_code(&catalog, "A1").unwrap().price.cents(), 5000);
        assert_eq!(inventory::find_by_code(&catalog, "B2").unwrap().price.cents(), 5000);
        assert_eq!(inventory::find_by_code(&catalog, "C3").unwrap().price.cents(), 1250);
    }

    #[tokio::test]
    async fn test_reprice_single_product() {
        let (store, config) = fixture().await;
        let service = InventoryService::new(&store, &config);

        let patch = ProductPatch {
            price: Some(Money::from_cents(125_000)),
            ..ProductPatch::default()
        };
        service.update("C3", &patch).await.unwrap();

        let change = service
            .reprice_product("C3", DiscountRate::from_bps(1000))
            .await
            .unwrap();
        assert_eq!(change.old_price.cents(), 125_000);
        // 1125.00 rounds up to 1150.00
        assert_eq!(change.new_price.cents(), 115_000);
    }
}
