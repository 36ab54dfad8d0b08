//! # Product Repository
//!
//! Catalog persistence (`inventario.json`).
//!
//! ## Key Operations
//! - Strict and lenient catalog reads
//! - Lookup by code (case-insensitive)
//! - Closure-based updates for add/update/remove/restock/count/reprice
//! - Stock decrement for a closed ticket

use tracing::{debug, info, warn};

use caja_core::inventory;
use caja_core::{LineItem, Product};

use crate::document::JsonDocument;
use crate::error::{StoreError, StoreResult};
use crate::store::Store;

pub const FILE_NAME: &str = "inventario.json";

/// Repository for the product catalog.
///
/// ## Usage
/// ```rust,ignore
/// let repo = store.products();
///
/// let catalog = repo.all().await?;
/// let product = repo.get_by_code("A1").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    doc: JsonDocument<Vec<Product>>,
}

impl ProductRepository {
    pub fn new(store: &Store) -> Self {
        ProductRepository {
            doc: JsonDocument::new(store.file(FILE_NAME)),
        }
    }

    /// Whole catalog, failing on a corrupt file.
    pub async fn all(&self) -> StoreResult<Vec<Product>> {
        let products = self.doc.load().await?;
        debug!(count = products.len(), "Loaded catalog");
        Ok(products)
    }

    /// Whole catalog, or empty if the file can't be read.
    pub async fn all_or_empty(&self) -> Vec<Product> {
        self.doc.load_or_empty().await
    }

    /// Gets a product by code, ignoring case.
    ///
    /// ## Returns
    /// * `Ok(Some(product))` - Product found
    /// * `Ok(None)` - No product with that code
    pub async fn get_by_code(&self, code: &str) -> StoreResult<Option<Product>> {
        debug!(code = %code, "Getting product by code");
        let products = self.doc.load().await?;
        Ok(inventory::find_by_code(&products, code).cloned())
    }

    /// Same as [`get_by_code`](Self::get_by_code) but missing is an error.
    pub async fn require(&self, code: &str) -> StoreResult<Product> {
        self.get_by_code(code)
            .await?
            .ok_or_else(|| StoreError::not_found("Product", code))
    }

    /// Replaces the whole catalog.
    pub async fn save_all(&self, products: &[Product]) -> StoreResult<()> {
        info!(count = products.len(), "Writing catalog");
        self.doc.save(&products.to_vec()).await
    }

    /// Loads the catalog, runs `f`, and writes it back only if `f` succeeded.
    pub async fn update<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Vec<Product>) -> Result<R, E>,
        E: From<StoreError>,
    {
        debug!("Updating catalog");
        self.doc.update(f).await
    }

    /// Takes a closed ticket's lines out of stock.
    ///
    /// ## Returns
    /// Codes that were no longer in the catalog and had to be re-created
    /// with negative stock.
    pub async fn apply_sale(&self, lines: &[LineItem]) -> StoreResult<Vec<String>> {
        let recreated = self
            .doc
            .update(|catalog| Ok::<_, StoreError>(inventory::apply_sale(catalog, lines)))
            .await?;

        for code in &recreated {
            warn!(code = %code, "Sold product missing from catalog, re-created with negative stock");
        }
        info!(lines = lines.len(), "Stock updated for sale");
        Ok(recreated)
    }

    /// Counts products in the catalog.
    pub async fn count(&self) -> StoreResult<usize> {
        Ok(self.doc.load().await?.len())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::temp_store;
    use caja_core::{CoreError, Money, Unit};

    fn catalog() -> Vec<Product> {
        let mut a1 = Product::new("A1", "Alfajor triple", Money::from_cents(1000), false);
        a1.stock_quantity = 10.0;
        let mut b2 = Product::new("B2", "Banana", Money::from_cents(400), true);
        b2.stock_quantity = 8.0;
        vec![a1, b2]
    }

    #[tokio::test]
    async fn test_get_by_code_ignores_case() {
        let store = temp_store().await;
        let repo = store.products();
        repo.save_all(&catalog()).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 2);
        let product = repo.get_by_code("a1").await.unwrap().unwrap();
        assert_eq!(product.code, "A1");
        assert!(repo.get_by_code("zz").await.unwrap().is_none());
        assert!(matches!(repo.require("zz").await, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_persists_only_on_success() {
        let store = temp_store().await;
        let repo = store.products();
        repo.save_all(&catalog()).await.unwrap();

        let duplicate = Product::new("a1", "Otro", Money::from_cents(1), false);
        let result: Result<(), StoreOrCore> = repo
            .update(|c| inventory::add_product(c, duplicate).map_err(StoreOrCore))
            .await;
        assert!(matches!(result, Err(StoreOrCore(CoreError::Validation(_)))));
        assert_eq!(repo.count().await.unwrap(), 2);

        let removed = repo
            .update(|c| inventory::remove_product(c, "B2").map_err(StoreOrCore))
            .await
            .unwrap();
        assert_eq!(removed.code, "B2");
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_apply_sale_decrements_and_recreates() {
        let store = temp_store().await;
        let repo = store.products();
        repo.save_all(&catalog()).await.unwrap();

        let lines = vec![
            LineItem {
                code: "A1".to_string(),
                description: "Alfajor triple".to_string(),
                quantity: 3,
                unit: Unit::Units,
                unit_price: Money::from_cents(1000),
                subtotal: Money::from_cents(3000),
            },
            LineItem {
                code: "B2".to_string(),
                description: "Banana".to_string(),
                quantity: 5000,
                unit: Unit::Grams,
                unit_price: Money::from_cents(400),
                subtotal: Money::from_cents(2000),
            },
            LineItem {
                code: "GONE".to_string(),
                description: "Discontinued".to_string(),
                quantity: 2,
                unit: Unit::Units,
                unit_price: Money::from_cents(100),
                subtotal: Money::from_cents(200),
            },
        ];

        let recreated = repo.apply_sale(&lines).await.unwrap();
        assert_eq!(recreated, vec!["GONE"]);

        let catalog = repo.all().await.unwrap();
        assert_eq!(inventory::find_by_code(&catalog, "A1").unwrap().stock_quantity, 7.0);
        assert_eq!(inventory::find_by_code(&catalog, "B2").unwrap().stock_quantity, 3.0);
        assert_eq!(inventory::find_by_code(&catalog, "GONE").unwrap().stock_quantity, -2.0);
    }

    /// Core error carried through `update`, store errors fail the test.
    #[derive(Debug)]
    struct StoreOrCore(CoreError);

    impl From<StoreError> for StoreOrCore {
        fn from(e: StoreError) -> Self {
            panic!("unexpected store error: {e}")
        }
    }
}
