//! # Customer Repository
//!
//! Credit customers and their debt history (`clientes.json`).

use tracing::debug;

use caja_core::customer::{self, Customer};

use crate::document::JsonDocument;
use crate::error::{StoreError, StoreResult};
use crate::store::Store;

pub const FILE_NAME: &str = "clientes.json";

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    doc: JsonDocument<Vec<Customer>>,
}

impl CustomerRepository {
    pub fn new(store: &Store) -> Self {
        CustomerRepository {
            doc: JsonDocument::new(store.file(FILE_NAME)),
        }
    }

    pub async fn all(&self) -> StoreResult<Vec<Customer>> {
        self.doc.load().await
    }

    pub async fn all_or_empty(&self) -> Vec<Customer> {
        self.doc.load_or_empty().await
    }

    /// Finds a customer by name, ignoring case.
    pub async fn get(&self, name: &str) -> StoreResult<Option<Customer>> {
        debug!(name = %name, "Getting customer");
        let book = self.doc.load().await?;
        Ok(customer::find_customer(&book, name).ok().cloned())
    }

    /// Loads the customer book, runs `f`, and writes it back only if `f`
    /// succeeded.
    pub async fn update<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Vec<Customer>) -> Result<R, E>,
        E: From<StoreError>,
    {
        debug!("Updating customers");
        self.doc.update(f).await
    }
}
