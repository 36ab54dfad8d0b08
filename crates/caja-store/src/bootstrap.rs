//! # Data Directory Bootstrap
//!
//! Creates any missing document with its empty value so a fresh data
//! directory is immediately usable.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Store::open                                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  for each known document                                               │
//! │       ├── inventario.json     ✓ (exists, untouched)                   │
//! │       ├── tickets.json        ✓ (exists, untouched)                   │
//! │       └── balance.json        ⬜ (missing → write default)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  caja continues                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Existing files are never rewritten here, even when corrupt.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use caja_core::customer::Customer;
use caja_core::ledger::{Balance, CashOperation};
use caja_core::reconciliation::ClosingReport;
use caja_core::session::{Credential, Session, SessionState};
use caja_core::{Product, Ticket};

use crate::document::JsonDocument;
use crate::error::StoreResult;
use crate::repository::{balance, customer, operation, product, report, session, ticket, user};
use crate::store::Store;

/// Every document the store manages.
pub const DOCUMENTS: [&str; 9] = [
    product::FILE_NAME,
    ticket::FILE_NAME,
    customer::FILE_NAME,
    operation::FILE_NAME,
    balance::FILE_NAME,
    report::FILE_NAME,
    session::STATE_FILE_NAME,
    session::LOG_FILE_NAME,
    user::FILE_NAME,
];

async fn ensure<T>(store: &Store, name: &str) -> StoreResult<bool>
where
    T: Serialize + DeserializeOwned + Default,
{
    let doc: JsonDocument<T> = JsonDocument::new(store.file(name));
    if doc.exists().await {
        return Ok(false);
    }
    doc.save(&T::default()).await?;
    info!(document = name, "Created empty document");
    Ok(true)
}

/// Writes an empty value for every missing document.
///
/// ## Returns
/// Number of documents created. Idempotent: a second call returns 0.
pub async fn ensure_documents(store: &Store) -> StoreResult<usize> {
    let created = [
        ensure::<Vec<Product>>(store, product::FILE_NAME).await?,
        ensure::<Vec<Ticket>>(store, ticket::FILE_NAME).await?,
        ensure::<Vec<Customer>>(store, customer::FILE_NAME).await?,
        ensure::<Vec<CashOperation>>(store, operation::FILE_NAME).await?,
        ensure::<Balance>(store, balance::FILE_NAME).await?,
        ensure::<Vec<ClosingReport>>(store, report::FILE_NAME).await?,
        ensure::<SessionState>(store, session::STATE_FILE_NAME).await?,
        ensure::<Vec<Session>>(store, session::LOG_FILE_NAME).await?,
        ensure::<Vec<Credential>>(store, user::FILE_NAME).await?,
    ];
    Ok(created.iter().filter(|c| **c).count())
}

/// Which documents are present on disk.
///
/// ## Usage
/// For diagnostics (`caja status`).
pub async fn document_status(store: &Store) -> Vec<(&'static str, bool)> {
    let mut status = Vec::with_capacity(DOCUMENTS.len());
    for name in DOCUMENTS {
        let present = tokio::fs::try_exists(store.file(name)).await.unwrap_or(false);
        status.push((name, present));
    }
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreConfig;

    #[tokio::test]
    async fn test_ensure_documents_is_idempotent() {
        let store = Store::open(StoreConfig::temporary().initialize(false)).await.unwrap();

        assert_eq!(ensure_documents(&store).await.unwrap(), DOCUMENTS.len());
        assert_eq!(ensure_documents(&store).await.unwrap(), 0);
        assert!(document_status(&store).await.iter().all(|(_, present)| *present));
    }

    #[tokio::test]
    async fn test_existing_corrupt_document_is_left_alone() {
        let config = StoreConfig::temporary().initialize(false);
        let store = Store::open(config).await.unwrap();
        std::fs::write(store.file(ticket::FILE_NAME), "garbage").unwrap();

        ensure_documents(&store).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(store.file(ticket::FILE_NAME)).unwrap(),
            "garbage"
        );
    }
}
