//! # User Repository
//!
//! Cashier credentials (`usuarios.json`). The register only reads this
//! file; it is maintained by hand or by the `seed` binary.

use tracing::debug;

use caja_core::session::Credential;

use crate::document::JsonDocument;
use crate::error::StoreResult;
use crate::store::Store;

pub const FILE_NAME: &str = "usuarios.json";

#[derive(Debug, Clone)]
pub struct UserRepository {
    doc: JsonDocument<Vec<Credential>>,
}

impl UserRepository {
    pub fn new(store: &Store) -> Self {
        UserRepository {
            doc: JsonDocument::new(store.file(FILE_NAME)),
        }
    }

    pub async fn all(&self) -> StoreResult<Vec<Credential>> {
        let users = self.doc.load().await?;
        debug!(count = users.len(), "Loaded users");
        Ok(users)
    }

    /// Overwrites the user list. Only used for seeding.
    pub async fn replace_all(&self, users: &[Credential]) -> StoreResult<()> {
        self.doc.save(&users.to_vec()).await
    }
}
