//! # Store Handle
//!
//! Data directory configuration and the [`Store`] handle that hands out
//! repositories.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Data Directory                                  │
//! │                                                                         │
//! │  caja startup                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreConfig::new(dir) ← Where the JSON documents live                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Store::open(config).await ← Create dir + missing documents            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │  inventario.json    tickets.json        │                           │
//! │  │  clientes.json      registro_operaciones│                           │
//! │  │  balance.json       cajas_rendidas.json │                           │
//! │  │  session.json       sesiones.json       │                           │
//! │  │  usuarios.json                          │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store.products() / store.tickets() / ...                              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One operator, one process: each command reads a document, changes it and
//! writes it back. The last writer wins.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::bootstrap;
use crate::error::{StoreError, StoreResult};
use crate::repository::balance::BalanceRepository;
use crate::repository::customer::CustomerRepository;
use crate::repository::operation::OperationRepository;
use crate::repository::product::ProductRepository;
use crate::repository::report::ReportRepository;
use crate::repository::session::SessionRepository;
use crate::repository::ticket::TicketRepository;
use crate::repository::user::UserRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Store configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = StoreConfig::new("/var/lib/caja").initialize(false);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the JSON documents.
    pub data_dir: PathBuf,

    /// Whether to create the directory and any missing documents on open.
    /// Default: true
    pub initialize: bool,

    /// Remove the directory when the last `Store` handle is dropped.
    pub remove_on_drop: bool,
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        StoreConfig {
            data_dir: data_dir.into(),
            initialize: true,
            remove_on_drop: false,
        }
    }

    /// Sets whether to create missing documents on open.
    pub fn initialize(mut self, initialize: bool) -> Self {
        self.initialize = initialize;
        self
    }

    /// A fresh, unique directory under the system temp dir (for tests).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let store = Store::open(StoreConfig::temporary()).await?;
    /// // Store is isolated, nothing else writes here.
    /// // The directory is removed when the last handle is dropped.
    /// ```
    pub fn temporary() -> Self {
        StoreConfig {
            remove_on_drop: true,
            ..StoreConfig::new(std::env::temp_dir().join(format!("caja-test-{}", Uuid::new_v4())))
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Main store handle providing repository access.
///
/// Cheap to clone; every repository holds only its file path.
///
/// ## Usage
/// ```rust,ignore
/// let store = Store::open(StoreConfig::new("./datos")).await?;
/// let catalog = store.products().all().await?;
/// ```
#[derive(Debug, Clone)]
pub struct Store {
    data_dir: PathBuf,
    _cleanup: Option<Arc<RemoveOnDrop>>,
}

/// Deletes a temporary data directory once no store uses it.
#[derive(Debug)]
struct RemoveOnDrop(PathBuf);

impl Drop for RemoveOnDrop {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.0) {
            warn!(path = %self.0.display(), error = %e, "Could not remove temporary data directory");
        }
    }
}

impl Store {
    /// Opens the data directory.
    ///
    /// ## What This Does
    /// 1. Creates the directory if it doesn't exist
    /// 2. Writes empty documents for any that are missing (if enabled)
    pub async fn open(config: StoreConfig) -> StoreResult<Self> {
        info!(path = %config.data_dir.display(), "Opening data directory");

        tokio::fs::create_dir_all(&config.data_dir)
            .await
            .map_err(|e| StoreError::io(&config.data_dir, e))?;

        let cleanup = config
            .remove_on_drop
            .then(|| Arc::new(RemoveOnDrop(config.data_dir.clone())));
        let store = Store {
            data_dir: config.data_dir,
            _cleanup: cleanup,
        };

        if config.initialize {
            let created = bootstrap::ensure_documents(&store).await?;
            debug!(created = created, "Documents initialized");
        }

        Ok(store)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub(crate) fn file(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    /// Returns the product repository (`inventario.json`).
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self)
    }

    /// Returns the ticket repository (`tickets.json`).
    pub fn tickets(&self) -> TicketRepository {
        TicketRepository::new(self)
    }

    /// Returns the customer repository (`clientes.json`).
    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self)
    }

    /// Returns the cash operation repository (`registro_operaciones.json`).
    pub fn operations(&self) -> OperationRepository {
        OperationRepository::new(self)
    }

    /// Returns the balance repository (`balance.json`).
    pub fn balance(&self) -> BalanceRepository {
        BalanceRepository::new(self)
    }

    /// Returns the closing report repository (`cajas_rendidas.json`).
    pub fn reports(&self) -> ReportRepository {
        ReportRepository::new(self)
    }

    /// Returns the session repository (`session.json`, `sesiones.json`).
    pub fn sessions(&self) -> SessionRepository {
        SessionRepository::new(self)
    }

    /// Returns the user repository (`usuarios.json`).
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self)
    }

    /// Checks that the data directory is present and writable.
    pub async fn health_check(&self) -> bool {
        let probe = self.file(&format!(".health-{}", Uuid::new_v4()));
        if tokio::fs::write(&probe, b"ok").await.is_err() {
            return false;
        }
        tokio::fs::remove_file(&probe).await.is_ok()
    }
}

/// Opens a fresh temporary store.
#[cfg(test)]
pub(crate) async fn temp_store() -> Store {
    Store::open(StoreConfig::temporary())
        .await
        .expect("temporary store should open")
}

// =============================================================================
// Unit Tests
// =============================================================================
