//! # Closing Report Repository
//!
//! One immutable report per closed session (`cajas_rendidas.json`).

use tracing::{debug, info};

use caja_core::reconciliation::ClosingReport;

use crate::document::JsonDocument;
use crate::error::{StoreError, StoreResult};
use crate::store::Store;

pub const FILE_NAME: &str = "cajas_rendidas.json";

#[derive(Debug, Clone)]
pub struct ReportRepository {
    doc: JsonDocument<Vec<ClosingReport>>,
}

impl ReportRepository {
    pub fn new(store: &Store) -> Self {
        ReportRepository {
            doc: JsonDocument::new(store.file(FILE_NAME)),
        }
    }

    pub async fn all(&self) -> StoreResult<Vec<ClosingReport>> {
        self.doc.load().await
    }

    pub async fn all_or_empty(&self) -> Vec<ClosingReport> {
        self.doc.load_or_empty().await
    }

    pub async fn find(&self, session_id: &str) -> StoreResult<Option<ClosingReport>> {
        debug!(session_id = %session_id, "Looking up closing report");
        let reports = self.doc.load().await?;
        Ok(reports.into_iter().find(|r| r.session_id == session_id))
    }

    /// Stores a report.
    ///
    /// ## Errors
    /// * `StoreError::Duplicate` - the session already has a report
    pub async fn append(&self, report: &ClosingReport) -> StoreResult<()> {
        self.doc
            .update(|reports| {
                if reports.iter().any(|r| r.session_id == report.session_id) {
                    return Err(StoreError::duplicate("session_id", &report.session_id));
                }
                reports.push(report.clone());
                Ok(())
            })
            .await?;

        info!(
            session_id = %report.session_id,
            net_total = %report.net_total,
            tickets = report.ticket_count,
            "Closing report stored"
        );
        Ok(())
    }
}
