//! # Cash Operation Repository
//!
//! Append-only income/expense log (`registro_operaciones.json`).

use tracing::{debug, info};

use caja_core::ledger::CashOperation;

use crate::document::JsonDocument;
use crate::error::{StoreError, StoreResult};
use crate::store::Store;

pub const FILE_NAME: &str = "registro_operaciones.json";

#[derive(Debug, Clone)]
pub struct OperationRepository {
    doc: JsonDocument<Vec<CashOperation>>,
}

impl OperationRepository {
    pub fn new(store: &Store) -> Self {
        OperationRepository {
            doc: JsonDocument::new(store.file(FILE_NAME)),
        }
    }

    pub async fn all(&self) -> StoreResult<Vec<CashOperation>> {
        self.doc.load().await
    }

    pub async fn all_or_empty(&self) -> Vec<CashOperation> {
        self.doc.load_or_empty().await
    }

    pub async fn append(&self, operation: &CashOperation) -> StoreResult<()> {
        self.doc
            .update(|ops| {
                if ops.iter().any(|op| op.id == operation.id) {
                    return Err(StoreError::duplicate("operation id", &operation.id));
                }
                ops.push(operation.clone());
                Ok(())
            })
            .await?;

        info!(
            id = %operation.id,
            kind = %operation.kind,
            account = %operation.account,
            amount = %operation.amount,
            "Cash operation recorded"
        );
        Ok(())
    }

    pub async fn for_session(&self, session_id: &str) -> StoreResult<Vec<CashOperation>> {
        let ops: Vec<CashOperation> = self
            .doc
            .load()
            .await?
            .into_iter()
            .filter(|op| op.session_id == session_id)
            .collect();
        debug!(session_id = %session_id, count = ops.len(), "Loaded session operations");
        Ok(ops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::temp_store;
    use caja_core::ledger::{Account, OperationKind};
    use caja_core::Money;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_append_and_filter_by_session() {
        let store = temp_store().await;
        let repo = store.operations();
        let at = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap();

        let income = CashOperation::new("S1", OperationKind::Income, Account::Cash, Money::from_cents(5000), "fondo", at).unwrap();
        let expense = CashOperation::new("S2", OperationKind::Expense, Account::Bank, Money::from_cents(900), "", at).unwrap();
        repo.append(&income).await.unwrap();
        repo.append(&expense).await.unwrap();

        assert!(matches!(repo.append(&income).await, Err(StoreError::Duplicate { .. })));
        assert_eq!(repo.all().await.unwrap().len(), 2);

        let s1 = repo.for_session("S1").await.unwrap();
        assert_eq!(s1, vec![income]);
    }
}
