//! # Balance Repository
//!
//! Running cash and bank balances (`balance.json`).

use chrono::NaiveDateTime;
use tracing::{debug, info};

use caja_core::ledger::{Balance, CashOperation};
use caja_core::Money;

use crate::document::JsonDocument;
use crate::error::{StoreError, StoreResult};
use crate::store::Store;

pub const FILE_NAME: &str = "balance.json";

#[derive(Debug, Clone)]
pub struct BalanceRepository {
    doc: JsonDocument<Balance>,
}

impl BalanceRepository {
    pub fn new(store: &Store) -> Self {
        BalanceRepository {
            doc: JsonDocument::new(store.file(FILE_NAME)),
        }
    }

    pub async fn get(&self) -> StoreResult<Balance> {
        self.doc.load().await
    }

    pub async fn get_or_default(&self) -> Balance {
        self.doc.load_or_empty().await
    }

    /// Reflects a recorded operation into its account.
    pub async fn apply(&self, operation: &CashOperation) -> StoreResult<Balance> {
        debug!(id = %operation.id, "Applying operation to balance");
        self.doc
            .update(|balance| {
                balance.apply(operation);
                Ok::<_, StoreError>(balance.clone())
            })
            .await
    }

    /// Manual override; nothing is written when the values don't change.
    ///
    /// ## Returns
    /// The balance and whether it changed.
    pub async fn set(
        &self,
        cash: Option<Money>,
        bank: Option<Money>,
        note: &str,
        at: NaiveDateTime,
    ) -> StoreResult<(Balance, bool)> {
        let mut balance = self.doc.load().await?;
        let changed = balance.set(cash, bank, note, at);
        if changed {
            self.doc.save(&balance).await?;
            info!(
                cash = %balance.cash_balance,
                bank = %balance.bank_balance,
                "Balances set manually"
            );
        }
        Ok((balance, changed))
    }
}
