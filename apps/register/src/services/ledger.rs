//! # Ledger Service
//!
//! Manual income/expense operations and the cash/bank balance.
//!
//! ```text
//! record_operation(kind, account, amount, note)
//!      │
//!      ├──► registro_operaciones.json  ← operation tagged with session
//!      └──► balance.json               ← account ± amount, adjustment pushed
//! ```

use chrono::NaiveDateTime;
use tracing::info;

use caja_core::ledger::{Account, Balance, CashOperation, OperationKind};
use caja_core::Money;
use caja_store::Store;

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::services::session::SessionService;

pub struct LedgerService<'a> {
    store: &'a Store,
    config: &'a AppConfig,
}

impl<'a> LedgerService<'a> {
    pub fn new(store: &'a Store, config: &'a AppConfig) -> Self {
        LedgerService { store, config }
    }

    /// Records an operation in the active session and reflects it in the
    /// balance.
    pub async fn record_operation(
        &self,
        kind: OperationKind,
        account: Account,
        amount: Money,
        note: &str,
        now: NaiveDateTime,
    ) -> AppResult<(CashOperation, Balance)> {
        let session = SessionService::new(self.store, self.config).require_active().await?;
        let operation = CashOperation::new(&session.session_id, kind, account, amount, note, now)?;

        self.store.operations().append(&operation).await?;
        let balance = self.store.balance().apply(&operation).await?;

        info!(
            session_id = %operation.session_id,
            kind = %operation.kind,
            account = %operation.account,
            amount = %operation.amount,
            "Operation recorded"
        );
        Ok((operation, balance))
    }

    pub async fn balance(&self) -> Balance {
        self.store.balance().get_or_default().await
    }

    /// Overrides balances. The bool is false when nothing changed.
    pub async fn set_balances(
        &self,
        cash: Option<Money>,
        bank: Option<Money>,
        note: &str,
        now: NaiveDateTime,
    ) -> AppResult<(Balance, bool)> {
        Ok(self.store.balance().set(cash, bank, note, now).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::services::test_support::{at, fixture};

    #[tokio::test]
    async fn test_operation_needs_session() {
        let (store, config) = fixture().await;
        let service = LedgerService::new(&store, &config);

        let err = service
            .record_operation(OperationKind::Income, Account::Cash, Money::from_cents(100), "", at(1, 9))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NoActiveSession);
    }

    #[tokio::test]
    async fn test_operations_move_balance() {
        let (store, config) = fixture().await;
        SessionService::new(&store, &config)
            .login("cajero_1", "1234", at(1, 9))
            .await
            .unwrap();
        let service = LedgerService::new(&store, &config);

        service
            .record_operation(OperationKind::Income, Account::Cash, Money::from_cents(10_000), "cambio", at(1, 10))
            .await
            .unwrap();
        let (operation, balance) = service
            .record_operation(OperationKind::Expense, Account::Bank, Money::from_cents(2_500), "proveedor", at(1, 11))
            .await
            .unwrap();

        assert_eq!(operation.session_id, "20240301-090000");
        assert_eq!(balance.cash_balance.cents(), 10_000);
        assert_eq!(balance.bank_balance.cents(), -2_500);
        assert_eq!(balance.adjustment_history.len(), 2);
        assert_eq!(store.operations().all().await.unwrap().len(), 2);

        let err = service
            .record_operation(OperationKind::Income, Account::Cash, Money::zero(), "", at(1, 12))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_set_balances_only_records_changes() {
        let (store, config) = fixture().await;
        let service = LedgerService::new(&store, &config);

        let (balance, changed) = service
            .set_balances(Some(Money::from_cents(5_000)), None, "arqueo", at(1, 8))
            .await
            .unwrap();
        assert!(changed);
        assert_eq!(balance.cash_balance.cents(), 5_000);

        let (_, changed) = service
            .set_balances(Some(Money::from_cents(5_000)), None, "arqueo", at(1, 9))
            .await
            .unwrap();
        assert!(!changed);
        assert_eq!(service.balance().await.adjustment_history.len(), 1);
    }
}
