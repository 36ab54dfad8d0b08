//! # Cash Ledger & Balance
//!
//! Income and expense operations recorded outside of tickets
//! (`registro_operaciones.json`) and the running balance of the two
//! accounts they move (`balance.json`).
//!
//! ```text
//!   income  50 cash ──► cash_balance += 50 ──► adjustment pushed (newest first)
//!   expense 20 bank ──► bank_balance -= 20 ──► adjustment pushed
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::validate_amount;

// =============================================================================
// Operations
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Income,
    Expense,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Income => write!(f, "income"),
            OperationKind::Expense => write!(f, "expense"),
        }
    }
}

/// Account an operation moves money in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Account {
    Cash,
    Bank,
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Account::Cash => write!(f, "cash"),
            Account::Bank => write!(f, "bank"),
        }
    }
}

impl FromStr for Account {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "efectivo" | "caja" => Ok(Account::Cash),
            "bank" | "banco" => Ok(Account::Bank),
            _ => Err(ValidationError::NotAllowed {
                field: "account".to_string(),
                allowed: vec!["cash".to_string(), "bank".to_string()],
            }),
        }
    }
}

/// A manual income or expense, tagged with the session it happened in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashOperation {
    pub id: String,
    pub session_id: String,
    pub kind: OperationKind,
    pub account: Account,
    pub amount: Money,
    #[serde(default)]
    pub note: String,
    pub timestamp: NaiveDateTime,
}

impl CashOperation {
    /// Creates an operation with a fresh id. The amount must be positive.
    pub fn new(
        session_id: impl Into<String>,
        kind: OperationKind,
        account: Account,
        amount: Money,
        note: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> CoreResult<Self> {
        validate_amount("operation amount", amount)?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            kind,
            account,
            amount,
            note: note.into().trim().to_string(),
            timestamp,
        })
    }

    /// Signed effect on its account.
    pub fn signed_amount(&self) -> Money {
        match self.kind {
            OperationKind::Income => self.amount,
            OperationKind::Expense => -self.amount,
        }
    }
}

// =============================================================================
// Balance
// =============================================================================

/// Snapshot pushed every time a balance changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceAdjustment {
    pub timestamp: NaiveDateTime,
    pub cash_balance: Money,
    pub bank_balance: Money,
    #[serde(default)]
    pub note: String,
}

/// Running balance of the cash drawer and the bank account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    #[serde(default)]
    pub cash_balance: Money,
    #[serde(default)]
    pub bank_balance: Money,
    /// Newest first.
    #[serde(default)]
    pub adjustment_history: Vec<BalanceAdjustment>,
}

impl Balance {
    /// Reflects an operation into its account.
    pub fn apply(&mut self, operation: &CashOperation) {
        match operation.account {
            Account::Cash => self.cash_balance += operation.signed_amount(),
            Account::Bank => self.bank_balance += operation.signed_amount(),
        }
        let note = if operation.note.is_empty() {
            format!("{} {}", operation.kind, operation.account)
        } else {
            format!("{} {}: {}", operation.kind, operation.account, operation.note)
        };
        self.push_adjustment(operation.timestamp, note);
    }

    /// Overrides one or both balances. Returns false when nothing changed.
    pub fn set(
        &mut self,
        cash: Option<Money>,
        bank: Option<Money>,
        note: impl Into<String>,
        at: NaiveDateTime,
    ) -> bool {
        let new_cash = cash.unwrap_or(self.cash_balance);
        let new_bank = bank.unwrap_or(self.bank_balance);
        if new_cash == self.cash_balance && new_bank == self.bank_balance {
            return false;
        }
        self.cash_balance = new_cash;
        self.bank_balance = new_bank;
        self.push_adjustment(at, note.into());
        true
    }

    fn push_adjustment(&mut self, timestamp: NaiveDateTime, note: String) {
        self.adjustment_history.insert(
            0,
            BalanceAdjustment {
                timestamp,
                cash_balance: self.cash_balance,
                bank_balance: self.bank_balance,
                note,
            },
        );
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_operation_requires_positive_amount() {
        assert!(CashOperation::new("s", OperationKind::Income, Account::Cash, Money::zero(), "", at(9)).is_err());
        let op = CashOperation::new("s", OperationKind::Expense, Account::Bank, Money::from_cents(500), " luz ", at(9))
            .unwrap();
        assert_eq!(op.note, "luz");
        assert_eq!(op.signed_amount().cents(), -500);
        assert!(!op.id.is_empty());
    }

    #[test]
    fn test_apply_moves_the_right_account() {
        let mut balance = Balance::default();
        let income = CashOperation::new("s", OperationKind::Income, Account::Cash, Money::from_cents(5000), "", at(9))
            .unwrap();
        let expense = CashOperation::new("s", OperationKind::Expense, Account::Bank, Money::from_cents(2000), "luz", at(10))
            .unwrap();

        balance.apply(&income);
        balance.apply(&expense);

        assert_eq!(balance.cash_balance.cents(), 5000);
        assert_eq!(balance.bank_balance.cents(), -2000);
        assert_eq!(balance.adjustment_history.len(), 2);
        // newest first
        assert_eq!(balance.adjustment_history[0].timestamp, at(10));
        assert_eq!(balance.adjustment_history[0].note, "expense bank: luz");
    }

    #[test]
    fn test_set_only_records_changes() {
        let mut balance = Balance::default();
        assert!(!balance.set(None, None, "nada", at(9)));
        assert!(!balance.set(Some(Money::zero()), None, "igual", at(9)));
        assert!(balance.adjustment_history.is_empty());

        assert!(balance.set(None, Some(Money::from_cents(10000)), "arqueo", at(11)));
        assert_eq!(balance.bank_balance.cents(), 10000);
        assert!(balance.cash_balance.is_zero());
        assert_eq!(balance.adjustment_history[0].note, "arqueo");
    }

    #[test]
    fn test_account_from_str() {
        assert_eq!("banco".parse::<Account>().unwrap(), Account::Bank);
        assert_eq!("Cash".parse::<Account>().unwrap(), Account::Cash);
        assert!("wallet".parse::<Account>().is_err());
    }
}
