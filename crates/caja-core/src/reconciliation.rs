//! # Session Reconciliation
//!
//! Builds the closing report for a cashier session from the tickets and
//! cash operations tagged with its id.
//!
//! ## Aggregation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  tickets (session_id = S)                                               │
//! │    ├── cash bucket     += Σ cash payments - change                      │
//! │    ├── transfer bucket += Σ transfer payments                           │
//! │    ├── card bucket     += Σ card terminal payments                      │
//! │    └── credit bucket   += Σ credit payments (amount charged)            │
//! │                                                                         │
//! │  grand_total    = Σ ticket.total                                        │
//! │  discount_total = Σ ticket.discount                                     │
//! │  net_total      = grand_total - discount_total = Σ buckets              │
//! │                                                                         │
//! │  operations (session_id = S)                                            │
//! │    ├── income_total,  income_detail                                     │
//! │    └── expense_total, expense_detail                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ledger::{Account, CashOperation, OperationKind};
use crate::money::Money;
use crate::types::{PaymentMethod, Ticket};

/// Amount the cashier reported for each closing-note field.
/// `None` means the field was left blank ("not reported").
pub type ClosingNotes = BTreeMap<String, Option<Money>>;

/// Money collected per payment method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodTotals {
    pub cash: Money,
    pub transfer: Money,
    pub card_terminal: Money,
    pub credit: Money,
}

impl MethodTotals {
    pub fn get(&self, method: PaymentMethod) -> Money {
        match method {
            PaymentMethod::Cash => self.cash,
            PaymentMethod::Transfer => self.transfer,
            PaymentMethod::CardTerminal => self.card_terminal,
            PaymentMethod::Credit => self.credit,
        }
    }

    fn add(&mut self, method: PaymentMethod, amount: Money) {
        match method {
            PaymentMethod::Cash => self.cash += amount,
            PaymentMethod::Transfer => self.transfer += amount,
            PaymentMethod::CardTerminal => self.card_terminal += amount,
            PaymentMethod::Credit => self.credit += amount,
        }
    }

    pub fn sum(&self) -> Money {
        self.cash + self.transfer + self.card_terminal + self.credit
    }
}

/// Persisted, immutable summary of one session (`cajas_rendidas.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosingReport {
    pub session_id: String,
    pub cashier: String,
    pub timestamp: NaiveDateTime,
    pub method_totals: MethodTotals,
    pub income_total: Money,
    pub income_detail: Vec<CashOperation>,
    pub expense_total: Money,
    pub expense_detail: Vec<CashOperation>,
    #[serde(default)]
    pub closing_notes: ClosingNotes,
    pub grand_total: Money,
    #[serde(default)]
    pub discount_total: Money,
    pub net_total: Money,
    #[serde(default)]
    pub ticket_count: usize,
}

impl ClosingReport {
    /// Cash the drawer should hold from this session's activity.
    pub fn expected_cash(&self) -> Money {
        let cash_ops: Money = self
            .income_detail
            .iter()
            .chain(self.expense_detail.iter())
            .filter(|op| op.account == Account::Cash)
            .map(CashOperation::signed_amount)
            .sum();
        self.method_totals.cash + cash_ops
    }
}

/// Aggregates everything tagged with `session_id` into a report.
///
/// `tickets` and `operations` may hold other sessions' records; they are
/// filtered here.
pub fn build_closing_report(
    session_id: &str,
    cashier: &str,
    tickets: &[Ticket],
    operations: &[CashOperation],
    closing_notes: ClosingNotes,
    timestamp: NaiveDateTime,
) -> ClosingReport {
    let mut method_totals = MethodTotals::default();
    let mut grand_total = Money::zero();
    let mut discount_total = Money::zero();
    let mut ticket_count = 0;

    for ticket in tickets.iter().filter(|t| t.session_id == session_id) {
        ticket_count += 1;
        grand_total += ticket.total;
        discount_total += ticket.discount;
        for payment in &ticket.payments {
            method_totals.add(payment.method, payment.amount);
        }
        method_totals.add(PaymentMethod::Cash, -ticket.change);
    }

    let (income_detail, expense_detail): (Vec<CashOperation>, Vec<CashOperation>) = operations
        .iter()
        .filter(|op| op.session_id == session_id)
        .cloned()
        .partition(|op| op.kind == OperationKind::Income);

    ClosingReport {
        session_id: session_id.to_string(),
        cashier: cashier.to_string(),
        timestamp,
        method_totals,
        income_total: income_detail.iter().map(|op| op.amount).sum(),
        income_detail,
        expense_total: expense_detail.iter().map(|op| op.amount).sum(),
        expense_detail,
        closing_notes,
        grand_total,
        discount_total,
        net_total: grand_total - discount_total,
        ticket_count,
    }
}

/// True when the session produced anything worth reporting.
pub fn session_has_activity(session_id: &str, tickets: &[Ticket], operations: &[CashOperation]) -> bool {
    tickets.iter().any(|t| t.session_id == session_id)
        || operations.iter().any(|op| op.session_id == session_id)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Payment;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
    }

    fn ticket(session: &str, total: i64, discount: i64, payments: Vec<Payment>, change: i64) -> Ticket {
        Ticket {
            ticket_number: "01-03-2024-1".to_string(),
            day: at().date(),
            issued_at: at(),
            cashier: "cajero_1".to_string(),
            session_id: session.to_string(),
            line_items: Vec::new(),
            total: Money::from_cents(total),
            discount: Money::from_cents(discount),
            payments,
            change: Money::from_cents(change),
        }
    }

    fn pay(method: PaymentMethod, cents: i64) -> Payment {
        Payment::new(method, Money::from_cents(cents))
    }

    fn credit(cents: i64, discount: i64) -> Payment {
        Payment {
            method: PaymentMethod::Credit,
            amount: Money::from_cents(cents),
            customer: Some("Juan".to_string()),
            discount: Money::from_cents(discount),
        }
    }

    #[test]
    fn test_cash_bucket_excludes_change() {
        let tickets = vec![ticket("S1", 10000, 0, vec![pay(PaymentMethod::Cash, 12000)], 2000)];
        let report = build_closing_report("S1", "cajero_1", &tickets, &[], ClosingNotes::new(), at());
        assert_eq!(report.method_totals.cash.cents(), 10000);
        assert_eq!(report.grand_total.cents(), 10000);
    }

    #[test]
    fn test_buckets_sum_to_net_total() {
        let tickets = vec![
            ticket("S1", 10000, 0, vec![pay(PaymentMethod::Cash, 12000)], 2000),
            ticket(
                "S1",
                10000,
                500,
                vec![credit(4500, 500), pay(PaymentMethod::Cash, 5000)],
                0,
            ),
            ticket(
                "S1",
                7000,
                0,
                vec![pay(PaymentMethod::Transfer, 3000), pay(PaymentMethod::CardTerminal, 4000)],
                0,
            ),
            ticket("S2", 99900, 0, vec![pay(PaymentMethod::Cash, 99900)], 0),
        ];
        let report = build_closing_report("S1", "cajero_1", &tickets, &[], ClosingNotes::new(), at());

        assert_eq!(report.ticket_count, 3);
        assert_eq!(report.grand_total.cents(), 27000);
        assert_eq!(report.discount_total.cents(), 500);
        assert_eq!(report.net_total.cents(), 26500);
        assert_eq!(report.method_totals.sum(), report.net_total);
        assert_eq!(report.method_totals.credit.cents(), 4500);
        assert_eq!(report.method_totals.get(PaymentMethod::Transfer).cents(), 3000);
    }

    #[test]
    fn test_operations_split_by_kind_and_session() {
        let ops = vec![
            CashOperation::new("S1", OperationKind::Income, Account::Cash, Money::from_cents(1000), "", at()).unwrap(),
            CashOperation::new("S1", OperationKind::Expense, Account::Cash, Money::from_cents(300), "", at()).unwrap(),
            CashOperation::new("S1", OperationKind::Expense, Account::Bank, Money::from_cents(200), "", at()).unwrap(),
            CashOperation::new("S2", OperationKind::Income, Account::Cash, Money::from_cents(5000), "", at()).unwrap(),
        ];
        let mut notes = ClosingNotes::new();
        notes.insert("EFECTIVO".to_string(), Some(Money::from_cents(700)));
        notes.insert("BBVA".to_string(), None);

        let report = build_closing_report("S1", "cajero_1", &[], &ops, notes, at());
        assert_eq!(report.income_total.cents(), 1000);
        assert_eq!(report.expense_total.cents(), 500);
        assert_eq!(report.income_detail.len(), 1);
        assert_eq!(report.expense_detail.len(), 2);
        assert_eq!(report.expected_cash().cents(), 700);
        assert_eq!(report.closing_notes["BBVA"], None);
        assert!(report.net_total.is_zero());
    }

    #[test]
    fn test_session_has_activity() {
        let tickets = vec![ticket("S1", 100, 0, vec![pay(PaymentMethod::Cash, 100)], 0)];
        assert!(session_has_activity("S1", &tickets, &[]));
        assert!(!session_has_activity("S2", &tickets, &[]));
    }
}
