//! # Ticket Accumulator
//!
//! The ticket being built at the register, from the first scanned line to
//! the immutable [`Ticket`] that gets persisted.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌──────┐  begin_checkout   ┌─────────────────┐  finalize ┌────────┐  │
//! │   │ Open │ ────────────────► │ AwaitingPayment │ ────────► │ Closed │  │
//! │   └──┬───┘ ◄──────────────── └─────────────────┘  + stored └────────┘  │
//! │      │      cancel_checkout    (payments dropped)   mark_closed         │
//! │      │                                                                  │
//! │      │ abandon (no lines)    ┌───────────┐                              │
//! │      └─────────────────────► │ Abandoned │                              │
//! │                              └───────────┘                              │
//! │                                                                         │
//! │   add_line / remove_line / edit_quantity: Open only                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Numbering
//! Tickets are numbered `dd-mm-yyyy-n`; `n` restarts at 1 every day and
//! otherwise continues from the highest sequence already used that day.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::payment::PaymentSplitter;
use crate::pricing::{price_line, reprice_line};
use crate::resolver::ResolvedItem;
use crate::types::{DiscountRate, LineItem, Ticket, TicketState, Unit};
use crate::validation::{validate_grams, validate_quantity, validate_ticket_size};

// =============================================================================
// Ticket Draft
// =============================================================================

/// A ticket that has not been closed yet.
#[derive(Debug, Clone)]
pub struct TicketDraft {
    ticket_number: String,
    cashier: String,
    session_id: String,
    state: TicketState,
    lines: Vec<LineItem>,
    checkout: Option<PaymentSplitter>,
}

impl TicketDraft {
    pub fn new(
        ticket_number: impl Into<String>,
        cashier: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            ticket_number: ticket_number.into(),
            cashier: cashier.into(),
            session_id: session_id.into(),
            state: TicketState::Open,
            lines: Vec::new(),
            checkout: None,
        }
    }

    pub fn ticket_number(&self) -> &str {
        &self.ticket_number
    }

    pub fn state(&self) -> TicketState {
        self.state
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Sum of line subtotals.
    pub fn total(&self) -> Money {
        self.lines.iter().map(|l| l.subtotal).sum()
    }

    /// Payments in progress, only while awaiting payment.
    pub fn checkout(&self) -> Option<&PaymentSplitter> {
        self.checkout.as_ref()
    }

    /// Mutable access to the payments while awaiting payment.
    pub fn checkout_mut(&mut self) -> CoreResult<&mut PaymentSplitter> {
        self.require(TicketState::AwaitingPayment, "take payments")?;
        self.checkout.as_mut().ok_or(CoreError::InvalidTicketState {
            current: self.state,
            operation: "take payments".to_string(),
        })
    }

    /// Appends a resolved product as a new line.
    pub fn add_line(&mut self, item: &ResolvedItem<'_>) -> CoreResult<&LineItem> {
        self.require(TicketState::Open, "add lines")?;
        validate_ticket_size(self.lines.len())?;
        validate_line_quantity(item.quantity, item.unit)?;

        self.lines.push(price_line(item.product, item.quantity, item.unit));
        Ok(&self.lines[self.lines.len() - 1])
    }

    /// Removes the line at `index` (zero-based).
    pub fn remove_line(&mut self, index: usize) -> CoreResult<LineItem> {
        self.require(TicketState::Open, "remove lines")?;
        if index >= self.lines.len() {
            return Err(CoreError::LineNotFound(index));
        }
        Ok(self.lines.remove(index))
    }

    /// Changes the quantity of a line, keeping its unit and unit price.
    pub fn edit_quantity(&mut self, index: usize, quantity: i64) -> CoreResult<&LineItem> {
        self.require(TicketState::Open, "edit lines")?;
        let line = self
            .lines
            .get_mut(index)
            .ok_or(CoreError::LineNotFound(index))?;
        validate_line_quantity(quantity, line.unit)?;
        reprice_line(line, quantity);
        Ok(&*line)
    }

    /// Moves to payment collection.
    pub fn begin_checkout(&mut self, vip_discount: DiscountRate) -> CoreResult<&mut PaymentSplitter> {
        self.require(TicketState::Open, "check out")?;
        let total = self.total();
        if self.lines.is_empty() || !total.is_positive() {
            return Err(CoreError::EmptyTicket);
        }
        self.state = TicketState::AwaitingPayment;
        Ok(self.checkout.insert(PaymentSplitter::new(total, vip_discount)))
    }

    /// Back to editing; pending payments are discarded.
    pub fn cancel_checkout(&mut self) -> CoreResult<()> {
        self.require(TicketState::AwaitingPayment, "cancel checkout")?;
        self.checkout = None;
        self.state = TicketState::Open;
        Ok(())
    }

    /// Builds the closed ticket once it is fully paid, without leaving
    /// payment collection.
    ///
    /// The draft stays `AwaitingPayment` until [`mark_closed`](Self::mark_closed),
    /// so a failed write can be retried.
    pub fn finalize(&self, issued_at: NaiveDateTime) -> CoreResult<Ticket> {
        self.require(TicketState::AwaitingPayment, "close")?;
        let checkout = self.checkout.as_ref().ok_or(CoreError::InvalidTicketState {
            current: self.state,
            operation: "close".to_string(),
        })?;
        if !checkout.can_confirm() {
            return Err(CoreError::PaymentIncomplete {
                remaining: checkout.remaining(),
            });
        }

        let ticket = Ticket {
            ticket_number: self.ticket_number.clone(),
            day: issued_at.date(),
            issued_at,
            cashier: self.cashier.clone(),
            session_id: self.session_id.clone(),
            line_items: self.lines.clone(),
            total: checkout.total(),
            discount: checkout.discount(),
            payments: checkout.payments().to_vec(),
            change: checkout.change(),
        };
        Ok(ticket)
    }

    /// Marks a finalized ticket as closed.
    pub fn mark_closed(&mut self) -> CoreResult<()> {
        self.require(TicketState::AwaitingPayment, "close")?;
        self.state = TicketState::Closed;
        Ok(())
    }

    /// Drops an empty ticket.
    pub fn abandon(&mut self) -> CoreResult<()> {
        self.require(TicketState::Open, "abandon")?;
        if !self.lines.is_empty() {
            return Err(CoreError::InvalidTicketState {
                current: self.state,
                operation: "abandon a ticket with lines".to_string(),
            });
        }
        self.state = TicketState::Abandoned;
        Ok(())
    }

    fn require(&self, expected: TicketState, operation: &str) -> CoreResult<()> {
        if self.state != expected {
            return Err(CoreError::InvalidTicketState {
                current: self.state,
                operation: operation.to_string(),
            });
        }
        Ok(())
    }
}

fn validate_line_quantity(quantity: i64, unit: Unit) -> CoreResult<()> {
    match unit {
        Unit::Units => validate_quantity(quantity)?,
        Unit::Grams => validate_grams(quantity)?,
    }
    Ok(())
}

// =============================================================================
// Numbering
// =============================================================================

/// Day prefix of every ticket number issued on `day`.
pub fn day_prefix(day: NaiveDate) -> String {
    day.format("%d-%m-%Y").to_string()
}

/// Sequence part of `ticket_number` if it was issued on `day`.
pub fn ticket_sequence(ticket_number: &str, day: NaiveDate) -> Option<u32> {
    ticket_number
        .strip_prefix(&day_prefix(day))?
        .strip_prefix('-')?
        .parse()
        .ok()
}

/// Next ticket number for `today`, given every persisted ticket.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use caja_core::ticket::next_ticket_number;
///
/// let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let existing = ["01-03-2024-1", "01-03-2024-2", "29-02-2024-7"];
/// assert_eq!(next_ticket_number(existing.iter().copied(), today), "01-03-2024-3");
/// ```
pub fn next_ticket_number<'a, I>(existing: I, today: NaiveDate) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let next = existing
        .into_iter()
        .filter_map(|number| ticket_sequence(number, today))
        .max()
        .map_or(1, |max| max + 1);
    format!("{}-{}", day_prefix(today), next)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::Customer;
    use crate::resolver::resolve;
    use crate::types::{PaymentMethod, Product};

    const VIP: DiscountRate = DiscountRate::from_bps(1000);

    fn catalog() -> Vec<Product> {
        vec![
            Product::new("A1", "Arroz", Money::from_cents(1000), false),
            Product::new("B2", "Bananas", Money::from_cents(400), true),
            Product::new("F0", "Bolsa", Money::zero(), false),
        ]
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap()
    }

    fn draft() -> TicketDraft {
        TicketDraft::new("01-03-2024-1", "cajero_1", "20240301-090000")
    }

    fn close(ticket: &mut TicketDraft) -> CoreResult<Ticket> {
        let closed = ticket.finalize(now())?;
        ticket.mark_closed()?;
        Ok(closed)
    }

    #[test]
    fn test_scenario_lines() {
        let catalog = catalog();
        let mut ticket = draft();

        let line = ticket.add_line(&resolve(&catalog, "3*A1", 0.8).unwrap()).unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(line.subtotal.cents(), 3000);

        let line = ticket.add_line(&resolve(&catalog, "20+B2", 0.8).unwrap()).unwrap();
        assert_eq!(line.quantity, 5000);
        assert_eq!(line.unit, Unit::Grams);
        assert_eq!(line.subtotal.cents(), 2000);

        assert_eq!(ticket.total().cents(), 5000);
    }

    #[test]
    fn test_edit_and_remove_lines() {
        let catalog = catalog();
        let mut ticket = draft();
        ticket.add_line(&resolve(&catalog, "a1", 0.8).unwrap()).unwrap();
        ticket.add_line(&resolve(&catalog, "500*b2", 0.8).unwrap()).unwrap();

        let edited = ticket.edit_quantity(1, 250).unwrap();
        assert_eq!(edited.unit, Unit::Grams);
        assert_eq!(edited.subtotal.cents(), 100);

        assert!(ticket.edit_quantity(0, 0).is_err());
        assert!(matches!(ticket.edit_quantity(5, 1), Err(CoreError::LineNotFound(5))));

        let removed = ticket.remove_line(0).unwrap();
        assert_eq!(removed.code, "A1");
        assert_eq!(ticket.lines().len(), 1);
        assert!(ticket.remove_line(3).is_err());
    }

    #[test]
    fn test_checkout_requires_billable_lines() {
        let catalog = catalog();
        let mut ticket = draft();
        assert!(matches!(ticket.begin_checkout(VIP), Err(CoreError::EmptyTicket)));

        ticket.add_line(&resolve(&catalog, "f0", 0.8).unwrap()).unwrap();
        assert!(matches!(ticket.begin_checkout(VIP), Err(CoreError::EmptyTicket)));
        assert_eq!(ticket.state(), TicketState::Open);
    }

    #[test]
    fn test_lines_locked_during_checkout_and_cancel_discards_payments() {
        let catalog = catalog();
        let mut ticket = draft();
        ticket.add_line(&resolve(&catalog, "a1", 0.8).unwrap()).unwrap();

        let checkout = ticket.begin_checkout(VIP).unwrap();
        checkout
            .add_payment(PaymentMethod::Transfer, Money::from_cents(500), None)
            .unwrap();

        assert!(matches!(
            ticket.add_line(&resolve(&catalog, "a1", 0.8).unwrap()),
            Err(CoreError::InvalidTicketState { .. })
        ));
        assert!(ticket.remove_line(0).is_err());

        ticket.cancel_checkout().unwrap();
        assert_eq!(ticket.state(), TicketState::Open);
        assert!(ticket.checkout().is_none());

        let checkout = ticket.begin_checkout(VIP).unwrap();
        assert!(checkout.payments().is_empty());
    }

    #[test]
    fn test_close_requires_full_payment() {
        let catalog = catalog();
        let mut ticket = draft();
        ticket.add_line(&resolve(&catalog, "10*a1", 0.8).unwrap()).unwrap();
        assert!(close(&mut ticket).is_err());

        ticket
            .begin_checkout(VIP)
            .unwrap()
            .add_payment(PaymentMethod::Cash, Money::from_cents(5000), None)
            .unwrap();
        assert!(matches!(
            close(&mut ticket),
            Err(CoreError::PaymentIncomplete { remaining }) if remaining.cents() == 5000
        ));

        ticket
            .checkout_mut()
            .unwrap()
            .add_payment(PaymentMethod::Cash, Money::from_cents(7000), None)
            .unwrap();
        let closed = close(&mut ticket).unwrap();
        assert_eq!(closed.total.cents(), 10000);
        assert_eq!(closed.change.cents(), 2000);
        assert_eq!(closed.day, now().date());
        assert_eq!(closed.session_id, "20240301-090000");
        assert_eq!(ticket.state(), TicketState::Closed);
        assert!(close(&mut ticket).is_err());
    }

    #[test]
    fn test_finalize_keeps_ticket_awaiting_payment() {
        let catalog = catalog();
        let mut ticket = draft();
        ticket.add_line(&resolve(&catalog, "a1", 0.8).unwrap()).unwrap();
        ticket
            .begin_checkout(VIP)
            .unwrap()
            .add_payment(PaymentMethod::Cash, Money::from_cents(1000), None)
            .unwrap();

        let first = ticket.finalize(now()).unwrap();
        assert_eq!(ticket.state(), TicketState::AwaitingPayment);
        let retried = ticket.finalize(now()).unwrap();
        assert_eq!(first, retried);

        ticket.mark_closed().unwrap();
        assert_eq!(ticket.state(), TicketState::Closed);
        assert!(ticket.mark_closed().is_err());
        assert!(ticket.finalize(now()).is_err());
    }

    #[test]
    fn test_close_with_vip_credit() {
        let catalog = catalog();
        let juan = Customer::new("Juan", None, true);
        let mut ticket = draft();
        ticket.add_line(&resolve(&catalog, "10*a1", 0.8).unwrap()).unwrap();

        let checkout = ticket.begin_checkout(VIP).unwrap();
        checkout
            .add_payment(PaymentMethod::Credit, Money::from_cents(5000), Some(&juan))
            .unwrap();
        checkout
            .add_payment(PaymentMethod::Cash, Money::from_cents(5000), None)
            .unwrap();

        let closed = close(&mut ticket).unwrap();
        assert_eq!(closed.discount.cents(), 500);
        assert_eq!(closed.amount_due().cents(), 9500);
        assert_eq!(closed.paid().cents(), 9500);
        assert!(closed.change.is_zero());
    }

    #[test]
    fn test_abandon_only_when_empty() {
        let catalog = catalog();
        let mut ticket = draft();
        ticket.add_line(&resolve(&catalog, "a1", 0.8).unwrap()).unwrap();
        assert!(ticket.abandon().is_err());

        ticket.remove_line(0).unwrap();
        ticket.abandon().unwrap();
        assert_eq!(ticket.state(), TicketState::Abandoned);
        assert!(ticket.add_line(&resolve(&catalog, "a1", 0.8).unwrap()).is_err());
    }

    #[test]
    fn test_numbering_increases_and_resets_daily() {
        let day1 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let day2 = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();

        let mut issued: Vec<String> = Vec::new();
        for expected in 1..=3 {
            let next = next_ticket_number(issued.iter().map(String::as_str), day1);
            assert_eq!(next, format!("01-03-2024-{}", expected));
            issued.push(next);
        }

        let next = next_ticket_number(issued.iter().map(String::as_str), day2);
        assert_eq!(next, "02-03-2024-1");
    }

    #[test]
    fn test_numbering_uses_max_not_count() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let existing = ["01-03-2024-2", "01-03-2024-10", "01-03-2024-x"];
        assert_eq!(next_ticket_number(existing.iter().copied(), day), "01-03-2024-11");
        assert_eq!(ticket_sequence("01-03-2024-10", day), Some(10));
        assert_eq!(ticket_sequence("01-03-20241", day), None);
    }
}
