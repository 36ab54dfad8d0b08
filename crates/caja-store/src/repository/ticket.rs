//! # Ticket Repository
//!
//! Append-only log of closed tickets (`tickets.json`).
//!
//! ## Ticket Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  TicketDraft (core, in memory)                                          │
//! │       │  close()                                                        │
//! │       ▼                                                                 │
//! │  Ticket ──► append() ──► tickets.json                                  │
//! │                              │                                          │
//! │                              ├── next_number(today)                    │
//! │                              └── for_session(id) ──► closing report    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stored tickets are never modified.

use chrono::NaiveDate;
use tracing::{debug, info};

use caja_core::ticket::next_ticket_number;
use caja_core::Ticket;

use crate::document::JsonDocument;
use crate::error::{StoreError, StoreResult};
use crate::store::Store;

pub const FILE_NAME: &str = "tickets.json";

/// Repository for closed tickets.
#[derive(Debug, Clone)]
pub struct TicketRepository {
    doc: JsonDocument<Vec<Ticket>>,
}

impl TicketRepository {
    pub fn new(store: &Store) -> Self {
        TicketRepository {
            doc: JsonDocument::new(store.file(FILE_NAME)),
        }
    }

    pub async fn all(&self) -> StoreResult<Vec<Ticket>> {
        self.doc.load().await
    }

    pub async fn all_or_empty(&self) -> Vec<Ticket> {
        self.doc.load_or_empty().await
    }

    /// Appends a closed ticket.
    ///
    /// ## Errors
    /// * `StoreError::Duplicate` - a ticket with the same number exists
    pub async fn append(&self, ticket: &Ticket) -> StoreResult<()> {
        debug!(ticket_number = %ticket.ticket_number, "Appending ticket");

        self.doc
            .update(|tickets| {
                if tickets.iter().any(|t| t.ticket_number == ticket.ticket_number) {
                    return Err(StoreError::duplicate("ticket_number", &ticket.ticket_number));
                }
                tickets.push(ticket.clone());
                Ok(())
            })
            .await?;

        info!(
            ticket_number = %ticket.ticket_number,
            total = %ticket.total,
            session_id = %ticket.session_id,
            "Ticket stored"
        );
        Ok(())
    }

    pub async fn get(&self, ticket_number: &str) -> StoreResult<Option<Ticket>> {
        let tickets = self.doc.load().await?;
        Ok(tickets.into_iter().find(|t| t.ticket_number == ticket_number))
    }

    /// Tickets closed during one cashier session.
    pub async fn for_session(&self, session_id: &str) -> StoreResult<Vec<Ticket>> {
        let tickets = self.doc.load().await?;
        let matching: Vec<Ticket> = tickets
            .into_iter()
            .filter(|t| t.session_id == session_id)
            .collect();
        debug!(session_id = %session_id, count = matching.len(), "Loaded session tickets");
        Ok(matching)
    }

    /// Number the next ticket closed on `today` will get.
    pub async fn next_number(&self, today: NaiveDate) -> StoreResult<String> {
        let tickets = self.doc.load().await?;
        Ok(next_ticket_number(
            tickets.iter().map(|t| t.ticket_number.as_str()),
            today,
        ))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::temp_store;
    use caja_core::{Money, Payment, PaymentMethod};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn ticket(number: String, session: &str, on: NaiveDate) -> Ticket {
        Ticket {
            ticket_number: number,
            day: on,
            issued_at: on.and_hms_opt(10, 0, 0).unwrap(),
            cashier: "cajero_1".to_string(),
            session_id: session.to_string(),
            line_items: Vec::new(),
            total: Money::from_cents(1000),
            discount: Money::zero(),
            payments: vec![Payment::new(PaymentMethod::Cash, Money::from_cents(1000))],
            change: Money::zero(),
        }
    }

    #[tokio::test]
    async fn test_numbering_increases_and_resets_daily() {
        let store = temp_store().await;
        let repo = store.tickets();

        assert_eq!(repo.next_number(day(1)).await.unwrap(), "01-03-2024-1");

        for _ in 0..3 {
            let number = repo.next_number(day(1)).await.unwrap();
            repo.append(&ticket(number, "S1", day(1))).await.unwrap();
        }
        assert_eq!(repo.next_number(day(1)).await.unwrap(), "01-03-2024-4");
        assert_eq!(repo.next_number(day(2)).await.unwrap(), "02-03-2024-1");
    }

    #[tokio::test]
    async fn test_append_rejects_duplicate_number() {
        let store = temp_store().await;
        let repo = store.tickets();
        let t = ticket("01-03-2024-1".to_string(), "S1", day(1));

        repo.append(&t).await.unwrap();
        assert!(matches!(repo.append(&t).await, Err(StoreError::Duplicate { .. })));
        assert_eq!(repo.all().await.unwrap().len(), 1);
        assert!(repo.get("01-03-2024-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_for_session_filters() {
        let store = temp_store().await;
        let repo = store.tickets();
        repo.append(&ticket("01-03-2024-1".to_string(), "S1", day(1))).await.unwrap();
        repo.append(&ticket("01-03-2024-2".to_string(), "S2", day(1))).await.unwrap();
        repo.append(&ticket("01-03-2024-3".to_string(), "S1", day(1))).await.unwrap();

        let s1 = repo.for_session("S1").await.unwrap();
        assert_eq!(s1.len(), 2);
        assert!(s1.iter().all(|t| t.session_id == "S1"));
    }
}
