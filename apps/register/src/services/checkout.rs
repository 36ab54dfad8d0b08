//! # Checkout Service
//!
//! Builds tickets from operator input, collects payments and applies the
//! side effects of a closed ticket.
//!
//! ## Ticket Close
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  TicketDraft (AwaitingPayment, paid ≥ due)                              │
//! │       │  close(now)                                                     │
//! │       ▼                                                                 │
//! │  1. tickets.json        ← append Ticket (fails: draft unchanged)       │
//! │     draft → Closed                                                      │
//! │  2. clientes.json       ← debt += charged, Charge event per credit     │
//! │  3. inventario.json     ← stock -= sold (grams → kg)                   │
//! │     (2, 3 fail: logged, listed in receipt.unapplied)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  next TicketDraft (Open, next number)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::str::FromStr;
use tracing::{debug, error, info};

use caja_core::customer::{find_customer, find_customer_mut, Customer};
use caja_core::resolver::resolve;
use caja_core::session::Session;
use caja_core::ticket::TicketDraft;
use caja_core::{CoreError, LineItem, Money, Payment, PaymentMethod, Product, Ticket, TicketState};
use caja_store::Store;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

// =============================================================================
// Payment Requests
// =============================================================================

/// One payment as typed by the operator: `method:amount[:customer]`.
///
/// ## Example
/// ```rust,ignore
/// let cash: PaymentRequest = "cash:120".parse()?;
/// let credit: PaymentRequest = "fiado:50:Juan Perez".parse()?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub method: PaymentMethod,
    pub amount: Money,
    pub customer: Option<String>,
}

impl FromStr for PaymentRequest {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let method = parts.next().unwrap_or_default().trim();
        let amount = parts
            .next()
            .ok_or_else(|| AppError::validation(format!("Payment '{}' must be method:amount[:customer]", s)))?;

        let method: PaymentMethod = method
            .parse()
            .map_err(|_| AppError::validation(format!("Unknown payment method '{}'", method)))?;
        let amount = Money::parse(amount)
            .ok_or_else(|| AppError::validation(format!("Invalid payment amount '{}'", amount.trim())))?;
        let customer = parts
            .next()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Ok(PaymentRequest {
            method,
            amount,
            customer,
        })
    }
}

/// A closed ticket and what closing it changed.
#[derive(Debug, Clone, Serialize)]
pub struct SaleReceipt {
    pub ticket: Ticket,
    /// Products that were missing from the catalog and were re-created.
    pub recreated: Vec<String>,
    /// Side effects that could not be written after the ticket was stored.
    pub unapplied: Vec<String>,
}

// =============================================================================
// Service
// =============================================================================

pub struct CheckoutService<'a> {
    store: &'a Store,
    config: &'a AppConfig,
}

impl<'a> CheckoutService<'a> {
    pub fn new(store: &'a Store, config: &'a AppConfig) -> Self {
        CheckoutService { store, config }
    }

    /// A fresh ticket with the next number for `today`.
    pub async fn open_ticket(&self, session: &Session, today: NaiveDate) -> AppResult<TicketDraft> {
        let number = self.store.tickets().next_number(today).await?;
        debug!(ticket_number = %number, "Opened ticket");
        Ok(TicketDraft::new(number, &session.cashier, &session.session_id))
    }

    /// Resolves one line of operator input against `catalog` and adds it.
    pub fn add_input(&self, draft: &mut TicketDraft, catalog: &[Product], input: &str) -> AppResult<LineItem> {
        let item = resolve(catalog, input, self.config.fuzzy_cutoff)?;
        let line = draft.add_line(&item)?.clone();
        debug!(code = %line.code, quantity = line.quantity, subtotal = %line.subtotal, "Line added");
        Ok(line)
    }

    /// Records a payment, moving the ticket to payment collection first if
    /// it is still open.
    pub fn take_payment(
        &self,
        draft: &mut TicketDraft,
        request: &PaymentRequest,
        customers: &[Customer],
    ) -> AppResult<Payment> {
        if draft.state() == TicketState::Open {
            draft.begin_checkout(self.config.vip_discount())?;
        }

        let customer = match (&request.customer, request.method) {
            (Some(name), PaymentMethod::Credit) => Some(find_customer(customers, name)?),
            (None, PaymentMethod::Credit) => return Err(CoreError::CustomerRequired.into()),
            _ => None,
        };

        let payment = draft
            .checkout_mut()?
            .add_payment(request.method, request.amount, customer)?
            .clone();
        debug!(method = %payment.method, amount = %payment.amount, "Payment taken");
        Ok(payment)
    }

    /// Closes a fully paid ticket and applies its side effects.
    ///
    /// The draft only leaves payment collection once the ticket is stored,
    /// so a failed append can be retried with the same draft. Customer debt
    /// and stock are applied afterwards; a failure there is logged and
    /// listed in [`SaleReceipt::unapplied`] instead of failing the sale.
    pub async fn close(&self, draft: &mut TicketDraft, now: NaiveDateTime) -> AppResult<SaleReceipt> {
        let ticket = draft.finalize(now)?;
        self.store.tickets().append(&ticket).await?;
        draft.mark_closed()?;

        let mut unapplied = Vec::new();
        if let Err(err) = self.charge_credits(&ticket, now).await {
            error!(ticket_number = %ticket.ticket_number, error = %err, "Customer debt not updated");
            unapplied.push(format!("customer debt not updated: {}", err.message));
        }

        let recreated = match self.store.products().apply_sale(&ticket.line_items).await {
            Ok(recreated) => recreated,
            Err(err) => {
                error!(ticket_number = %ticket.ticket_number, error = %err, "Stock not updated");
                unapplied.push(format!("stock not updated: {}", err));
                Vec::new()
            }
        };

        info!(
            ticket_number = %ticket.ticket_number,
            total = %ticket.total,
            discount = %ticket.discount,
            change = %ticket.change,
            unapplied = unapplied.len(),
            "Ticket closed"
        );
        Ok(SaleReceipt {
            ticket,
            recreated,
            unapplied,
        })
    }

    async fn charge_credits(&self, ticket: &Ticket, now: NaiveDateTime) -> AppResult<()> {
        let credits: Vec<&Payment> = ticket
            .payments
            .iter()
            .filter(|p| p.method == PaymentMethod::Credit)
            .collect();
        if credits.is_empty() {
            return Ok(());
        }
        self.store
            .customers()
            .update(|book| {
                for payment in &credits {
                    let name = payment.customer.as_deref().ok_or(CoreError::CustomerRequired)?;
                    find_customer_mut(book, name)?.apply_ticket_credit(payment, &ticket.ticket_number, now);
                }
                Ok::<_, AppError>(())
            })
            .await
    }

    /// One-shot sale: every input, every payment, then close.
    ///
    /// Nothing is written unless the ticket closes.
    pub async fn sell(
        &self,
        session: &Session,
        inputs: &[String],
        payments: &[PaymentRequest],
        now: NaiveDateTime,
    ) -> AppResult<SaleReceipt> {
        let catalog = self.store.products().all().await?;
        let customers = self.store.customers().all().await?;

        let mut draft = self.open_ticket(session, now.date()).await?;
        for input in inputs {
            self.add_input(&mut draft, &catalog, input)?;
        }
        if payments.is_empty() {
            return Err(AppError::validation("At least one --pay is required"));
        }
        for request in payments {
            self.take_payment(&mut draft, request, &customers)?;
        }
        self.close(&mut draft, now).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::services::test_support::{at, fixture};
    use caja_core::inventory::find_by_code;

    fn session(day: u32) -> Session {
        Session::start("cajero_1", at(day, 9))
    }

    fn pay(s: &str) -> PaymentRequest {
        s.parse().unwrap()
    }

    #[test]
    fn test_payment_request_parsing() {
        assert_eq!(
            pay("cash:120"),
            PaymentRequest {
                method: PaymentMethod::Cash,
                amount: Money::from_cents(12000),
                customer: None,
            }
        );
        let credit = pay("fiado:50,5:Juan Perez");
        assert_eq!(credit.method, PaymentMethod::Credit);
        assert_eq!(credit.amount.cents(), 5050);
        assert_eq!(credit.customer.as_deref(), Some("Juan Perez"));

        assert!("cash".parse::<PaymentRequest>().is_err());
        assert!("bitcoin:10".parse::<PaymentRequest>().is_err());
        assert!("cash:diez".parse::<PaymentRequest>().is_err());
    }

    #[tokio::test]
    async fn test_sell_units_with_change() {
        let (store, config) = fixture().await;
        let service = CheckoutService::new(&store, &config);

        let receipt = service
            .sell(
                &session(1),
                &["3*A1".to_string(), "a1".to_string()],
                &[pay("cash:50")],
                at(1, 10),
            )
            .await
            .unwrap();

        let ticket = &receipt.ticket;
        assert_eq!(ticket.ticket_number, "01-03-2024-1");
        assert_eq!(ticket.line_items[0].quantity, 3);
        assert_eq!(ticket.line_items[0].subtotal.cents(), 3000);
        assert_eq!(ticket.total.cents(), 4000);
        assert_eq!(ticket.change.cents(), 1000);

        let catalog = store.products().all().await.unwrap();
        assert_eq!(find_by_code(&catalog, "A1").unwrap().stock_quantity, 16.0);
        assert_eq!(store.tickets().all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cash_change_on_round_total() {
        let (store, config) = fixture().await;
        let service = CheckoutService::new(&store, &config);

        let receipt = service
            .sell(&session(1), &["10*A1".to_string()], &[pay("cash:120")], at(1, 10))
            .await
            .unwrap();
        assert_eq!(receipt.ticket.total.cents(), 10000);
        assert_eq!(receipt.ticket.paid().cents(), 12000);
        assert_eq!(receipt.ticket.change.cents(), 2000);
    }

    #[tokio::test]
    async fn test_sell_by_amount_on_weighable() {
        let (store, config) = fixture().await;
        let service = CheckoutService::new(&store, &config);

        let receipt = service
            .sell(&session(1), &["20+B2".to_string()], &[pay("transfer:20")], at(1, 10))
            .await
            .unwrap();

        let line = &receipt.ticket.line_items[0];
        assert_eq!(line.quantity, 5000);
        assert_eq!(line.subtotal.cents(), 2000);

        let catalog = store.products().all().await.unwrap();
        assert_eq!(find_by_code(&catalog, "B2").unwrap().stock_quantity, 5.0);
    }

    #[tokio::test]
    async fn test_transfer_overpayment_rejected_and_nothing_written() {
        let (store, config) = fixture().await;
        let service = CheckoutService::new(&store, &config);

        // 10 * $10.00 = $100.00; transfer 60 then 50 exceeds the remaining 40
        let err = service
            .sell(
                &session(1),
                &["10*A1".to_string()],
                &[pay("transfer:60"), pay("transfer:50")],
                at(1, 10),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentError);
        assert!(store.tickets().all().await.unwrap().is_empty());

        let catalog = store.products().all().await.unwrap();
        assert_eq!(find_by_code(&catalog, "A1").unwrap().stock_quantity, 20.0);
    }

    #[tokio::test]
    async fn test_incomplete_payment_cannot_close() {
        let (store, config) = fixture().await;
        let service = CheckoutService::new(&store, &config);

        let err = service
            .sell(&session(1), &["A1".to_string()], &[pay("card:5")], at(1, 10))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentError);
        assert!(store.tickets().all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_vip_credit_charges_discounted_debt() {
        let (store, config) = fixture().await;
        let service = CheckoutService::new(&store, &config);

        // $100.00 ticket: VIP credit 50 is charged 45 with 5 off, cash covers the other 50
        let receipt = service
            .sell(
                &session(1),
                &["10*A1".to_string()],
                &[pay("credit:50:juan"), pay("cash:50")],
                at(1, 11),
            )
            .await
            .unwrap();

        let ticket = &receipt.ticket;
        assert_eq!(ticket.total.cents(), 10000);
        assert_eq!(ticket.discount.cents(), 500);
        assert_eq!(ticket.amount_due().cents(), 9500);
        assert_eq!(ticket.change.cents(), 0);

        let juan = store.customers().get("Juan").await.unwrap().unwrap();
        assert_eq!(juan.debt.cents(), 4500);
        assert_eq!(juan.debt_history[0].discount.cents(), 500);
        assert_eq!(
            juan.debt_history[0].ticket_number.as_deref(),
            Some("01-03-2024-1")
        );
    }

    #[tokio::test]
    async fn test_close_reports_side_effects_it_could_not_write() {
        let (store, config) = fixture().await;
        let service = CheckoutService::new(&store, &config);
        let catalog = store.products().all().await.unwrap();
        let customers = store.customers().all().await.unwrap();

        let mut draft = service.open_ticket(&session(1), at(1, 0).date()).await.unwrap();
        service.add_input(&mut draft, &catalog, "A1").unwrap();
        service
            .take_payment(&mut draft, &pay("credit:10:Maria"), &customers)
            .unwrap();

        let customers_path = store
            .data_dir()
            .join(caja_store::repository::customer::FILE_NAME);
        tokio::fs::write(&customers_path, b"{not json").await.unwrap();

        let receipt = service.close(&mut draft, at(1, 10)).await.unwrap();
        assert_eq!(draft.state(), TicketState::Closed);
        assert_eq!(receipt.unapplied.len(), 1);
        assert!(receipt.unapplied[0].starts_with("customer debt not updated"));

        assert_eq!(store.tickets().all().await.unwrap().len(), 1);
        let catalog = store.products().all().await.unwrap();
        assert_eq!(find_by_code(&catalog, "A1").unwrap().stock_quantity, 19.0);
    }

    #[tokio::test]
    async fn test_credit_requires_known_customer() {
        let (store, config) = fixture().await;
        let service = CheckoutService::new(&store, &config);

        let err = service
            .sell(&session(1), &["A1".to_string()], &[pay("credit:10")], at(1, 10))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentError);

        let err = service
            .sell(&session(1), &["A1".to_string()], &[pay("credit:10:Nadie")], at(1, 10))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_numbering_across_days() {
        let (store, config) = fixture().await;
        let service = CheckoutService::new(&store, &config);

        for hour in [10, 11] {
            service
                .sell(&session(1), &["A1".to_string()], &[pay("cash:10")], at(1, hour))
                .await
                .unwrap();
        }
        let next_day = service
            .sell(&session(2), &["A1".to_string()], &[pay("cash:10")], at(2, 10))
            .await
            .unwrap();

        assert_eq!(next_day.ticket.ticket_number, "02-03-2024-1");
        let numbers: Vec<String> = store
            .tickets()
            .all()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.ticket_number)
            .collect();
        assert_eq!(numbers, vec!["01-03-2024-1", "01-03-2024-2", "02-03-2024-1"]);
    }

    #[tokio::test]
    async fn test_ambiguous_input_is_reported() {
        let (store, config) = fixture().await;
        let service = CheckoutService::new(&store, &config);
        let catalog = vec![
            Product::new("L1", "Leche entera", Money::from_cents(100), false),
            Product::new("L2", "Leche descremada", Money::from_cents(100), false),
        ];
        let mut draft = service.open_ticket(&session(1), at(1, 9).date()).await.unwrap();

        let err = service.add_input(&mut draft, &catalog, "leche").unwrap_err();
        assert_eq!(err.code, ErrorCode::AmbiguousMatch);
        assert!(draft.lines().is_empty());
    }
}
