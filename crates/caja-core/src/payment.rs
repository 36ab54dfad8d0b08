//! # Payment Splitter
//!
//! Collects the payments for a ticket in checkout and decides when it can
//! close.
//!
//! ## Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  due       = total - Σ discount          (VIP credit discount)          │
//! │  remaining = due - Σ amount                                             │
//! │                                                                         │
//! │  Cash          may exceed remaining  → change = paid - due              │
//! │  Transfer      must be ≤ remaining                                      │
//! │  CardTerminal  must be ≤ remaining                                      │
//! │  Credit        must be ≤ remaining, needs a customer;                   │
//! │                VIP → amount recorded = round(requested × 0.90)          │
//! │                                                                         │
//! │  can_confirm ⇔ remaining ≤ 0                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use caja_core::money::Money;
//! use caja_core::payment::PaymentSplitter;
//! use caja_core::types::{DiscountRate, PaymentMethod};
//!
//! let mut splitter = PaymentSplitter::new(Money::from_cents(10000), DiscountRate::from_bps(1000));
//! splitter.add_payment(PaymentMethod::Cash, Money::from_cents(12000), None).unwrap();
//! assert!(splitter.can_confirm());
//! assert_eq!(splitter.change().cents(), 2000);
//! ```

use crate::customer::Customer;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{DiscountRate, Payment, PaymentMethod};
use crate::validation::validate_amount;

/// Payments collected for one ticket during checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSplitter {
    total: Money,
    vip_discount: DiscountRate,
    payments: Vec<Payment>,
}

impl PaymentSplitter {
    pub fn new(total: Money, vip_discount: DiscountRate) -> Self {
        Self {
            total,
            vip_discount,
            payments: Vec::new(),
        }
    }

    /// Gross ticket total.
    pub fn total(&self) -> Money {
        self.total
    }

    /// VIP discount granted so far.
    pub fn discount(&self) -> Money {
        self.payments.iter().map(|p| p.discount).sum()
    }

    pub fn amount_due(&self) -> Money {
        self.total - self.discount()
    }

    pub fn paid(&self) -> Money {
        self.payments.iter().map(|p| p.amount).sum()
    }

    /// Still owed. Negative once cash exceeds what is due.
    pub fn remaining(&self) -> Money {
        self.amount_due() - self.paid()
    }

    pub fn change(&self) -> Money {
        (self.paid() - self.amount_due()).clamp_non_negative()
    }

    pub fn can_confirm(&self) -> bool {
        !self.remaining().is_positive()
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    /// Records one payment request.
    ///
    /// `customer` is required for credit and ignored otherwise. Nothing is
    /// recorded when the request is rejected.
    pub fn add_payment(
        &mut self,
        method: PaymentMethod,
        amount: Money,
        customer: Option<&Customer>,
    ) -> CoreResult<&Payment> {
        validate_amount("payment amount", amount)?;

        let remaining = self.remaining().clamp_non_negative();
        if method != PaymentMethod::Cash && amount > remaining {
            return Err(CoreError::Overpayment {
                method,
                amount,
                remaining,
            });
        }

        let payment = match method {
            PaymentMethod::Credit => {
                let customer = customer.ok_or(CoreError::CustomerRequired)?;
                let (charged, discount) = customer.credit_terms(amount, self.vip_discount);
                Payment {
                    method,
                    amount: charged,
                    customer: Some(customer.name.clone()),
                    discount,
                }
            }
            _ => Payment::new(method, amount),
        };

        self.payments.push(payment);
        Ok(&self.payments[self.payments.len() - 1])
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
