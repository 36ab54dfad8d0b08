//! # Customer Credit Ledger
//!
//! Customers who buy on credit carry a running debt (`clientes.json`).
//! Every change to the debt is appended to `debt_history`.
//!
//! ```text
//!   charge(50) on VIP ──► debt += 45, Charge { amount: 45, discount: 5 }
//!   pay(20)           ──► debt -= 20, Payment { amount: 20 }
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{DiscountRate, Payment};
use crate::validation::{validate_amount, validate_customer_name};

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtEventKind {
    Charge,
    Payment,
}

/// One entry of a customer's debt history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtEvent {
    pub kind: DebtEventKind,
    /// Amount the debt moved by.
    pub amount: Money,
    /// VIP discount granted on a charge.
    #[serde(default)]
    pub discount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_number: Option<String>,
    pub at: NaiveDateTime,
}

/// A customer allowed to buy on credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    /// National id or similar, unique when present.
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub is_vip: bool,
    #[serde(default)]
    pub debt: Money,
    #[serde(default)]
    pub debt_history: Vec<DebtEvent>,
}

impl Customer {
    pub fn new(name: impl Into<String>, document: Option<String>, is_vip: bool) -> Self {
        Self {
            name: name.into().trim().to_string(),
            document: document
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            is_vip,
            debt: Money::zero(),
            debt_history: Vec::new(),
        }
    }

    /// Case-insensitive name comparison.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }

    /// Splits a credit amount into `(charged, discount)` for this customer.
    pub fn credit_terms(&self, amount: Money, vip_discount: DiscountRate) -> (Money, Money) {
        if self.is_vip {
            let charged = amount.apply_discount(vip_discount);
            (charged, amount - charged)
        } else {
            (amount, Money::zero())
        }
    }

    /// Adds a manual credit charge, applying the VIP discount.
    pub fn charge(
        &mut self,
        amount: Money,
        vip_discount: DiscountRate,
        ticket_number: Option<String>,
        at: NaiveDateTime,
    ) -> CoreResult<&DebtEvent> {
        validate_amount("charge amount", amount)?;
        let (charged, discount) = self.credit_terms(amount, vip_discount);
        Ok(self.push_charge(charged, discount, ticket_number, at))
    }

    /// Applies a credit payment taken at the register when its ticket closes.
    ///
    /// The payment already carries the charged amount and the discount.
    pub fn apply_ticket_credit(
        &mut self,
        payment: &Payment,
        ticket_number: &str,
        at: NaiveDateTime,
    ) -> &DebtEvent {
        self.push_charge(
            payment.amount,
            payment.discount,
            Some(ticket_number.to_string()),
            at,
        )
    }

    /// Registers a debt payment. Must not exceed the outstanding debt.
    pub fn pay(&mut self, amount: Money, at: NaiveDateTime) -> CoreResult<&DebtEvent> {
        validate_amount("payment amount", amount)?;
        if amount > self.debt {
            return Err(CoreError::DebtExceeded {
                debt: self.debt,
                amount,
            });
        }
        self.debt -= amount;
        self.debt_history.push(DebtEvent {
            kind: DebtEventKind::Payment,
            amount,
            discount: Money::zero(),
            ticket_number: None,
            at,
        });
        Ok(self.last_event())
    }

    fn push_charge(
        &mut self,
        charged: Money,
        discount: Money,
        ticket_number: Option<String>,
        at: NaiveDateTime,
    ) -> &DebtEvent {
        self.debt += charged;
        self.debt_history.push(DebtEvent {
            kind: DebtEventKind::Charge,
            amount: charged,
            discount,
            ticket_number,
            at,
        });
        self.last_event()
    }

    fn last_event(&self) -> &DebtEvent {
        // Only called right after a push.
        &self.debt_history[self.debt_history.len() - 1]
    }
}

// =============================================================================
// Customer Book
// =============================================================================

/// Finds a customer by name, ignoring case.
pub fn find_customer<'a>(book: &'a [Customer], name: &str) -> CoreResult<&'a Customer> {
    book.iter()
        .find(|c| c.has_name(name))
        .ok_or_else(|| CoreError::CustomerNotFound(name.trim().to_string()))
}

/// Mutable variant of [`find_customer`].
pub fn find_customer_mut<'a>(book: &'a mut [Customer], name: &str) -> CoreResult<&'a mut Customer> {
    book.iter_mut()
        .find(|c| c.has_name(name))
        .ok_or_else(|| CoreError::CustomerNotFound(name.trim().to_string()))
}

/// Adds a customer. Names and documents are unique.
pub fn add_customer(book: &mut Vec<Customer>, customer: Customer) -> CoreResult<()> {
    validate_customer_name(&customer.name)?;
    if book.iter().any(|c| c.has_name(&customer.name)) {
        return Err(ValidationError::Duplicate {
            field: "customer".to_string(),
            value: customer.name,
        }
        .into());
    }
    ensure_document_free(book, customer.document.as_deref(), None)?;
    book.push(customer);
    Ok(())
}

/// Updates the VIP flag and, when given, the document.
pub fn update_customer(
    book: &mut [Customer],
    name: &str,
    is_vip: Option<bool>,
    document: Option<String>,
) -> CoreResult<()> {
    let document = document.map(|d| d.trim().to_string()).filter(|d| !d.is_empty());
    ensure_document_free(book, document.as_deref(), Some(name))?;

    let customer = find_customer_mut(book, name)?;
    if let Some(is_vip) = is_vip {
        customer.is_vip = is_vip;
    }
    if document.is_some() {
        customer.document = document;
    }
    Ok(())
}

/// Removes a customer who owes nothing.
pub fn remove_customer(book: &mut Vec<Customer>, name: &str) -> CoreResult<Customer> {
    let index = book
        .iter()
        .position(|c| c.has_name(name))
        .ok_or_else(|| CoreError::CustomerNotFound(name.trim().to_string()))?;
    let customer = &book[index];
    if !customer.debt.is_zero() {
        return Err(CoreError::CustomerHasDebt {
            name: customer.name.clone(),
            debt: customer.debt,
        });
    }
    Ok(book.remove(index))
}

fn ensure_document_free(book: &[Customer], document: Option<&str>, owner: Option<&str>) -> CoreResult<()> {
    let Some(document) = document else {
        return Ok(());
    };
    let taken = book.iter().any(|c| {
        c.document.as_deref() == Some(document) && owner.map_or(true, |name| !c.has_name(name))
    });
    if taken {
        return Err(ValidationError::Duplicate {
            field: "document".to_string(),
            value: document.to_string(),
        }
        .into());
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
