//! # Customer Service
//!
//! Credit customers (`clientes.json`): registration, manual charges, debt
//! payments and profile flags. Charges made from a ticket are applied by
//! the checkout service when the ticket closes.

use chrono::NaiveDateTime;
use tracing::info;

use caja_core::customer::{self, find_customer_mut, Customer, DebtEvent};
use caja_core::Money;
use caja_store::Store;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

pub struct CustomerService<'a> {
    store: &'a Store,
    config: &'a AppConfig,
}

impl<'a> CustomerService<'a> {
    pub fn new(store: &'a Store, config: &'a AppConfig) -> Self {
        CustomerService { store, config }
    }

    /// Customers sorted by name.
    pub async fn list(&self) -> Vec<Customer> {
        let mut book = self.store.customers().all_or_empty().await;
        book.sort_by_key(|c| c.name.to_lowercase());
        book
    }

    pub async fn get(&self, name: &str) -> AppResult<Customer> {
        self.store
            .customers()
            .get(name)
            .await?
            .ok_or_else(|| AppError::not_found("Customer", name))
    }

    pub async fn add(&self, name: &str, document: Option<String>, is_vip: bool) -> AppResult<Customer> {
        let customer = Customer::new(name, document, is_vip);
        let added = self
            .store
            .customers()
            .update(|book| {
                customer::add_customer(book, customer.clone())?;
                Ok::<_, AppError>(customer)
            })
            .await?;
        info!(name = %added.name, vip = added.is_vip, "Customer added");
        Ok(added)
    }

    /// Adds a manual charge. VIP customers get the configured discount.
    pub async fn charge(
        &self,
        name: &str,
        amount: Money,
        ticket_number: Option<String>,
        at: NaiveDateTime,
    ) -> AppResult<(Customer, DebtEvent)> {
        let vip_discount = self.config.vip_discount();
        let (customer, event) = self
            .store
            .customers()
            .update(|book| {
                let customer = find_customer_mut(book, name)?;
                let event = customer.charge(amount, vip_discount, ticket_number, at)?.clone();
                Ok::<_, AppError>((customer.clone(), event))
            })
            .await?;
        info!(
            name = %customer.name,
            charged = %event.amount,
            discount = %event.discount,
            debt = %customer.debt,
            "Customer charged"
        );
        Ok((customer, event))
    }

    /// Registers a payment towards the customer's debt.
    pub async fn pay(&self, name: &str, amount: Money, at: NaiveDateTime) -> AppResult<Customer> {
        let customer = self
            .store
            .customers()
            .update(|book| {
                let customer = find_customer_mut(book, name)?;
                customer.pay(amount, at)?;
                Ok::<_, AppError>(customer.clone())
            })
            .await?;
        info!(name = %customer.name, paid = %amount, debt = %customer.debt, "Debt payment received");
        Ok(customer)
    }

    /// Sets the VIP flag and, when given, the document.
    pub async fn set_profile(&self, name: &str, is_vip: Option<bool>, document: Option<String>) -> AppResult<Customer> {
        if is_vip.is_none() && document.is_none() {
            return Err(AppError::validation("Nothing to update"));
        }
        let customer = self
            .store
            .customers()
            .update(|book| {
                customer::update_customer(book, name, is_vip, document)?;
                Ok::<_, AppError>(customer::find_customer(book, name)?.clone())
            })
            .await?;
        info!(name = %customer.name, vip = customer.is_vip, "Customer updated");
        Ok(customer)
    }

    /// Deletes a customer who owes nothing.
    pub async fn remove(&self, name: &str) -> AppResult<Customer> {
        let removed = self
            .store
            .customers()
            .update(|book| Ok::<_, AppError>(customer::remove_customer(book, name)?))
            .await?;
        info!(name = %removed.name, "Customer removed");
        Ok(removed)
    }
}
