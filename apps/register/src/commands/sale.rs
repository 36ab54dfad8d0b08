//! # Sale Commands
//!
//! `sell` runs a whole ticket from the command line; `ticket next` shows
//! the number the next ticket would get and `ticket show` reprints one.

use serde::Serialize;
use tracing::info;

use caja_core::Ticket;

use super::Context;
use crate::cli::TicketCommand;
use crate::error::{AppError, AppResult};
use crate::services::PaymentRequest;

pub async fn sell(ctx: &Context, inputs: &[String], payments: &[String]) -> AppResult<()> {
    let payments = payments
        .iter()
        .map(|p| p.parse::<PaymentRequest>())
        .collect::<AppResult<Vec<_>>>()?;

    let session = ctx.sessions().require_active().await?;
    let receipt = ctx.checkout().sell(&session, inputs, &payments, ctx.now()).await?;

    ctx.output.print(&receipt, |r| {
        print_ticket(ctx, &r.ticket);
        for code in &r.recreated {
            println!("note: {} was missing from the catalog and was re-created", code);
        }
        for problem in &r.unapplied {
            println!("WARNING: {}", problem);
        }
    })
}

#[derive(Debug, Serialize)]
struct NextTicket {
    ticket_number: String,
}

pub async fn ticket(ctx: &Context, command: TicketCommand) -> AppResult<()> {
    match command {
        TicketCommand::Next => {
            let ticket_number = ctx.store.tickets().next_number(ctx.now().date()).await?;
            info!(ticket_number = %ticket_number, "Next ticket number");
            ctx.output
                .print(&NextTicket { ticket_number }, |n| println!("{}", n.ticket_number))
        }
        TicketCommand::Show { number } => {
            let ticket = ctx
                .store
                .tickets()
                .get(number.trim())
                .await?
                .ok_or_else(|| AppError::not_found("Ticket", &number))?;
            ctx.output.print(&ticket, |t| print_ticket(ctx, t))
        }
    }
}

/// Receipt-style dump of a closed ticket.
pub fn print_ticket(ctx: &Context, ticket: &Ticket) {
    println!("{}", ctx.config.store_name);
    println!(
        "Ticket {}  {}  {}",
        ticket.ticket_number,
        ticket.issued_at.format("%d/%m/%Y %H:%M"),
        ticket.cashier
    );
    for line in &ticket.line_items {
        println!(
            "  {:<8} {:<24} {:>6}{} x {:>10} {:>12}",
            line.code,
            line.description,
            line.quantity,
            line.unit,
            ctx.money(line.unit_price),
            ctx.money(line.subtotal)
        );
    }
    println!("  {:<48}{:>14}", "Total", ctx.money(ticket.total));
    if !ticket.discount.is_zero() {
        println!("  {:<48}{:>14}", "VIP discount", ctx.money(-ticket.discount));
        println!("  {:<48}{:>14}", "Due", ctx.money(ticket.amount_due()));
    }
    for payment in &ticket.payments {
        let label = match &payment.customer {
            Some(customer) => format!("{} ({})", payment.method, customer),
            None => payment.method.to_string(),
        };
        println!("  {:<48}{:>14}", label, ctx.money(payment.amount));
    }
    if !ticket.change.is_zero() {
        println!("  {:<48}{:>14}", "Change", ctx.money(ticket.change));
    }
}
