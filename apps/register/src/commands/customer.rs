//! # Customer Commands

use caja_core::customer::{Customer, DebtEventKind};

use super::{parse_money, Context};
use crate::cli::CustomerCommand;
use crate::error::AppResult;

pub async fn handle(ctx: &Context, command: CustomerCommand) -> AppResult<()> {
    let customers = ctx.customers();
    match command {
        CustomerCommand::Add { name, document, vip } => {
            let customer = customers.add(&name, document, vip).await?;
            ctx.output.print(&customer, |c| println!("Added customer {}", c.name))
        }
        CustomerCommand::List => {
            let book = customers.list().await;
            ctx.output.print(&book, |book| {
                if book.is_empty() {
                    println!("No customers");
                }
                for customer in book {
                    print_customer(ctx, customer);
                }
            })
        }
        CustomerCommand::Charge { name, amount, ticket } => {
            let amount = parse_money("amount", &amount)?;
            let (customer, event) = customers.charge(&name, amount, ticket, ctx.now()).await?;
            ctx.output.print(&customer, |c| {
                println!("Charged {} to {}", ctx.money(event.amount), c.name);
                if !event.discount.is_zero() {
                    println!("  VIP discount {}", ctx.money(event.discount));
                }
                println!("  Debt {}", ctx.money(c.debt));
            })
        }
        CustomerCommand::Pay { name, amount } => {
            let amount = parse_money("amount", &amount)?;
            let customer = customers.pay(&name, amount, ctx.now()).await?;
            ctx.output.print(&customer, |c| {
                println!("{} paid {}, debt {}", c.name, ctx.money(amount), ctx.money(c.debt))
            })
        }
        CustomerCommand::Vip { name, set, document } => {
            let customer = customers.set_profile(&name, set, document).await?;
            ctx.output.print(&customer, |c| print_customer(ctx, c))
        }
        CustomerCommand::Remove { name } => {
            let removed = customers.remove(&name).await?;
            ctx.output.print(&removed, |c| println!("Removed customer {}", c.name))
        }
    }
}

fn print_customer(ctx: &Context, customer: &Customer) {
    println!(
        "  {:<24} {:<4} {:<12} debt {:>12}",
        customer.name,
        if customer.is_vip { "VIP" } else { "" },
        customer.document.as_deref().unwrap_or("-"),
        ctx.money(customer.debt)
    );
    for event in customer.debt_history.iter().rev().take(3) {
        let sign = match event.kind {
            DebtEventKind::Charge => "+",
            DebtEventKind::Payment => "-",
        };
        println!(
            "      {} {}{}  {}",
            event.at.format("%d/%m/%Y %H:%M"),
            sign,
            ctx.money(event.amount),
            event.ticket_number.as_deref().unwrap_or("")
        );
    }
}
