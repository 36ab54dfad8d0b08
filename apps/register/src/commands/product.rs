//! # Product Commands
//!
//! Catalog maintenance (`product ...`), the expiry report and repricing.

use tracing::debug;

use caja_core::inventory::{ExpiryStatus, StockUpdate};
use caja_core::{DiscountRate, Product};

use super::{parse_money, parse_optional_date, parse_optional_money, parse_percent, session, Context};
use crate::cli::{ProductCommand, ProductFields, ReportCommand, RepriceCommand, StockFields};
use crate::error::{AppError, AppResult};
use crate::services::ProductPatch;

pub async fn handle(ctx: &Context, command: ProductCommand) -> AppResult<()> {
    let inventory = ctx.inventory();
    match command {
        ProductCommand::Add {
            code,
            fields,
            weighable,
            stock,
        } => {
            let description = fields
                .description
                .clone()
                .ok_or_else(|| AppError::validation("--description is required"))?;
            let price = fields
                .price
                .as_deref()
                .ok_or_else(|| AppError::validation("--price is required"))?;

            let mut product = Product::new(code.trim(), description.trim(), parse_money("price", price)?, weighable);
            let patch = patch_from(&fields)?;
            product.discount = patch.discount.unwrap_or_default();
            product.cost = patch.cost;
            product.expiry_date = patch.expiry_date;
            product.stock_quantity = stock.unwrap_or(0.0);

            let added = inventory.add(product).await?;
            ctx.output.print(&added, |p| println!("Added {} {}", p.code, p.description))
        }
        ProductCommand::Update {
            code,
            new_code,
            fields,
            weighable,
        } => {
            let patch = ProductPatch {
                code: new_code,
                is_weighable: weighable,
                ..patch_from(&fields)?
            };
            let updated = inventory.update(&code, &patch).await?;
            ctx.output.print(&updated, |p| print_product(ctx, p))
        }
        ProductCommand::Remove { code } => {
            let removed = inventory.remove(&code).await?;
            ctx.output
                .print(&removed, |p| println!("Removed {} {}", p.code, p.description))
        }
        ProductCommand::List => {
            let catalog = inventory.list().await;
            ctx.output.print(&catalog, |catalog| {
                if catalog.is_empty() {
                    println!("Catalog is empty");
                }
                for product in catalog {
                    print_product(ctx, product);
                }
            })
        }
        ProductCommand::Restock {
            code,
            quantity,
            fields,
        } => {
            let update = stock_update(&fields)?;
            let product = inventory.restock(&code, quantity, &update, ctx.now().date()).await?;
            ctx.output.print(&product, |p| {
                println!("{} stock {} (+{})", p.code, stock_label(p), quantity)
            })
        }
        ProductCommand::Count {
            code,
            quantity,
            fields,
        } => {
            let update = stock_update(&fields)?;
            let product = inventory.count(&code, quantity, &update).await?;
            ctx.output
                .print(&product, |p| println!("{} stock {}", p.code, stock_label(p)))
        }
    }
}

pub async fn report(ctx: &Context, command: ReportCommand) -> AppResult<()> {
    match command {
        ReportCommand::Expiry { within } => {
            let entries = ctx.inventory().expiry_report(ctx.now().date(), within).await;
            ctx.output.print(&entries, |entries| {
                if entries.is_empty() {
                    println!("No products with an expiry date");
                }
                for entry in entries {
                    let status = match entry.status {
                        ExpiryStatus::Expired => "EXPIRED",
                        ExpiryStatus::Critical => "critical",
                        ExpiryStatus::Warning => "warning",
                        ExpiryStatus::Fresh => "ok",
                    };
                    println!(
                        "  {:<9} {:<8} {:<24} {}  {:>5} days  {:>12}",
                        status,
                        entry.code,
                        entry.description,
                        entry.expiry_date.format("%d/%m/%Y"),
                        entry.days_left,
                        ctx.money(entry.price)
                    );
                }
            })
        }
        ReportCommand::Session { session_id } => session::report(ctx, session_id.as_deref()).await,
    }
}

pub async fn reprice(ctx: &Context, command: RepriceCommand) -> AppResult<()> {
    let inventory = ctx.inventory();
    match command {
        RepriceCommand::Expiring { percent } => {
            let discount = parse_percent(&percent)?;
            let changes = inventory.reprice_expiring(ctx.now().date(), discount).await?;
            ctx.output.print(&changes, |changes| {
                if changes.is_empty() {
                    println!("Nothing to reprice");
                }
                for change in changes {
                    println!(
                        "  {:<8} {:>12} -> {:>12}",
                        change.code,
                        ctx.money(change.old_price),
                        ctx.money(change.new_price)
                    );
                }
            })
        }
        RepriceCommand::Product { code, percent } => {
            let discount: DiscountRate = parse_percent(&percent)?;
            let change = inventory.reprice_product(&code, discount).await?;
            ctx.output.print(&change, |c| {
                println!(
                    "{}: {} -> {}",
                    c.code,
                    ctx.money(c.old_price),
                    ctx.money(c.new_price)
                )
            })
        }
    }
}

fn patch_from(fields: &ProductFields) -> AppResult<ProductPatch> {
    let patch = ProductPatch {
        description: fields.description.clone(),
        price: parse_optional_money("price", fields.price.as_deref())?,
        discount: fields.discount.as_deref().map(parse_percent).transpose()?,
        cost: parse_optional_money("cost", fields.cost.as_deref())?,
        expiry_date: parse_optional_date(fields.expiry.as_deref())?,
        ..ProductPatch::default()
    };
    debug!(patch = ?patch, "Product fields parsed");
    Ok(patch)
}

fn stock_update(fields: &StockFields) -> AppResult<StockUpdate> {
    Ok(StockUpdate {
        cost: parse_optional_money("cost", fields.cost.as_deref())?,
        price: parse_optional_money("price", fields.price.as_deref())?,
        expiry_date: parse_optional_date(fields.expiry.as_deref())?,
    })
}

fn stock_label(product: &Product) -> String {
    if product.is_weighable {
        format!("{:.3} kg", product.stock_quantity)
    } else {
        format!("{} u", product.stock_quantity)
    }
}

fn print_product(ctx: &Context, product: &Product) {
    let price = if product.is_weighable {
        format!("{}/kg", ctx.money(product.price))
    } else {
        ctx.money(product.price)
    };
    let discount = if product.discount.is_zero() {
        String::new()
    } else {
        format!(" -{}", product.discount)
    };
    let expiry = product
        .expiry_date
        .map(|d| format!("  expires {}", d.format("%d/%m/%Y")))
        .unwrap_or_default();
    println!(
        "  {:<8} {:<28} {:>14}{}  stock {}{}",
        product.code,
        product.description,
        price,
        discount,
        stock_label(product),
        expiry
    );
}
