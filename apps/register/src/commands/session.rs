//! # Session Commands
//!
//! `login`, `logout`, `status` and `report session`.

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use caja_core::reconciliation::ClosingReport;
use caja_core::session::Session;
use caja_core::PaymentMethod;
use caja_store::bootstrap::document_status;

use super::Context;
use crate::error::{AppError, AppResult};

pub async fn login(ctx: &Context, username: Option<String>, password: Option<String>) -> AppResult<()> {
    let username = username.unwrap_or_else(|| ctx.config.default_cashier.clone());
    let password = match password {
        Some(p) => p,
        None => prompt(&format!("Password for {}: ", username)).await?,
    };

    let session = ctx.sessions().login(&username, &password, ctx.now()).await?;
    ctx.output.print(&session, |s| {
        println!("{} logged in, session {}", s.cashier, s.session_id);
    })
}

pub async fn logout(ctx: &Context, notes: &[String]) -> AppResult<()> {
    let service = ctx.sessions();
    let notes = service.closing_notes(notes)?;
    let outcome = service.logout(notes, ctx.now()).await?;

    ctx.output.print(&outcome, |o| {
        match &o.report {
            Some(report) => print_report(ctx, report),
            None => println!("No tickets or operations in session {}, nothing to report", o.session.session_id),
        }
        println!("{} logged out", o.session.cashier);
    })
}

/// What `status` shows.
#[derive(Debug, Serialize)]
struct Status {
    store_name: String,
    data_dir: String,
    writable: bool,
    missing_documents: Vec<&'static str>,
    session: Option<Session>,
    last_user: String,
    running: Option<ClosingReport>,
}

pub async fn status(ctx: &Context) -> AppResult<()> {
    let state = ctx.store.sessions().current().await?;
    let session = state.active();
    let running = match session {
        Some(_) => Some(ctx.sessions().preview(ctx.now()).await?),
        None => None,
    };
    let status = Status {
        store_name: ctx.config.store_name.clone(),
        data_dir: ctx.store.data_dir().display().to_string(),
        writable: ctx.store.health_check().await,
        missing_documents: document_status(&ctx.store)
            .await
            .into_iter()
            .filter(|(_, present)| !present)
            .map(|(name, _)| name)
            .collect(),
        session,
        last_user: state.current_user,
        running,
    };

    ctx.output.print(&status, |s| {
        println!("{}", s.store_name);
        if s.writable {
            println!("Data: {}", s.data_dir);
        } else {
            println!("Data: {} (NOT WRITABLE)", s.data_dir);
        }
        for name in &s.missing_documents {
            println!("  missing {}", name);
        }
        match (&s.session, &s.running) {
            (Some(session), Some(report)) => {
                println!(
                    "Logged in: {} since {} (session {})",
                    session.cashier,
                    session.start_time.format("%d/%m/%Y %H:%M"),
                    session.session_id
                );
                print_totals(ctx, report);
            }
            _ if s.last_user.is_empty() => println!("No cashier logged in"),
            _ => println!("No cashier logged in (last: {})", s.last_user),
        }
    })
}

pub async fn report(ctx: &Context, session_id: Option<&str>) -> AppResult<()> {
    let report = ctx.sessions().report(session_id).await?;
    ctx.output.print(&report, |r| print_report(ctx, r))
}

/// Full closing report, as printed at logout.
pub fn print_report(ctx: &Context, report: &ClosingReport) {
    println!("== Closing report {} ==", report.session_id);
    println!(
        "Cashier: {}    Closed: {}",
        report.cashier,
        report.timestamp.format("%d/%m/%Y %H:%M")
    );
    print_totals(ctx, report);

    for (label, total, detail) in [
        ("Income", report.income_total, &report.income_detail),
        ("Expenses", report.expense_total, &report.expense_detail),
    ] {
        println!("{:<16}{:>14}", label, ctx.money(total));
        for op in detail {
            println!(
                "  {}  {:<6} {:>12}  {}",
                op.timestamp.format("%H:%M"),
                op.account.to_string(),
                ctx.money(op.amount),
                op.note
            );
        }
    }

    if report.closing_notes.values().any(Option::is_some) {
        println!("Reported:");
        for (field, amount) in &report.closing_notes {
            match amount {
                Some(amount) => println!("  {:<14}{:>14}", field, ctx.money(*amount)),
                None => println!("  {:<14}{:>14}", field, "-"),
            }
        }
    }
}

fn print_totals(ctx: &Context, report: &ClosingReport) {
    println!("Tickets: {}", report.ticket_count);
    for method in PaymentMethod::ALL {
        println!(
            "  {:<14}{:>14}",
            method.as_str(),
            ctx.money(report.method_totals.get(method))
        );
    }
    println!("{:<16}{:>14}", "Gross", ctx.money(report.grand_total));
    println!("{:<16}{:>14}", "VIP discount", ctx.money(report.discount_total));
    println!("{:<16}{:>14}", "Net", ctx.money(report.net_total));
    println!("{:<16}{:>14}", "Expected cash", ctx.money(report.expected_cash()));
}

/// Reads one line from stdin after printing `label` on stderr.
pub async fn prompt(label: &str) -> AppResult<String> {
    let io_err = |e: std::io::Error| AppError::internal(format!("Cannot prompt on the terminal: {}", e));
    let mut stderr = tokio::io::stderr();
    stderr.write_all(label.as_bytes()).await.map_err(io_err)?;
    stderr.flush().await.map_err(io_err)?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .map_err(io_err)?;
    debug!(label = %label.trim(), "Prompt answered");
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
