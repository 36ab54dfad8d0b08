//! # Interactive Register
//!
//! `caja register` keeps one ticket in memory and reads operator lines
//! from stdin until `quit` or end of input.
//!
//! ## Line Commands
//! ```text
//! ┌──────────────────────────┬──────────────────────────────────────────────┐
//! │  3*A1  20+B2  leche      │  add a line (code, qty*code, amount+code)    │
//! │  del N                   │  remove line N                               │
//! │  qty N Q                 │  set line N to Q units (grams if by weight)  │
//! │  pay cash:120            │  take a payment (starts checkout)            │
//! │  back                    │  leave checkout, payments discarded          │
//! │  ok                      │  close the ticket once fully paid            │
//! │  list                    │  show the ticket                             │
//! │  quit                    │  leave (an unclosed ticket is discarded)     │
//! └──────────────────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! Nothing is written until `ok` closes the ticket. If the ticket cannot
//! be stored it stays in payment and `ok` can be retried; once stored, the
//! next ticket is opened even if stock or debt updates fail.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use caja_core::customer::Customer;
use caja_core::session::Session;
use caja_core::ticket::TicketDraft;
use caja_core::{Product, TicketState};

use super::sale::print_ticket;
use super::Context;
use crate::error::{AppError, AppResult};
use crate::services::{PaymentRequest, SaleReceipt};

/// One parsed operator line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineCommand {
    Add(String),
    Remove(usize),
    Quantity { line: usize, quantity: i64 },
    Pay(PaymentRequest),
    Back,
    Confirm,
    Show,
    Help,
    Quit,
}

impl LineCommand {
    /// Parses one line. Line numbers are 1-based for the operator.
    pub fn parse(line: &str) -> AppResult<Self> {
        let line = line.trim();
        let mut words = line.split_whitespace();
        let head = words.next().unwrap_or_default().to_lowercase();
        let rest: Vec<&str> = words.collect();

        let command = match (head.as_str(), rest.as_slice()) {
            ("" | "list" | "l", []) => LineCommand::Show,
            ("help" | "?", []) => LineCommand::Help,
            ("quit" | "q" | "exit", []) => LineCommand::Quit,
            ("ok", []) => LineCommand::Confirm,
            ("back", []) => LineCommand::Back,
            ("del", [n]) => LineCommand::Remove(line_index(n)?),
            ("qty", [n, q]) => LineCommand::Quantity {
                line: line_index(n)?,
                quantity: q
                    .parse()
                    .map_err(|_| AppError::validation(format!("'{}' is not a whole quantity", q)))?,
            },
            ("pay", [payment]) => LineCommand::Pay(payment.parse()?),
            ("pay", parts) if parts.len() > 1 => LineCommand::Pay(parts.join(" ").parse()?),
            ("del" | "qty" | "pay", _) => {
                return Err(AppError::validation(format!("Usage: {}", usage(&head))));
            }
            _ => LineCommand::Add(line.to_string()),
        };
        Ok(command)
    }
}

fn line_index(raw: &str) -> AppResult<usize> {
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(AppError::validation(format!("'{}' is not a line number", raw))),
    }
}

fn usage(command: &str) -> &'static str {
    match command {
        "del" => "del <line>",
        "qty" => "qty <line> <quantity>",
        _ => "pay <method>:<amount>[:<customer>]",
    }
}

/// Whether the loop keeps reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The register while it runs: the session, a catalog snapshot and the
/// ticket being built.
pub struct Register<'a> {
    ctx: &'a Context,
    session: Session,
    catalog: Vec<Product>,
    customers: Vec<Customer>,
    draft: TicketDraft,
}

impl<'a> Register<'a> {
    pub async fn open(ctx: &'a Context) -> AppResult<Register<'a>> {
        let session = ctx.sessions().require_active().await?;
        let draft = ctx.checkout().open_ticket(&session, ctx.now().date()).await?;
        let mut register = Register {
            ctx,
            session,
            catalog: Vec::new(),
            customers: Vec::new(),
            draft,
        };
        register.reload().await?;
        Ok(register)
    }

    pub fn draft(&self) -> &TicketDraft {
        &self.draft
    }

    /// Catalog and customers change when a ticket closes.
    async fn reload(&mut self) -> AppResult<()> {
        self.catalog = self.ctx.store.products().all().await?;
        self.customers = self.ctx.store.customers().all().await?;
        debug!(
            products = self.catalog.len(),
            customers = self.customers.len(),
            "Register data loaded"
        );
        Ok(())
    }

    pub async fn handle_line(&mut self, line: &str) -> AppResult<Flow> {
        let ctx = self.ctx;
        let checkout = ctx.checkout();
        let command = LineCommand::parse(line)?;
        if command != LineCommand::Quit {
            self.next_ticket().await?;
        }
        match command {
            LineCommand::Add(input) => {
                let added = checkout.add_input(&mut self.draft, &self.catalog, &input)?;
                println!(
                    "+ {} {}  {}{}  {}",
                    added.code,
                    added.description,
                    added.quantity,
                    added.unit,
                    ctx.money(added.subtotal)
                );
                println!("  Total {}", ctx.money(self.draft.total()));
            }
            LineCommand::Remove(index) => {
                let removed = self.draft.remove_line(index)?;
                println!("- {} {}", removed.code, removed.description);
                println!("  Total {}", ctx.money(self.draft.total()));
            }
            LineCommand::Quantity { line, quantity } => {
                let edited = self.draft.edit_quantity(line, quantity)?;
                println!(
                    "  {} now {}{}  {}",
                    edited.code,
                    edited.quantity,
                    edited.unit,
                    ctx.money(edited.subtotal)
                );
                println!("  Total {}", ctx.money(self.draft.total()));
            }
            LineCommand::Pay(request) => {
                let payment = checkout.take_payment(&mut self.draft, &request, &self.customers)?;
                println!("  {} {}", payment.method, ctx.money(payment.amount));
                if let Some(splitter) = self.draft.checkout() {
                    if splitter.can_confirm() {
                        println!("  Paid. Change {}. Type ok to close.", ctx.money(splitter.change()));
                    } else {
                        println!("  Remaining {}", ctx.money(splitter.remaining()));
                    }
                }
            }
            LineCommand::Back => {
                self.draft.cancel_checkout()?;
                println!("  Back to editing, payments discarded");
            }
            LineCommand::Confirm => {
                let receipt = checkout.close(&mut self.draft, ctx.now()).await?;
                self.after_close(&receipt).await?;
            }
            LineCommand::Show => self.show(),
            LineCommand::Help => println!("{}", HELP),
            LineCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    async fn after_close(&mut self, receipt: &SaleReceipt) -> AppResult<()> {
        print_ticket(self.ctx, &receipt.ticket);
        for code in &receipt.recreated {
            println!("  note: {} was missing from the catalog and was re-created", code);
        }
        for problem in &receipt.unapplied {
            println!("  WARNING: {}", problem);
        }
        self.next_ticket().await?;
        if let Err(err) = self.reload().await {
            warn!(error = %err, "Keeping the previous catalog snapshot");
        }
        Ok(())
    }

    /// Replaces a closed draft with the next ticket.
    async fn next_ticket(&mut self) -> AppResult<()> {
        if self.draft.state() != TicketState::Closed {
            return Ok(());
        }
        self.draft = self
            .ctx
            .checkout()
            .open_ticket(&self.session, self.ctx.now().date())
            .await?;
        println!("Ticket {}", self.draft.ticket_number());
        Ok(())
    }

    fn show(&self) {
        println!("Ticket {} ({:?})", self.draft.ticket_number(), self.draft.state());
        for (i, line) in self.draft.lines().iter().enumerate() {
            println!(
                "  {:>2}. {:<8} {:<24} {:>6}{} {:>12}",
                i + 1,
                line.code,
                line.description,
                line.quantity,
                line.unit,
                self.ctx.money(line.subtotal)
            );
        }
        println!("  Total {}", self.ctx.money(self.draft.total()));
        if let Some(splitter) = self.draft.checkout() {
            for payment in splitter.payments() {
                println!("  paid {} {}", payment.method, self.ctx.money(payment.amount));
            }
            println!("  Remaining {}", self.ctx.money(splitter.remaining().clamp_non_negative()));
        }
    }

    /// True when leaving now would drop an unclosed ticket.
    pub fn has_pending_ticket(&self) -> bool {
        matches!(self.draft.state(), TicketState::Open | TicketState::AwaitingPayment)
            && !self.draft.lines().is_empty()
    }
}

const HELP: &str = "\
  <code> | <qty>*<code> | <grams>*<code> | <amount>+<code> | <text>   add a line
  del N          remove line N
  qty N Q        change quantity of line N
  pay m:amount[:customer]   cash, transfer, card, credit
  back           leave checkout
  ok             close the ticket
  list           show the ticket
  quit           leave";

/// Runs the register loop on stdin.
pub async fn run(ctx: &Context) -> AppResult<()> {
    let mut register = Register::open(ctx).await?;
    println!("{} - {}", ctx.config.store_name, register.session.cashier);
    println!("Ticket {} (help for commands)", register.draft().ticket_number());

    let io_err = |e: std::io::Error| AppError::internal(format!("Cannot read the terminal: {}", e));
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"> ").await.map_err(io_err)?;
        stdout.flush().await.map_err(io_err)?;

        let Some(line) = lines.next_line().await.map_err(io_err)? else {
            break;
        };
        match register.handle_line(&line).await {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(err) => ctx.output.error(&err),
        }
    }

    if register.has_pending_ticket() {
        warn!(
            ticket_number = %register.draft().ticket_number(),
            lines = register.draft().lines().len(),
            "Register closed with an unfinished ticket; it was not saved"
        );
    }
    Ok(())
}
