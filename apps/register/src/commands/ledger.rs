//! # Ledger Commands
//!
//! `op income|expense` and `balance show|set`.

use caja_core::ledger::{Account, OperationKind};

use super::{parse_money, parse_optional_money, Context};
use crate::cli::{BalanceCommand, OpArgs, OpCommand};
use crate::error::{AppError, AppResult};

pub async fn operation(ctx: &Context, command: OpCommand) -> AppResult<()> {
    let (kind, args): (OperationKind, OpArgs) = match command {
        OpCommand::Income(args) => (OperationKind::Income, args),
        OpCommand::Expense(args) => (OperationKind::Expense, args),
    };
    let amount = parse_money("amount", &args.amount)?;
    let account: Account = args.account.parse()?;

    let (operation, balance) = ctx
        .ledger()
        .record_operation(kind, account, amount, &args.note, ctx.now())
        .await?;
    ctx.output.print(&operation, |op| {
        println!("{} {} {} recorded", op.kind, op.account, ctx.money(op.amount));
        println!(
            "  Cash {}  Bank {}",
            ctx.money(balance.cash_balance),
            ctx.money(balance.bank_balance)
        );
    })
}

pub async fn balance(ctx: &Context, command: BalanceCommand) -> AppResult<()> {
    let ledger = ctx.ledger();
    match command {
        BalanceCommand::Show { history } => {
            let balance = ledger.balance().await;
            ctx.output.print(&balance, |b| {
                println!("Cash {}", ctx.money(b.cash_balance));
                println!("Bank {}", ctx.money(b.bank_balance));
                for adjustment in b.adjustment_history.iter().take(history) {
                    println!(
                        "  {}  {:>12} {:>12}  {}",
                        adjustment.timestamp.format("%d/%m/%Y %H:%M"),
                        ctx.money(adjustment.cash_balance),
                        ctx.money(adjustment.bank_balance),
                        adjustment.note
                    );
                }
            })
        }
        BalanceCommand::Set { cash, bank, note } => {
            if cash.is_none() && bank.is_none() {
                return Err(AppError::validation("Give --cash and/or --bank"));
            }
            let cash = parse_optional_money("cash", cash.as_deref())?;
            let bank = parse_optional_money("bank", bank.as_deref())?;
            let (balance, changed) = ledger.set_balances(cash, bank, &note, ctx.now()).await?;
            ctx.output.print(&balance, |b| {
                if !changed {
                    println!("Balances unchanged");
                }
                println!("Cash {}  Bank {}", ctx.money(b.cash_balance), ctx.money(b.bank_balance));
            })
        }
    }
}
