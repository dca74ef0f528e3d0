//! Demo ledger seeder for Fundledger development.
//!
//! Seeds two funds, a checking account and a credit card, runs a month of
//! activity through every kind of balance event, closes January and prints
//! each account's balance per period as JSON.
//!
//! Usage: cargo run --bin seeder

use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use fundledger_core::{
    Account, AccountType, CreateAccountRequest, CreateChangeInValueRequest, CreateFundConversionRequest,
    CreateTransactionRequest,
};
use fundledger_shared::types::{AccountId, AccountingPeriodId, FundAmount, FundId};
use fundledger_shared::{AppConfig, LoggingConfig};
use fundledger_store::Ledger;

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    let ledger = Ledger::new(config.ledger.clone());
    let january = ledger.create_period(2025, 1)?;
    let february = ledger.create_period(2025, 2)?;

    let general = ledger.add_fund("General", "Day-to-day spending")?.id;
    let savings = ledger.add_fund("Savings", "Emergency reserve")?.id;

    let checking = ledger.add_account(CreateAccountRequest {
        name: "Checking".to_string(),
        account_type: AccountType::Standard,
        period_id: january.id,
        date: day(2025, 1, 1)?,
        starting_balances: vec![
            FundAmount::new(general, Decimal::new(250_000, 2)),
            FundAmount::new(savings, Decimal::new(100_000, 2)),
        ],
    })?;
    let card = ledger.add_account(CreateAccountRequest {
        name: "Credit Card".to_string(),
        account_type: AccountType::Debt,
        period_id: january.id,
        date: day(2025, 1, 1)?,
        starting_balances: Vec::new(),
    })?;
    info!(accounts = 2, funds = 2, "demo accounts opened");

    let spend = |period_id: AccountingPeriodId,
                 debit: Option<AccountId>,
                 credit: Option<AccountId>,
                 on: NaiveDate,
                 amount: Decimal|
     -> anyhow::Result<_> {
        Ok(ledger.add_transaction(CreateTransactionRequest {
            period_id,
            date: on,
            debit_account: debit,
            credit_account: credit,
            entries: vec![FundAmount::new(general, amount)],
        })?)
    };

    let groceries = spend(january.id, Some(card.id), None, day(2025, 1, 6)?, Decimal::new(12_045, 2))?;
    ledger.post_transaction(groceries.id, card.id, day(2025, 1, 8)?)?;

    let rent = spend(january.id, Some(checking.id), None, day(2025, 1, 3)?, Decimal::new(120_000, 2))?;
    ledger.post_transaction(rent.id, checking.id, day(2025, 1, 3)?)?;

    let payment = spend(
        january.id,
        Some(checking.id),
        Some(card.id),
        day(2025, 1, 25)?,
        Decimal::new(12_045, 2),
    )?;
    ledger.post_transaction(payment.id, checking.id, day(2025, 1, 26)?)?;
    ledger.post_transaction(payment.id, card.id, day(2025, 1, 28)?)?;

    ledger.add_fund_conversion(&CreateFundConversionRequest {
        period_id: january.id,
        date: day(2025, 1, 15)?,
        account_id: checking.id,
        from_fund: general,
        to_fund: savings,
        amount: Decimal::new(20_000, 2),
    })?;
    ledger.add_change_in_value(&CreateChangeInValueRequest {
        period_id: january.id,
        date: day(2025, 1, 31)?,
        account_id: checking.id,
        entry: FundAmount::new(savings, Decimal::new(315, 2)),
    })?;

    ledger.close_period(january.id)?;

    // Left pending so February shows available-to-spend below the posted balance.
    spend(february.id, Some(checking.id), None, day(2025, 2, 4)?, Decimal::new(6_499, 2))?;

    for account in [&checking, &card] {
        print_balances(&ledger, account, &[january.id, february.id], (general, savings))?;
    }
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

fn day(year: i32, month: u32, day: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| anyhow!("invalid date {year}-{month}-{day}"))
}

fn print_balances(
    ledger: &Ledger,
    account: &Account,
    periods: &[AccountingPeriodId],
    (general, savings): (FundId, FundId),
) -> anyhow::Result<()> {
    for period_id in periods {
        let by_period = ledger.balance_by_accounting_period(account.id, *period_id)?;
        println!("{}", serde_json::to_string_pretty(&by_period)?);
    }

    let current = ledger.current_balance(account.id)?;
    let replayed = ledger.replay_from_checkpoint(account.id)?;
    anyhow::ensure!(current == replayed, "checkpoint replay disagrees for {}", account.name);

    info!(
        account = %account.name,
        posted = %current.posted_balance(),
        available = ?current.available_to_spend(),
        general = %current.fund_balance(general),
        savings = %current.fund_balance(savings),
        "current balance"
    );
    Ok(())
}
