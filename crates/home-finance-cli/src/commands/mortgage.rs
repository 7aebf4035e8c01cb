use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use home_finance_core::display::{format_currency, format_percent};
use home_finance_core::mortgage::amortization::{self, LoanInput};
use home_finance_core::mortgage::purchase::{self, DownPayment, PurchaseInput};
use home_finance_core::mortgage::rates::{self, RateBoardInput};

use crate::input;

/// Loan terms, given directly or as a purchase
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct LoanArgs {
    /// Amount borrowed (omit when using --home-price)
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Home purchase price; principal = price - down payment
    #[arg(long)]
    pub home_price: Option<Decimal>,

    /// Cash down payment
    #[arg(long, conflicts_with = "down_payment_percent")]
    pub down_payment: Option<Decimal>,

    /// Down payment as a percentage of the home price (20 = 20%)
    #[arg(long)]
    pub down_payment_percent: Option<Decimal>,

    /// Nominal annual interest rate in percent (6.5 = 6.5%)
    #[arg(long, alias = "rate")]
    pub annual_rate_percent: Option<Decimal>,

    /// Loan term in years
    #[arg(long, alias = "term", default_value = "30")]
    pub term_years: u32,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for purchase financing
#[derive(Args)]
pub struct PurchaseArgs {
    #[command(flatten)]
    pub loan: LoanArgs,
}

/// Arguments for the rate board
#[derive(Args)]
pub struct RatesArgs {
    /// Loan amount to price against each product
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Path to JSON input file with custom quotes
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_payment(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = resolve_loan(&args)?;
    let monthly_payment = amortization::compute_monthly_payment(
        loan.principal,
        loan.annual_rate_percent,
        loan.term_years,
    )?;
    Ok(serde_json::json!({
        "result": {
            "monthly_payment": monthly_payment.round_dp(2).to_string(),
            "monthly_payment_display": format_currency(monthly_payment),
            "principal": loan.principal.to_string(),
            "annual_rate": format_percent(loan.annual_rate_percent),
            "term_years": loan.term_years,
        },
        "methodology": "Fixed-rate level payment",
        "warnings": [],
    }))
}

pub fn run_schedule(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = resolve_loan(&args)?;
    let result = amortization::amortize(&loan)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_purchase(args: PurchaseArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let purchase_input: PurchaseInput = if let Some(ref path) = args.loan.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        PurchaseInput {
            home_price: args
                .loan
                .home_price
                .ok_or("--home-price is required (or provide --input)")?,
            down_payment: down_payment_from(&args.loan)?,
            annual_rate_percent: args
                .loan
                .annual_rate_percent
                .ok_or("--annual-rate-percent is required (or provide --input)")?,
            term_years: args.loan.term_years,
        }
    };
    let result = purchase::calculate_purchase(&purchase_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_rates(args: RatesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let board_input: RateBoardInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        RateBoardInput {
            principal: args.principal,
            quotes: None,
        }
    };
    let result = rates::compare_quotes(&board_input)?;
    Ok(serde_json::to_value(result)?)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn resolve_loan(args: &LoanArgs) -> Result<LoanInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_json(path);
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }

    let annual_rate_percent = args
        .annual_rate_percent
        .ok_or("--annual-rate-percent is required (or provide --input)")?;

    let principal = match (args.principal, args.home_price) {
        (Some(principal), None) => principal,
        (None, Some(home_price)) => {
            purchase::financed_principal(home_price, &down_payment_from(args)?)?
        }
        (Some(_), Some(_)) => {
            return Err("use either --principal or --home-price, not both".into());
        }
        (None, None) => {
            return Err("--principal or --home-price is required (or provide --input)".into());
        }
    };

    Ok(LoanInput {
        principal,
        annual_rate_percent,
        term_years: args.term_years,
    })
}

fn down_payment_from(args: &LoanArgs) -> Result<DownPayment, Box<dyn std::error::Error>> {
    match (args.down_payment, args.down_payment_percent) {
        (Some(amount), _) => Ok(DownPayment::Amount(amount)),
        (None, Some(pct)) => Ok(DownPayment::Percent(pct)),
        (None, None) => Ok(DownPayment::Amount(Decimal::ZERO)),
    }
}
