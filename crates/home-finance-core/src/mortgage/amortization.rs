use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::HomeFinanceError;
use crate::time_value::{self, MONTHS_PER_YEAR};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::HomeFinanceResult;

/// Residual balance we accept as "paid off".
pub const RESIDUAL_TOLERANCE: Decimal = dec!(0.01);

const HIGH_RATE_PERCENT: Decimal = dec!(20);
const LONG_TERM_YEARS: u32 = 40;

/// Longest term the engine will schedule.
pub const MAX_TERM_YEARS: u32 = 100;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A fixed-rate loan to amortize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInput {
    /// Amount borrowed
    pub principal: Money,
    /// Nominal annual rate as a percentage (6.5 = 6.5%)
    pub annual_rate_percent: Percent,
    /// Loan term in whole years
    pub term_years: u32,
}

/// One year of the amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRow {
    pub year: u32,
    pub beginning_balance: Money,
    /// Monthly payment x 12
    pub payment: Money,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub ending_balance: Money,
    pub cumulative_interest: Money,
}

/// Year-by-year schedule, rows in chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSchedule {
    pub monthly_payment: Money,
    pub rows: Vec<YearRow>,
    pub total_paid: Money,
    pub total_interest: Money,
    /// Balance left after the last simulated month, before display clamping.
    pub final_residual: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Fixed monthly payment for a fully amortizing loan.
///
/// r = rate / 100 / 12, n = years * 12
/// payment = P * r * (1+r)^n / ((1+r)^n - 1), or P / n when r = 0.
pub fn compute_monthly_payment(
    principal: Money,
    annual_rate_percent: Percent,
    term_years: u32,
) -> HomeFinanceResult<Money> {
    validate_loan(principal, annual_rate_percent, term_years)?;

    let rate = time_value::monthly_rate(annual_rate_percent);
    time_value::pmt(rate, time_value::months_in(term_years)?, principal)
}

/// Simulate the loan month by month and roll the months up into years.
///
/// A negative balance left by rounding in the final month is clamped to zero
/// on the last row; the raw value is kept in `final_residual`. No corrective
/// final payment is made. Arithmetic that leaves the decimal range is
/// reported as `FinancialImpossibility`.
pub fn build_schedule(
    principal: Money,
    annual_rate_percent: Percent,
    term_years: u32,
    monthly_payment: Money,
) -> HomeFinanceResult<PaymentSchedule> {
    validate_loan(principal, annual_rate_percent, term_years)?;
    if monthly_payment < Decimal::ZERO {
        return Err(HomeFinanceError::invalid(
            "monthly_payment",
            "Monthly payment cannot be negative",
        ));
    }

    let rate = time_value::monthly_rate(annual_rate_percent);
    let annual_payment = time_value::checked_product(
        monthly_payment,
        Decimal::from(MONTHS_PER_YEAR),
        "annual payment",
    )?;

    let mut rows = Vec::with_capacity(term_years as usize);
    let mut balance = principal;
    let mut cumulative_interest = Decimal::ZERO;

    for year in 1..=term_years {
        let beginning_balance = balance;
        let mut interest_paid = Decimal::ZERO;
        let mut principal_paid = Decimal::ZERO;

        for _ in 0..MONTHS_PER_YEAR {
            let interest = time_value::checked_product(balance, rate, "monthly interest")?;
            let principal_component =
                time_value::checked_sum(monthly_payment, -interest, "principal component")?;
            balance = time_value::checked_sum(balance, -principal_component, "loan balance")?;
            interest_paid = time_value::checked_sum(interest_paid, interest, "interest paid")?;
            principal_paid =
                time_value::checked_sum(principal_paid, principal_component, "principal paid")?;
        }

        cumulative_interest =
            time_value::checked_sum(cumulative_interest, interest_paid, "cumulative interest")?;

        rows.push(YearRow {
            year,
            beginning_balance,
            payment: annual_payment,
            principal_paid,
            interest_paid,
            ending_balance: balance,
            cumulative_interest,
        });
    }

    let final_residual = balance;
    if let Some(last) = rows.last_mut() {
        if last.ending_balance < Decimal::ZERO {
            last.ending_balance = Decimal::ZERO;
        }
    }

    Ok(PaymentSchedule {
        monthly_payment,
        total_paid: time_value::checked_product(
            annual_payment,
            Decimal::from(term_years),
            "total paid",
        )?,
        total_interest: cumulative_interest,
        rows,
        final_residual,
    })
}

/// Payment plus schedule, wrapped in the standard output envelope.
pub fn amortize(input: &LoanInput) -> HomeFinanceResult<ComputationOutput<PaymentSchedule>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let monthly_payment =
        compute_monthly_payment(input.principal, input.annual_rate_percent, input.term_years)?;
    let schedule = build_schedule(
        input.principal,
        input.annual_rate_percent,
        input.term_years,
        monthly_payment,
    )?;

    if input.annual_rate_percent.is_zero() {
        warnings.push("Zero-interest loan: payments are straight-line principal".into());
    }
    if input.annual_rate_percent > HIGH_RATE_PERCENT {
        warnings.push(format!(
            "Annual rate of {}% exceeds {HIGH_RATE_PERCENT}%; verify the rate was entered as a percentage",
            input.annual_rate_percent
        ));
    }
    if input.term_years > LONG_TERM_YEARS {
        warnings.push(format!(
            "Term of {} years exceeds the usual {LONG_TERM_YEARS}-year maximum",
            input.term_years
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    debug!(
        principal = %input.principal,
        rate_percent = %input.annual_rate_percent,
        term_years = input.term_years,
        monthly_payment = %monthly_payment,
        elapsed_us = elapsed,
        "amortization schedule built"
    );

    Ok(with_metadata(
        "Fixed-rate mortgage amortization (monthly compounding)",
        input,
        warnings,
        elapsed,
        schedule,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_loan(
    principal: Money,
    annual_rate_percent: Percent,
    term_years: u32,
) -> HomeFinanceResult<()> {
    if principal < Decimal::ZERO {
        return Err(HomeFinanceError::invalid(
            "principal",
            "Principal cannot be negative",
        ));
    }
    if annual_rate_percent < Decimal::ZERO {
        return Err(HomeFinanceError::invalid(
            "annual_rate_percent",
            "Interest rate cannot be negative",
        ));
    }
    if term_years == 0 {
        return Err(HomeFinanceError::invalid(
            "term_years",
            "Loan term must be at least 1 year",
        ));
    }
    if term_years > MAX_TERM_YEARS {
        return Err(HomeFinanceError::invalid(
            "term_years",
            format!("Loan term cannot exceed {MAX_TERM_YEARS} years, got {term_years}"),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn thirty_year() -> LoanInput {
        // $500k home, $100k down
        LoanInput {
            principal: dec!(400000),
            annual_rate_percent: dec!(6),
            term_years: 30,
        }
    }

    #[test]
    fn test_monthly_payment_thirty_year() {
        let payment = compute_monthly_payment(dec!(400000), dec!(6), 30).unwrap();
        assert!(
            (payment - dec!(2398.20)).abs() < dec!(0.01),
            "expected ~2398.20, got {payment}"
        );
    }

    #[test]
    fn test_monthly_payment_zero_rate() {
        let payment = compute_monthly_payment(dec!(100000), Decimal::ZERO, 10).unwrap();
        assert_eq!(payment, dec!(100000) / dec!(120));
        assert!((payment - dec!(833.33)).abs() < dec!(0.01));
    }

    #[test]
    fn test_monthly_payment_zero_principal() {
        let payment = compute_monthly_payment(Decimal::ZERO, dec!(6), 30).unwrap();
        assert_eq!(payment, Decimal::ZERO);
    }

    #[test]
    fn test_schedule_first_and_last_year() {
        let out = amortize(&thirty_year()).unwrap();
        let schedule = &out.result;
        assert_eq!(schedule.rows.len(), 30);

        let first = &schedule.rows[0];
        assert_eq!(first.year, 1);
        assert_eq!(first.beginning_balance, dec!(400000));
        // month-by-month interest on the declining balance
        assert!(
            (first.interest_paid - dec!(23866.38)).abs() < dec!(1),
            "year 1 interest {}",
            first.interest_paid
        );

        let last = schedule.rows.last().unwrap();
        assert_eq!(last.year, 30);
        assert!(last.ending_balance.abs() < RESIDUAL_TOLERANCE);
        assert!(schedule.final_residual.abs() < RESIDUAL_TOLERANCE);
    }

    #[test]
    fn test_rows_chain_balances() {
        let schedule = amortize(&thirty_year()).unwrap().result;
        for pair in schedule.rows.windows(2) {
            assert_eq!(pair[0].ending_balance, pair[1].beginning_balance);
        }
    }

    #[test]
    fn test_principal_paid_sums_to_principal() {
        let schedule = amortize(&thirty_year()).unwrap().result;
        let total: Decimal = schedule.rows.iter().map(|r| r.principal_paid).sum();
        let tolerance = dec!(0.01) * dec!(30);
        assert!((total - dec!(400000)).abs() < tolerance, "sum {total}");
    }

    #[test]
    fn test_cumulative_interest_is_running_sum() {
        let schedule = amortize(&thirty_year()).unwrap().result;
        let mut running = Decimal::ZERO;
        let mut previous = Decimal::ZERO;
        for row in &schedule.rows {
            running += row.interest_paid;
            assert_eq!(row.cumulative_interest, running);
            assert!(row.cumulative_interest >= previous);
            previous = row.cumulative_interest;
        }
        assert_eq!(schedule.total_interest, running);
    }

    #[test]
    fn test_zero_rate_schedule_has_no_interest() {
        let input = LoanInput {
            principal: dec!(100000),
            annual_rate_percent: Decimal::ZERO,
            term_years: 10,
        };
        let out = amortize(&input).unwrap();
        assert!(out.result.rows.iter().all(|r| r.interest_paid.is_zero()));
        assert!(out.result.rows.last().unwrap().ending_balance.abs() < RESIDUAL_TOLERANCE);
        assert!(out.warnings.iter().any(|w| w.contains("Zero-interest")));
    }

    #[test]
    fn test_zero_term_rejected() {
        let input = LoanInput {
            principal: dec!(100000),
            annual_rate_percent: dec!(5),
            term_years: 0,
        };
        match amortize(&input).unwrap_err() {
            HomeFinanceError::InvalidInput { field, .. } => assert_eq!(field, "term_years"),
            e => panic!("Expected InvalidInput, got {e:?}"),
        }
    }

    #[test]
    fn test_negative_principal_rejected() {
        let result = compute_monthly_payment(dec!(-1), dec!(5), 30);
        assert!(matches!(result, Err(HomeFinanceError::InvalidInput { .. })));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let result = build_schedule(dec!(1000), dec!(-0.5), 5, dec!(20));
        assert!(matches!(result, Err(HomeFinanceError::InvalidInput { .. })));
    }

    #[test]
    fn test_overpayment_clamps_final_row_and_reports_residual() {
        // 1,200 over one year at 0% with a 101/month payment overshoots by 12
        let schedule = build_schedule(dec!(1200), Decimal::ZERO, 1, dec!(101)).unwrap();
        assert_eq!(schedule.rows[0].ending_balance, Decimal::ZERO);
        assert_eq!(schedule.final_residual, dec!(-12));
    }

    #[test]
    fn test_negative_payment_rejected() {
        match build_schedule(dec!(1000), dec!(5), 5, dec!(-1)).unwrap_err() {
            HomeFinanceError::InvalidInput { field, .. } => assert_eq!(field, "monthly_payment"),
            e => panic!("Expected InvalidInput, got {e:?}"),
        }
    }

    #[test]
    fn test_excessive_term_rejected() {
        match compute_monthly_payment(dec!(1000), dec!(6), 400_000_000).unwrap_err() {
            HomeFinanceError::InvalidInput { field, .. } => assert_eq!(field, "term_years"),
            e => panic!("Expected InvalidInput, got {e:?}"),
        }
        let input = LoanInput {
            principal: dec!(1000),
            annual_rate_percent: Decimal::ZERO,
            term_years: 100_000_000,
        };
        assert!(matches!(
            amortize(&input),
            Err(HomeFinanceError::InvalidInput { .. })
        ));
        assert!(compute_monthly_payment(dec!(1000), dec!(6), MAX_TERM_YEARS).is_ok());
    }

    #[test]
    fn test_principal_near_decimal_max_is_an_error() {
        let input = LoanInput {
            principal: dec!(50_000_000_000_000_000_000_000_000_000),
            annual_rate_percent: dec!(6),
            term_years: 30,
        };
        assert!(matches!(
            amortize(&input),
            Err(HomeFinanceError::FinancialImpossibility(_))
        ));
    }

    #[test]
    fn test_oversized_caller_payment_is_an_error() {
        let result = build_schedule(dec!(1000), dec!(6), 30, Decimal::MAX);
        assert!(matches!(
            result,
            Err(HomeFinanceError::FinancialImpossibility(_))
        ));
    }

    #[test]
    fn test_high_rate_warning() {
        let input = LoanInput {
            principal: dec!(10000),
            annual_rate_percent: dec!(25),
            term_years: 5,
        };
        let out = amortize(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("exceeds 20%")));
    }
}
