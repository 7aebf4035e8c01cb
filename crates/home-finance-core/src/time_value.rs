use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::HomeFinanceError;
use crate::types::{Money, Percent, Rate};
use crate::HomeFinanceResult;

pub const MONTHS_PER_YEAR: u32 = 12;

/// Monthly periodic rate from a nominal annual percentage (6 -> 0.005).
pub fn monthly_rate(annual_rate_percent: Percent) -> Rate {
    annual_rate_percent / dec!(100) / Decimal::from(MONTHS_PER_YEAR)
}

/// `a * b`, or `FinancialImpossibility` naming `context` when it leaves the decimal range.
pub fn checked_product(a: Decimal, b: Decimal, context: &str) -> HomeFinanceResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| overflow(context))
}

/// `a + b` with the same overflow mapping as `checked_product`.
pub fn checked_sum(a: Decimal, b: Decimal, context: &str) -> HomeFinanceResult<Decimal> {
    a.checked_add(b).ok_or_else(|| overflow(context))
}

/// Number of monthly periods in `term_years`.
pub fn months_in(term_years: u32) -> HomeFinanceResult<u32> {
    term_years
        .checked_mul(MONTHS_PER_YEAR)
        .ok_or_else(|| overflow("months in term"))
}

fn overflow(context: &str) -> HomeFinanceError {
    HomeFinanceError::FinancialImpossibility(format!("{context} exceeds decimal range"))
}

/// (1 + r)^n, rejecting factors outside the 96-bit decimal range.
pub fn compound_factor(rate: Rate, nper: u32) -> HomeFinanceResult<Decimal> {
    (Decimal::ONE + rate)
        .checked_powi(i64::from(nper))
        .ok_or_else(|| {
            HomeFinanceError::FinancialImpossibility(format!(
                "compounding factor (1 + {rate})^{nper} exceeds decimal range"
            ))
        })
}

/// Level payment that amortizes `present_value` over `nper` periods.
///
/// Returned as a positive amount for a positive balance:
/// PV * r * (1+r)^n / ((1+r)^n - 1), or PV / n when r = 0.
pub fn pmt(rate: Rate, nper: u32, present_value: Money) -> HomeFinanceResult<Money> {
    if nper == 0 {
        return Err(HomeFinanceError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if present_value.is_zero() {
        return Ok(Decimal::ZERO);
    }

    if rate.is_zero() {
        return Ok(present_value / Decimal::from(nper));
    }

    let factor = compound_factor(rate, nper)?;
    let denominator = factor - Decimal::ONE;

    if denominator.is_zero() {
        return Err(HomeFinanceError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    let numerator = checked_product(
        checked_product(present_value, rate, "payment numerator")?,
        factor,
        "payment numerator",
    )?;

    Ok(numerator / denominator)
}

/// Outstanding balance after `periods_elapsed` level payments (closed form).
///
/// B_k = P(1+r)^k - M((1+r)^k - 1)/r
pub fn remaining_balance(
    principal: Money,
    rate: Rate,
    payment: Money,
    periods_elapsed: u32,
) -> HomeFinanceResult<Money> {
    if rate.is_zero() {
        return Ok(principal - payment * Decimal::from(periods_elapsed));
    }

    let factor = compound_factor(rate, periods_elapsed)?;
    Ok(principal * factor - payment * (factor - Decimal::ONE) / rate)
}
