use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::HomeFinanceError;
use crate::mortgage::amortization::{self, PaymentSchedule};
use crate::time_value;
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::HomeFinanceResult;

/// Below this down payment lenders usually require mortgage insurance.
const PMI_THRESHOLD_PERCENT: Decimal = dec!(20);

/// How the buyer states the down payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownPayment {
    /// Cash amount
    Amount(Money),
    /// Percentage of the home price (20 = 20%)
    Percent(Percent),
}

/// Input for financing a home purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseInput {
    pub home_price: Money,
    pub down_payment: DownPayment,
    pub annual_rate_percent: Percent,
    pub term_years: u32,
}

/// Financing summary for a purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOutput {
    pub home_price: Money,
    pub down_payment_amount: Money,
    pub down_payment_percent: Percent,
    pub loan_amount: Money,
    /// Loan amount / home price
    pub loan_to_value: Rate,
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_paid: Money,
    pub schedule: PaymentSchedule,
}

/// Cash down payment implied by `down_payment` on a home of `home_price`.
pub fn down_payment_amount(home_price: Money, down_payment: &DownPayment) -> HomeFinanceResult<Money> {
    if home_price <= Decimal::ZERO {
        return Err(HomeFinanceError::invalid(
            "home_price",
            "Home price must be positive",
        ));
    }

    let amount = match down_payment {
        DownPayment::Amount(amount) => {
            if *amount < Decimal::ZERO {
                return Err(HomeFinanceError::invalid(
                    "down_payment",
                    "Down payment cannot be negative",
                ));
            }
            *amount
        }
        DownPayment::Percent(pct) => {
            if *pct < Decimal::ZERO || *pct > dec!(100) {
                return Err(HomeFinanceError::invalid(
                    "down_payment",
                    format!("Down payment percentage must be between 0 and 100, got {pct}"),
                ));
            }
            time_value::checked_product(home_price, *pct, "down payment")? / dec!(100)
        }
    };

    if amount > home_price {
        return Err(HomeFinanceError::invalid(
            "down_payment",
            format!("Down payment {amount} exceeds home price {home_price}"),
        ));
    }

    Ok(amount)
}

/// Principal left to finance after the down payment.
pub fn financed_principal(home_price: Money, down_payment: &DownPayment) -> HomeFinanceResult<Money> {
    Ok(home_price - down_payment_amount(home_price, down_payment)?)
}

/// Derive the loan from the purchase and run the amortization engine on it.
pub fn calculate_purchase(
    input: &PurchaseInput,
) -> HomeFinanceResult<ComputationOutput<PurchaseOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let down_payment = down_payment_amount(input.home_price, &input.down_payment)?;
    let loan_amount = input.home_price - down_payment;
    let down_payment_percent = down_payment / input.home_price * dec!(100);

    let monthly_payment = amortization::compute_monthly_payment(
        loan_amount,
        input.annual_rate_percent,
        input.term_years,
    )?;
    let schedule = amortization::build_schedule(
        loan_amount,
        input.annual_rate_percent,
        input.term_years,
        monthly_payment,
    )?;

    if loan_amount.is_zero() {
        warnings.push("Down payment covers the full price; nothing to finance".into());
    } else if down_payment_percent < PMI_THRESHOLD_PERCENT {
        warnings.push(format!(
            "Down payment of {}% is below {PMI_THRESHOLD_PERCENT}%; expect private mortgage insurance on top of this payment",
            down_payment_percent.round_dp(2)
        ));
    }

    let output = PurchaseOutput {
        home_price: input.home_price,
        down_payment_amount: down_payment,
        down_payment_percent,
        loan_amount,
        loan_to_value: loan_amount / input.home_price,
        monthly_payment,
        total_interest: schedule.total_interest,
        total_paid: schedule.total_paid,
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    debug!(
        home_price = %input.home_price,
        loan_amount = %loan_amount,
        monthly_payment = %monthly_payment,
        "purchase financing computed"
    );

    Ok(with_metadata(
        "Purchase financing: price less down payment, fixed-rate amortization",
        input,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_purchase() -> PurchaseInput {
        PurchaseInput {
            home_price: dec!(500000),
            down_payment: DownPayment::Amount(dec!(100000)),
            annual_rate_percent: dec!(6),
            term_years: 30,
        }
    }

    #[test]
    fn test_financed_principal_amount() {
        let p = financed_principal(dec!(500000), &DownPayment::Amount(dec!(100000))).unwrap();
        assert_eq!(p, dec!(400000));
    }

    #[test]
    fn test_financed_principal_percent() {
        let p = financed_principal(dec!(500000), &DownPayment::Percent(dec!(20))).unwrap();
        assert_eq!(p, dec!(400000));
    }

    #[test]
    fn test_purchase_matches_direct_loan() {
        let out = calculate_purchase(&sample_purchase()).unwrap();
        let r = &out.result;
        assert_eq!(r.loan_amount, dec!(400000));
        assert_eq!(r.down_payment_percent, dec!(20));
        assert_eq!(r.loan_to_value, dec!(0.8));
        assert!((r.monthly_payment - dec!(2398.20)).abs() < dec!(0.01));
        assert_eq!(r.schedule.rows.len(), 30);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_low_down_payment_warns() {
        let mut input = sample_purchase();
        input.down_payment = DownPayment::Percent(dec!(5));
        let out = calculate_purchase(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("mortgage insurance")));
    }

    #[test]
    fn test_full_cash_purchase() {
        let mut input = sample_purchase();
        input.down_payment = DownPayment::Percent(dec!(100));
        let out = calculate_purchase(&input).unwrap();
        assert_eq!(out.result.monthly_payment, Decimal::ZERO);
        assert_eq!(out.result.total_interest, Decimal::ZERO);
    }

    #[test]
    fn test_down_payment_above_price_rejected() {
        let result = financed_principal(dec!(300000), &DownPayment::Amount(dec!(300001)));
        assert!(matches!(result, Err(HomeFinanceError::InvalidInput { .. })));
    }

    #[test]
    fn test_zero_home_price_rejected() {
        let result = financed_principal(Decimal::ZERO, &DownPayment::Amount(Decimal::ZERO));
        match result.unwrap_err() {
            HomeFinanceError::InvalidInput { field, .. } => assert_eq!(field, "home_price"),
            e => panic!("Expected InvalidInput, got {e:?}"),
        }
    }

    #[test]
    fn test_percent_over_hundred_rejected() {
        let result = financed_principal(dec!(300000), &DownPayment::Percent(dec!(120)));
        assert!(result.is_err());
    }
}
