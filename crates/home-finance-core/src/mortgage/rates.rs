use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::display::format_change;
use crate::error::HomeFinanceError;
use crate::mortgage::amortization;
use crate::time_value;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::HomeFinanceResult;

/// Direction of a quoted rate since the previous publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateMovement {
    Up,
    Down,
    Unchanged,
}

/// A published mortgage product rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    pub product: String,
    pub annual_rate_percent: Percent,
    /// Change since the last publication, in percentage points
    pub change: Decimal,
    /// Amortization term used to price the product
    pub term_years: u32,
}

impl RateQuote {
    pub fn new(product: &str, annual_rate_percent: Percent, change: Decimal, term_years: u32) -> Self {
        RateQuote {
            product: product.to_string(),
            annual_rate_percent,
            change,
            term_years,
        }
    }

    pub fn movement(&self) -> RateMovement {
        if self.change > Decimal::ZERO {
            RateMovement::Up
        } else if self.change < Decimal::ZERO {
            RateMovement::Down
        } else {
            RateMovement::Unchanged
        }
    }
}

/// Today's board as published on the site.
///
/// The 5/1 ARM is priced over a 30-year amortization at its initial rate.
pub fn standard_quotes() -> Vec<RateQuote> {
    vec![
        RateQuote::new("30-Year Fixed", dec!(6.75), dec!(0.02), 30),
        RateQuote::new("15-Year Fixed", dec!(5.95), dec!(0.01), 15),
        RateQuote::new("5/1 ARM", dec!(5.25), dec!(-0.03), 30),
        RateQuote::new("FHA 30-Year Fixed", dec!(6.25), dec!(0.02), 30),
        RateQuote::new("VA 30-Year Fixed", dec!(6.00), dec!(0.00), 30),
    ]
}

/// Input for pricing a loan against the rate board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateBoardInput {
    /// Loan amount to price; when absent only the quotes are returned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Money>,
    /// Quotes to compare; defaults to `standard_quotes()`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quotes: Option<Vec<RateQuote>>,
}

/// A quote with the payment it implies for the requested principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotedPayment {
    pub product: String,
    pub annual_rate_percent: Percent,
    pub change: Decimal,
    /// Change as shown on the board (`+0.02`)
    pub change_display: String,
    pub movement: RateMovement,
    pub term_years: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_payment: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_interest: Option<Money>,
    /// Extra monthly cost versus the cheapest product on the board
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium_over_cheapest: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateBoardOutput {
    pub quotes: Vec<QuotedPayment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cheapest_product: Option<String>,
}

/// Price each quote on the board, preserving board order.
pub fn compare_quotes(input: &RateBoardInput) -> HomeFinanceResult<ComputationOutput<RateBoardOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let quotes = input.quotes.clone().unwrap_or_else(standard_quotes);
    if quotes.is_empty() {
        return Err(HomeFinanceError::invalid(
            "quotes",
            "At least one rate quote is required",
        ));
    }
    for quote in &quotes {
        validate_quote(quote)?;
    }

    let mut priced = Vec::with_capacity(quotes.len());
    for quote in &quotes {
        let (monthly_payment, total_interest) = match input.principal {
            Some(principal) => {
                let payment = amortization::compute_monthly_payment(
                    principal,
                    quote.annual_rate_percent,
                    quote.term_years,
                )?;
                let total = time_value::checked_product(
                    payment,
                    Decimal::from(time_value::months_in(quote.term_years)?),
                    "total paid",
                )?;
                (Some(payment), Some(total - principal))
            }
            None => (None, None),
        };

        priced.push(QuotedPayment {
            product: quote.product.clone(),
            annual_rate_percent: quote.annual_rate_percent,
            change: quote.change,
            change_display: format_change(quote.change),
            movement: quote.movement(),
            term_years: quote.term_years,
            monthly_payment,
            total_interest,
            premium_over_cheapest: None,
        });
    }

    let cheapest = priced
        .iter()
        .filter_map(|q| q.monthly_payment.map(|p| (p, q.product.clone())))
        .min_by(|a, b| a.0.cmp(&b.0));

    if let Some((lowest, _)) = &cheapest {
        for q in priced.iter_mut() {
            q.premium_over_cheapest = q.monthly_payment.map(|p| p - lowest);
        }
    }

    if quotes.iter().any(|q| q.product.contains("ARM")) && input.principal.is_some() {
        warnings.push(
            "ARM payments use the initial rate; payments reset after the fixed period".into(),
        );
    }

    let output = RateBoardOutput {
        quotes: priced,
        cheapest_product: cheapest.map(|(_, product)| product),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Rate board pricing at quoted initial rates",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn validate_quote(quote: &RateQuote) -> HomeFinanceResult<()> {
    if quote.product.trim().is_empty() {
        return Err(HomeFinanceError::invalid("product", "Product name is required"));
    }
    if quote.annual_rate_percent < Decimal::ZERO {
        return Err(HomeFinanceError::invalid(
            "annual_rate_percent",
            format!("{}: rate cannot be negative", quote.product),
        ));
    }
    if quote.term_years == 0 {
        return Err(HomeFinanceError::invalid(
            "term_years",
            format!("{}: term must be at least 1 year", quote.product),
        ));
    }
    Ok(())
}
