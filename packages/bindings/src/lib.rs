use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Mortgage calculator
// ---------------------------------------------------------------------------

#[napi]
pub fn mortgage_payment(input_json: String) -> NapiResult<String> {
    let input: home_finance_core::mortgage::amortization::LoanInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let payment = home_finance_core::mortgage::amortization::compute_monthly_payment(
        input.principal,
        input.annual_rate_percent,
        input.term_years,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({
        "monthly_payment": payment,
        "display": home_finance_core::display::format_currency(payment),
    }))
    .map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: home_finance_core::mortgage::amortization::LoanInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        home_finance_core::mortgage::amortization::amortize(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn purchase_financing(input_json: String) -> NapiResult<String> {
    let input: home_finance_core::mortgage::purchase::PurchaseInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = home_finance_core::mortgage::purchase::calculate_purchase(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Rates
// ---------------------------------------------------------------------------

#[napi]
pub fn rate_board(input_json: String) -> NapiResult<String> {
    let input: home_finance_core::mortgage::rates::RateBoardInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        home_finance_core::mortgage::rates::compare_quotes(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

#[napi]
pub fn format_currency(amount: String) -> NapiResult<String> {
    let value = Decimal::from_str(amount.trim()).map_err(to_napi_error)?;
    Ok(home_finance_core::display::format_currency(value))
}
