use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{Money, Percent};

/// `$1,234.56` style currency string, rounded half away from zero.
pub fn format_currency(amount: Money) -> String {
    let fixed = to_fixed(amount, 2);
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (whole, frac) = digits.split_once('.').unwrap_or((digits, "00"));
    format!("{sign}${}.{frac}", group_thousands(whole))
}

/// `6.75%` style percentage string (input already a percentage).
pub fn format_percent(value: Percent) -> String {
    format!("{}%", to_fixed(value, 2))
}

/// Signed rate change as shown on the rate board: `+0.02`, `-0.03`, `0.00`.
pub fn format_change(change: Decimal) -> String {
    let fixed = to_fixed(change, 2);
    if change > Decimal::ZERO && !fixed.starts_with('-') {
        format!("+{fixed}")
    } else {
        fixed
    }
}

fn to_fixed(value: Decimal, dp: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        // avoid "-0.00"
        rounded = Decimal::ZERO;
    }
    rounded.rescale(dp);
    rounded.to_string()
}

fn group_thousands(whole: &str) -> String {
    let mut out = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
