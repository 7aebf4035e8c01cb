pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::str::FromStr;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// First array of row objects inside a result: the schedule or the board.
///
/// Looks at the result's own fields, then one level down (purchase output
/// nests the schedule).
pub(crate) fn find_rows(result: &Value) -> Option<(&str, &[Value])> {
    let map = result.as_object()?;
    for (key, val) in map {
        if let Value::Array(items) = val {
            if items.first().is_some_and(Value::is_object) {
                return Some((key.as_str(), items.as_slice()));
            }
        }
    }
    map.values().find_map(|val| match val {
        Value::Object(_) => find_rows(val),
        _ => None,
    })
}

/// Cell text for table/CSV output; long decimals are shown to the cent.
pub(crate) fn format_cell(value: &Value) -> String {
    match value {
        Value::String(s) => round_decimal_str(s).unwrap_or_else(|| s.clone()),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_cell).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

fn round_decimal_str(s: &str) -> Option<String> {
    let d = Decimal::from_str(s).ok()?;
    if d.scale() <= 2 {
        return None;
    }
    let mut rounded = d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    Some(rounded.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_find_rows_nested_schedule() {
        let purchase = json!({
            "loan_amount": "400000",
            "schedule": { "monthly_payment": "2398.20", "rows": [{ "year": 1 }] }
        });
        let (key, rows) = find_rows(&purchase).unwrap();
        assert_eq!(key, "rows");
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_find_rows_none_for_flat_result() {
        assert!(find_rows(&json!({ "monthly_payment": "1.00" })).is_none());
    }

    #[test]
    fn test_format_cell_rounds_long_decimals() {
        assert_eq!(format_cell(&json!("2398.2021006110")), "2398.20");
        assert_eq!(format_cell(&json!("6.75")), "6.75");
        assert_eq!(format_cell(&json!("30-Year Fixed")), "30-Year Fixed");
        assert_eq!(format_cell(&Value::Null), "");
    }
}
