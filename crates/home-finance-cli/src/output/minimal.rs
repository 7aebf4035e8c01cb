use serde_json::Value;

use super::format_cell;

/// Fields that answer each command, in priority order.
const PRIORITY_KEYS: [&str; 5] = [
    "monthly_payment_display",
    "monthly_payment",
    "cheapest_product",
    "loan_amount",
    "title",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_answer(value));
}

fn minimal_answer(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in &PRIORITY_KEYS {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    return format_cell(val);
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_cell(val));
        }
    }

    format_cell(result_obj)
}
