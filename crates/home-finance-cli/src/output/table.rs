use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{find_rows, format_cell};

/// Format output as tables using the tabled crate.
///
/// Scalar result fields go in a Field/Value table; a schedule or rate board
/// follows as its own table with one row per record.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result(result, map);
            } else {
                print_fields(map);
            }
        }
        Value::Array(arr) => print_rows(arr),
        _ => println!("{}", value),
    }
}

fn print_result(result: &Value, envelope: &serde_json::Map<String, Value>) {
    match result {
        Value::Object(res_map) => {
            print_fields(res_map);
            if let Some((name, rows)) = find_rows(result) {
                println!("\n{}:", name);
                print_rows(rows);
            }
        }
        _ => println!("{}", format_cell(result)),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_fields(map: &serde_json::Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        match val {
            // rows are printed separately
            Value::Array(items) if items.first().is_some_and(Value::is_object) => continue,
            Value::Object(nested) => {
                for (sub_key, sub_val) in nested {
                    if sub_val.is_array() {
                        continue;
                    }
                    builder.push_record([format!("{key}.{sub_key}"), format_cell(sub_val)]);
                }
            }
            _ => builder.push_record([key.clone(), format_cell(val)]),
        }
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        println!("(empty)");
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.clone());

    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_cell).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }

    println!("{}", Table::from(builder));
}
