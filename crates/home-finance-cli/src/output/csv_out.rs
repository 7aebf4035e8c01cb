use serde_json::Value;
use std::io;

use super::{find_rows, format_cell};

/// Write output as CSV to stdout.
///
/// Results carrying rows (schedule, rate board) are exported one row per
/// record in order; anything else becomes two-column field/value CSV.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some((_, rows)) = find_rows(result) {
        write_rows(&mut wtr, rows);
    } else if let Value::Object(map) = result {
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in map {
            let _ = wtr.write_record([key.as_str(), &format_cell(val)]);
        }
    } else {
        let _ = wtr.write_record([&format_cell(result)]);
    }

    let _ = wtr.flush();
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_cell).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}
