use serde_json::Value;
use std::io;

use super::{result_of, scalar_text, STRATEGY_COLUMNS};

/// Write output as CSV to stdout.
///
/// Strategy lists (alone or inside a report) are written one row per
/// strategy; anything else as `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = result_of(value);
    let strategies = match result {
        Value::Array(arr) => Some(arr),
        Value::Object(map) => map.get("strategies").and_then(|s| s.as_array()),
        _ => None,
    };

    match (strategies, result) {
        (Some(rows), _) => {
            let _ = wtr.write_record(STRATEGY_COLUMNS);
            for s in rows {
                let _ = wtr.write_record(STRATEGY_COLUMNS.iter().map(|c| scalar_text(&s[*c])));
            }
        }
        (None, Value::Object(map)) => {
            let _ = wtr.write_record(["field", "value"]);
            for (key, val) in map {
                let _ = wtr.write_record([key.as_str(), scalar_text(val).as_str()]);
            }
        }
        (None, other) => {
            let _ = wtr.write_record([scalar_text(other)]);
        }
    }

    let _ = wtr.flush();
}
