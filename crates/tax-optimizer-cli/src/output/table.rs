use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{result_of, scalar_text, STRATEGY_COLUMNS};

/// Format output as tables using the tabled crate.
///
/// Scalar fields go into a Field/Value table; nested tax results are
/// flattened one level (`current_tax.total_tax`); strategy lists get their
/// own table.
pub fn print_table(value: &Value) {
    match result_of(value) {
        Value::Array(strategies) => print_strategies(strategies),
        Value::Object(map) => {
            print_fields(map);
            if let Some(Value::Array(strategies)) = map.get("strategies") {
                println!();
                print_strategies(strategies);
            }
            if let Some(Value::Array(deadlines)) = map.get("deadlines") {
                println!();
                print_deadlines(deadlines);
            }
        }
        other => println!("{}", scalar_text(other)),
    }

    if let Value::Object(envelope) = value {
        print_notes(envelope);
    }
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        match val {
            Value::Object(inner) => {
                for (inner_key, inner_val) in inner {
                    if !inner_val.is_array() && !inner_val.is_object() {
                        builder.push_record([format!("{key}.{inner_key}"), scalar_text(inner_val)]);
                    }
                }
            }
            Value::Array(_) => {}
            _ => builder.push_record([key.clone(), scalar_text(val)]),
        }
    }
    println!("{}", Table::from(builder));
}

fn print_strategies(strategies: &[Value]) {
    if strategies.is_empty() {
        println!("(no strategies)");
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(STRATEGY_COLUMNS);
    for s in strategies {
        builder.push_record(STRATEGY_COLUMNS.iter().map(|c| scalar_text(&s[*c])));
    }
    println!("{}", Table::from(builder));
}

fn print_deadlines(deadlines: &[Value]) {
    let mut builder = Builder::default();
    builder.push_record(["Deadline", "Date"]);
    for d in deadlines {
        builder.push_record([scalar_text(&d["label"]), scalar_text(&d["date"])]);
    }
    println!("{}", Table::from(builder));
}

fn print_notes(envelope: &Map<String, Value>) {
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
