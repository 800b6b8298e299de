use serde_json::Value;

use super::{result_of, scalar_text};

/// Print just the headline figure of the result.
///
/// Reports print total potential savings, tax results print total tax, rate
/// lookups print the marginal rate, and strategy lists print one
/// `name: savings` line per strategy.
pub fn print_minimal(value: &Value) {
    let result = result_of(value);

    if let Value::Array(strategies) = result {
        for s in strategies {
            println!(
                "{}: {}",
                scalar_text(&s["name"]),
                scalar_text(&s["potential_tax_savings"])
            );
        }
        return;
    }

    let priority_keys = [
        "total_potential_savings",
        "total_tax",
        "marginal_rate",
        "taxpayer",
    ];

    if let Value::Object(map) = result {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", scalar_text(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, scalar_text(val));
            return;
        }
    }

    println!("{}", scalar_text(result));
}
