//! Aggregate folds across rows of one group.
//!
//! Each fold reads the accumulator's current value under the output alias,
//! combines it with the current row and writes it back, so rows can be
//! folded one at a time in any number of passes.

use crate::document::{number_of, number_value, text_of, Document};
use crate::functions::{argument_value, evaluate};
use crate::spec::CallSpec;
use serde_json::Value;
use std::collections::HashMap;

const AGGREGATES: &[&str] = &["GROUPBY", "SUM", "AVG", "MIN", "MAX", "COUNT", "FIRST", "LAST"];

pub fn is_aggregate(function: &str) -> bool {
    AGGREGATES.contains(&function)
}

/// Per-group side state that does not fit in the accumulator document.
#[derive(Debug, Default, Clone)]
pub struct AggregateState {
    /// Values folded so far per AVG alias.
    avg_counts: HashMap<String, u64>,
}

/// The group key contribution of a `GROUPBY` call: its argument texts
/// concatenated.
pub fn group_key(call: &CallSpec, row: &Document) -> String {
    call.args
        .iter()
        .filter_map(|arg| argument_value(arg, row))
        .map(|v| text_of(&v))
        .collect()
}

/// Folds one row into `acc` under `alias`.
///
/// Empty and non-numeric values are skipped by the numeric folds.
/// Functions that are not aggregates overwrite the alias with their value
/// for the row.
pub fn fold(acc: &mut Document, state: &mut AggregateState, alias: &str, row: &Document, call: &CallSpec) {
    let values = move || call.args.iter().filter_map(move |arg| argument_value(arg, row));
    let numbers = move || values().filter_map(|v| number_of(&v));
    let current = move |acc: &Document| acc.get(alias).and_then(number_of);

    match call.function.as_str() {
        "GROUPBY" => {
            let value = if call.args.len() == 1 {
                values().next()
            } else {
                Some(Value::String(group_key(call, row)))
            };
            if let Some(value) = value {
                acc.insert(alias.into(), value);
            }
        }
        "SUM" => {
            let total = numbers().fold(current(acc).unwrap_or(0.0), |a, n| a + n);
            acc.insert(alias.into(), number_value(total));
        }
        "MIN" | "MAX" => {
            let pick = if call.function == "MIN" { f64::min } else { f64::max };
            let folded = numbers().fold(current(acc), |a, n| Some(a.map_or(n, |a| pick(a, n))));
            if let Some(v) = folded {
                acc.insert(alias.into(), number_value(v));
            }
        }
        "AVG" => {
            let count = state.avg_counts.entry(alias.to_string()).or_insert(0);
            let mut avg = current(acc).unwrap_or(0.0);
            let mut touched = false;
            for n in numbers() {
                *count += 1;
                avg += (n - avg) / *count as f64;
                touched = true;
            }
            if touched {
                acc.insert(alias.into(), number_value(avg));
            }
        }
        "COUNT" => {
            let count = current(acc).unwrap_or(0.0) + 1.0;
            acc.insert(alias.into(), number_value(count));
        }
        "FIRST" => {
            if !acc.contains_key(alias) {
                if let Some(v) = values().find(|v| !is_blank(v)) {
                    acc.insert(alias.into(), v);
                }
            }
        }
        "LAST" => {
            if let Some(v) = values().last() {
                acc.insert(alias.into(), v);
            }
        }
        _ => {
            if let Some(v) = evaluate(call, row) {
                acc.insert(alias.into(), v);
            }
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
