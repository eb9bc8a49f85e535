//! Plain (single-document) functions.
//!
//! | Function   | Result                                              |
//! |------------|-----------------------------------------------------|
//! | `MULTIPLY` | product of the numeric args, 1 when there are none  |
//! | `ADD`      | sum of the numeric args, 0 when there are none      |
//! | `SUBTRACT` | first arg minus second, missing operands count as 0 |
//! | `ABS`      | absolute value of the *last* arg only               |
//! | `FORMAT`   | `FORMAT(date, pattern, offset)` with chrono patterns |
//!
//! Non-numeric arguments are skipped. Unknown functions yield `None`.

use crate::aggregate::{self, AggregateState};
use crate::document::{number_of, number_value, text_of, Document};
use crate::spec::{Argument, CallSpec};
use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use std::fmt::Write;
use tracing::debug;

const DEFAULT_DATE_PATTERN: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

/// Evaluates a call against one projected document.
///
/// Aggregate functions evaluated here see a fresh accumulator, so they
/// yield their single-row value.
pub fn evaluate(call: &CallSpec, doc: &Document) -> Option<Value> {
    match call.function.as_str() {
        "MULTIPLY" => Some(number_value(
            numbers(call, doc).fold(1.0, |acc, n| acc * n),
        )),
        "ADD" => Some(number_value(numbers(call, doc).sum())),
        "SUBTRACT" => {
            let operand = |i: usize| {
                call.args
                    .get(i)
                    .and_then(|a| argument_value(a, doc))
                    .and_then(|v| number_of(&v))
                    .unwrap_or(0.0)
            };
            Some(number_value(operand(0) - operand(1)))
        }
        "ABS" => {
            // Only the last argument survives the loop.
            let mut last = None;
            for arg in &call.args {
                last = argument_value(arg, doc)
                    .and_then(|v| number_of(&v))
                    .map(f64::abs);
            }
            last.map(number_value)
        }
        "FORMAT" => format_date(call, doc),
        name if aggregate::is_aggregate(name) => {
            let mut acc = Document::new();
            let mut state = AggregateState::default();
            aggregate::fold(&mut acc, &mut state, call.output_name(), doc, call);
            acc.remove(call.output_name())
        }
        other => {
            debug!(function = other, "unknown projection function");
            None
        }
    }
}

/// Value of one argument within `doc`.
pub fn argument_value(arg: &Argument, doc: &Document) -> Option<Value> {
    match arg {
        Argument::Call(call) => evaluate(call, doc),
        Argument::Field(field) => doc.get(field.output_name()).cloned(),
        Argument::Literal(value) => Some(value.clone()),
    }
}

/// Text of an argument, falling back to the argument's own source text when
/// it names no projected value. Lets patterns and zone names go unquoted.
fn argument_text(arg: &Argument, doc: &Document) -> String {
    match arg {
        Argument::Field(field) => doc
            .get(field.output_name())
            .map_or_else(|| field.source.clone(), text_of),
        other => argument_value(other, doc).map(|v| text_of(&v)).unwrap_or_default(),
    }
}

fn numbers<'a>(call: &'a CallSpec, doc: &'a Document) -> impl Iterator<Item = f64> + 'a {
    call.args
        .iter()
        .filter_map(move |arg| argument_value(arg, doc))
        .filter_map(|v| number_of(&v))
}

fn format_date(call: &CallSpec, doc: &Document) -> Option<Value> {
    let raw = call.args.first().and_then(|a| argument_value(a, doc))?;
    let date = DateTime::parse_from_rfc3339(raw.as_str()?).ok()?;

    let pattern = call
        .args
        .get(1)
        .map(|a| argument_text(a, doc))
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_DATE_PATTERN.to_string());

    let offset_secs = match call.args.get(2) {
        None => 0,
        Some(arg) => {
            let text = argument_text(arg, doc);
            match text.trim().parse::<f64>() {
                Ok(hours) => (hours * 3600.0).round() as i32,
                Err(_) => zone_offset_secs(&text).unwrap_or_else(|| {
                    debug!(zone = %text, "unknown time zone; using UTC");
                    0
                }),
            }
        }
    };
    let offset = FixedOffset::east_opt(offset_secs)?;

    // Invalid patterns make Display fail; surface that as no value.
    let mut out = String::new();
    write!(out, "{}", date.with_timezone(&offset).format(&pattern)).ok()?;
    Some(Value::String(out))
}

/// Standard offsets of common zone names and abbreviations.
fn zone_offset_secs(name: &str) -> Option<i32> {
    const HOUR: i32 = 3600;
    let offset = match name.trim().to_ascii_uppercase().as_str() {
        "UTC" | "GMT" | "Z" | "UTC+0" | "EUROPE/LONDON" => 0,
        "CET" | "EUROPE/BERLIN" | "EUROPE/PARIS" | "W. EUROPE STANDARD TIME" => HOUR,
        "EET" | "EUROPE/ATHENS" | "E. EUROPE STANDARD TIME" => 2 * HOUR,
        "MSK" | "EUROPE/MOSCOW" | "RUSSIAN STANDARD TIME" => 3 * HOUR,
        "IST" | "ASIA/KOLKATA" | "INDIA STANDARD TIME" => 5 * HOUR + HOUR / 2,
        "ASIA/SHANGHAI" | "CHINA STANDARD TIME" => 8 * HOUR,
        "JST" | "ASIA/TOKYO" | "TOKYO STANDARD TIME" => 9 * HOUR,
        "AEST" | "AUSTRALIA/SYDNEY" | "AUS EASTERN STANDARD TIME" => 10 * HOUR,
        "EST" | "AMERICA/NEW_YORK" | "EASTERN STANDARD TIME" => -5 * HOUR,
        "CST" | "AMERICA/CHICAGO" | "CENTRAL STANDARD TIME" => -6 * HOUR,
        "MST" | "AMERICA/DENVER" | "MOUNTAIN STANDARD TIME" => -7 * HOUR,
        "PST" | "AMERICA/LOS_ANGELES" | "PACIFIC STANDARD TIME" => -8 * HOUR,
        _ => return None,
    };
    Some(offset)
}
