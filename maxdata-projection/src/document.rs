use maxdata_types::{format_timestamp, DataValue};
use serde_json::{Map, Number, Value};

/// A projected, insertion-ordered document.
pub type Document = Map<String, Value>;

/// JSON number for `n`; integral values become integers.
pub fn number_value(n: f64) -> Value {
    const EXACT: f64 = 9_007_199_254_740_992.0;
    if n.fract() == 0.0 && n.abs() < EXACT {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

/// Numeric reading of a projected value. Numeric text counts; empty text,
/// booleans and everything else do not.
pub fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                s.parse::<f64>().ok().filter(|n| n.is_finite())
            }
        }
        _ => None,
    }
}

/// Text form of a projected value, as used in group keys.
pub fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Converts a field value to its projected form. Unset sentinels yield
/// `None`.
pub fn to_json(value: &DataValue) -> Option<Value> {
    if value.is_unset() {
        return None;
    }
    Some(match value {
        DataValue::Text(s) | DataValue::Stream(s) => Value::String(s.clone()),
        DataValue::Integer(v) => Value::from(*v),
        DataValue::Long(v) => Value::from(*v),
        DataValue::Double(v) => number_value(*v),
        DataValue::Boolean(v) => Value::Bool(*v),
        DataValue::Timestamp(t) => Value::String(format_timestamp(t)),
        DataValue::Identifier(id) => Value::String(id.to_string()),
        DataValue::Bytes(_) => Value::String(value.to_string()),
        DataValue::TextList(items) => Value::Array(items.iter().cloned().map(Value::String).collect()),
        DataValue::Document(doc) => Value::Object(
            doc.iter()
                .filter_map(|(k, v)| to_json(v).map(|v| (k.clone(), v)))
                .collect(),
        ),
    })
}
