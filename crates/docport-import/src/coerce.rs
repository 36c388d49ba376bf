//! Coercion helpers from raw CSV text to typed document values
//!
//! Every helper is total: bad input yields `None` instead of an error, and
//! the caller decides whether to drop the field or fall through to a looser
//! rule.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// `user_id` -> `userId`. Input without underscores is returned unchanged.
pub fn to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;

    for c in name.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }

    out
}

/// Epoch milliseconds from a date-like string.
///
/// Numeric input is taken to already be epoch milliseconds. Datetimes
/// without an offset, and bare dates, are read as UTC.
pub fn to_ms(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Some(n) = to_num(value) {
        return Some(n as i64);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.timestamp_millis());
        }
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.timestamp_millis());
    }

    None
}

/// Finite number from a numeric string
pub fn to_num(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// Strict JSON parse
pub fn to_json(value: &str) -> Option<Value> {
    serde_json::from_str(value.trim()).ok()
}

/// Normalize an array-ish cell into trimmed, non-empty strings.
///
/// Accepts JSON arrays (`["a","b"]`), bracketed pseudo-arrays with bare or
/// quoted elements (`[a, 'b', "c"]`) and plain comma-separated text.
pub fn to_array(value: &str) -> Option<Vec<String>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(value) {
        let items = items
            .into_iter()
            .filter_map(|item| match item {
                Value::Null => None,
                Value::String(s) => Some(s.trim().to_string()),
                other => Some(other.to_string()),
            })
            .filter(|s| !s.is_empty())
            .collect();
        return Some(items);
    }

    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .unwrap_or(value);

    Some(
        inner
            .split(',')
            .map(|item| strip_quotes(item.trim()).trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
    )
}

fn strip_quotes(item: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = item.strip_prefix(quote).and_then(|i| i.strip_suffix(quote)) {
            return inner;
        }
    }
    item
}

/// `true`, `t`, `1` and `yes` (any case) are true; anything else non-empty
/// is false.
pub fn to_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some(matches!(
        value.to_lowercase().as_str(),
        "true" | "t" | "1" | "yes"
    ))
}

/// Whether a cell reads as a boolean flag in a relational export
pub fn is_boolean_like(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "false" | "t" | "f" | "1" | "0"
    )
}

/// Collapse an array for a scalar destination.
///
/// With `keep_array` the strings are returned as a JSON array. Otherwise a
/// single element becomes that element and several are joined with `", "`.
pub fn array_to_value(items: Vec<String>, keep_array: bool) -> Value {
    if keep_array {
        return Value::Array(items.into_iter().map(Value::String).collect());
    }
    match items.len() {
        1 => Value::String(items.into_iter().next().unwrap_or_default()),
        _ => Value::String(items.join(", ")),
    }
}

/// Collapse an existing JSON array the same way as [`array_to_value`]
pub fn collapse_json_array(items: &[Value]) -> Value {
    let strings = items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();
    array_to_value(strings, false)
}

/// JSON number for `n`, using an integer when there is no fractional part
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}
