//! Numbers with JS semantics on top of `serde_json::Number`.

use serde_json::{Number, Value};

/// Largest integer a JS number holds exactly (`Number.MAX_SAFE_INTEGER`).
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Convert an `f64` into a JSON number the way a JS engine would print it.
///
/// Integral values in the safe range become integers (`314.0` is `314`,
/// `-0.0` is `0`). Non-finite values have no JSON form and yield `None`.
pub fn js_number(value: f64) -> Option<Number> {
    if !value.is_finite() {
        return None;
    }
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        return Some(Number::from(value as i64));
    }
    Number::from_f64(value)
}

/// Rewrite every integral float in `value` as an integer.
pub fn normalize_numbers(value: Value) -> Value {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => Value::Number(js_number(f).unwrap_or(n)),
            _ => Value::Number(n),
        },
        Value::Array(arr) => Value::Array(arr.into_iter().map(normalize_numbers).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, normalize_numbers(v)))
                .collect(),
        ),
        other => other,
    }
}
