//! Loose value parsing for inline edits.
//!
//! Free-form text typed into the state editor becomes a typed value. Rules
//! are tried in order and the first match wins:
//!
//! 1. `true`, `false`, `null`, `undefined` (after trimming),
//! 2. a numeric literal,
//! 3. text starting with `{` or `[`: strict JSON, then relaxed JSON,
//! 4. text wrapped in matching `"` or `'` quotes: the unquoted string,
//! 5. anything else: the input, untouched.
//!
//! Parsing never fails; `undefined` is reported as `None`.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::number::{js_number, normalize_numbers};
use crate::relaxed::RelaxedDecoder;

const NUMERIC_LITERAL: &str = r"^[-+]?(\d+(\.\d+)?|\.\d+)([eE][-+]?\d+)?$";

fn numeric_literal() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(NUMERIC_LITERAL).ok()).as_ref()
}

/// Check whether `s` is a complete numeric literal (`42`, `-1.5`, `.5`,
/// `3.14e2`). The empty string is not.
///
/// # Example
///
/// ```
/// use state_inspect_value::is_numeric_literal;
///
/// assert!(is_numeric_literal("3.14e2"));
/// assert!(is_numeric_literal("+.5"));
/// assert!(!is_numeric_literal(""));
/// assert!(!is_numeric_literal("1."));
/// assert!(!is_numeric_literal("0x10"));
/// ```
pub fn is_numeric_literal(s: &str) -> bool {
    numeric_literal().is_some_and(|re| re.is_match(s))
}

/// Parse free-form text into a value. `None` stands for `undefined`.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use state_inspect_value::parse_loose_value;
///
/// assert_eq!(parse_loose_value("true"), Some(json!(true)));
/// assert_eq!(parse_loose_value("3.14e2"), Some(json!(314)));
/// assert_eq!(parse_loose_value("{a:1,}"), Some(json!({"a": 1})));
/// assert_eq!(parse_loose_value("'hi'"), Some(json!("hi")));
/// assert_eq!(parse_loose_value("undefined"), None);
/// assert_eq!(parse_loose_value("not json {"), Some(json!("not json {")));
/// ```
pub fn parse_loose_value(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();

    match trimmed {
        "true" => return Some(Value::Bool(true)),
        "false" => return Some(Value::Bool(false)),
        "null" => return Some(Value::Null),
        "undefined" => return None,
        _ => {}
    }

    if is_numeric_literal(trimmed) {
        if let Some(n) = trimmed.parse::<f64>().ok().and_then(js_number) {
            return Some(Value::Number(n));
        }
    }

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
            return Some(normalize_numbers(value));
        }
        if let Ok(value) = RelaxedDecoder::decode(trimmed) {
            return Some(value);
        }
    }

    if let Some(inner) = unquote(trimmed) {
        return Some(Value::String(inner));
    }

    Some(Value::String(raw.to_string()))
}

/// Unquote text wrapped in a matching pair of `"` or `'`.
///
/// Double quotes go through the strict JSON string grammar, single quotes
/// through the relaxed one. When that fails the outer quote characters are
/// stripped and the rest is kept verbatim.
fn unquote(trimmed: &str) -> Option<String> {
    let quote = trimmed.chars().next().filter(|q| *q == '"' || *q == '\'')?;
    if !trimmed.ends_with(quote) {
        return None;
    }
    let decoded = if quote == '"' {
        serde_json::from_str::<String>(trimmed).ok()
    } else {
        match RelaxedDecoder::decode(trimmed) {
            Ok(Value::String(s)) => Some(s),
            _ => None,
        }
    };
    Some(decoded.unwrap_or_else(|| strip_outer(trimmed)))
}

fn strip_outer(trimmed: &str) -> String {
    // Both ends are one-byte quote characters.
    if trimmed.len() < 2 {
        return String::new();
    }
    trimmed[1..trimmed.len() - 1].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(raw: &str) -> Option<Value> {
        parse_loose_value(raw)
    }

    #[test]
    fn test_literals_after_trim() {
        assert_eq!(parse("  true "), Some(json!(true)));
        assert_eq!(parse("false"), Some(json!(false)));
        assert_eq!(parse("\tnull\n"), Some(json!(null)));
        assert_eq!(parse(" undefined "), None);
        assert_eq!(parse("True"), Some(json!("True")));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse("42"), Some(json!(42)));
        assert_eq!(parse("-7"), Some(json!(-7)));
        assert_eq!(parse("3.14e2"), Some(json!(314)));
        assert_eq!(parse(".5"), Some(json!(0.5)));
        assert_eq!(parse("+1.25"), Some(json!(1.25)));
        assert_eq!(parse(" 10 "), Some(json!(10)));
    }

    #[test]
    fn test_empty_is_not_zero() {
        assert_eq!(parse(""), Some(json!("")));
        assert_eq!(parse("   "), Some(json!("   ")));
    }

    #[test]
    fn test_unrepresentable_number_falls_back_to_text() {
        assert_eq!(parse("1e999"), Some(json!("1e999")));
    }

    #[test]
    fn test_structured_strict_and_relaxed() {
        assert_eq!(parse(r#"{"a":1}"#), Some(json!({"a": 1})));
        assert_eq!(parse("[1.0, 2]"), Some(json!([1, 2])));
        assert_eq!(parse("{a:1,}"), Some(json!({"a": 1})));
        assert_eq!(parse("[ 'x', /* c */ 2, ]"), Some(json!(["x", 2])));
    }

    #[test]
    fn test_quoted_strings() {
        assert_eq!(parse("'hi'"), Some(json!("hi")));
        assert_eq!(parse(r#""hi\nthere""#), Some(json!("hi\nthere")));
        assert_eq!(parse(r#""5""#), Some(json!("5")));
        assert_eq!(parse(r#""a"b""#), Some(json!("a\"b")));
        assert_eq!(parse("'it's'"), Some(json!("it's")));
        assert_eq!(parse("\""), Some(json!("")));
    }

    #[test]
    fn test_untouched_fallback_keeps_whitespace() {
        assert_eq!(parse("not json {"), Some(json!("not json {")));
        assert_eq!(parse("  hello world "), Some(json!("  hello world ")));
        assert_eq!(parse("{broken"), Some(json!("{broken")));
        assert_eq!(parse("[1, 2"), Some(json!("[1, 2")));
        assert_eq!(parse("'mismatched\""), Some(json!("'mismatched\"")));
    }
}
