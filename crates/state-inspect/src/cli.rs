//! Logic behind the command-line tools.
//!
//! - `state-paths` lists every canonical path of a JSON document
//! - `loose-parse` shows how the inline editor would read a piece of text

use serde_json::Value;
use state_inspect_path::{collect_all_paths, ROOT};
use state_inspect_value::parse_loose_value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),
}

/// One canonical path per line, in walk order.
pub fn list_paths(json: &str) -> Result<String, CliError> {
    let doc: Value = serde_json::from_str(json)?;
    let paths: Vec<String> = collect_all_paths(&&doc, ROOT).into_iter().collect();
    Ok(paths.join("\n"))
}

/// Pretty JSON of the parsed value, or `undefined`.
pub fn parse_text(text: &str) -> Result<String, CliError> {
    match parse_loose_value(text) {
        Some(value) => Ok(serde_json::to_string_pretty(&value)?),
        None => Ok("undefined".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_paths() {
        let out = list_paths(r#"{"todos": [{"done": true}], "count": 1}"#).unwrap();
        assert_eq!(out, "root\ntodos\ntodos[0]\ntodos[0].done\ncount");
    }

    #[test]
    fn test_list_paths_rejects_invalid_json() {
        assert!(matches!(list_paths("{nope"), Err(CliError::Json(_))));
    }

    #[test]
    fn test_parse_text() {
        assert_eq!(parse_text("42").unwrap(), "42");
        assert_eq!(parse_text("undefined").unwrap(), "undefined");
        assert_eq!(parse_text("{a:1}").unwrap(), "{\n  \"a\": 1\n}");
        assert_eq!(parse_text("hello").unwrap(), "\"hello\"");
    }
}
