//! Canonical path addressing for inspected state.
//!
//! A structural path is a sequence of [`PathSegment`]s (object keys and
//! array indices). Its canonical string form is what the state tree, the
//! change log and the subscriber registry all use to name a location:
//! `root`, `count`, `todos[0]`, `todos[0].done`.
//!
//! # Example
//!
//! ```
//! use state_inspect_path::{decode_path, encode_path, value_at_path};
//!
//! let path = decode_path("root.todos[1].text");
//! assert_eq!(encode_path(&path), "todos[1].text");
//!
//! let doc = serde_json::json!({"todos": [{"text": "a"}, {"text": "b"}]});
//! assert_eq!(value_at_path(&doc, &path), Some(&serde_json::json!("b")));
//! ```

use thiserror::Error;

pub mod types;
pub use types::{Path, PathSegment};

pub mod codec;
pub use codec::{child_path, decode_path, encode_path, ROOT};

mod get;
pub use get::{array_index, property_key, value_at_path, write_array_slot};

pub mod tree;
pub use tree::{collect_all_paths, ExpandedPaths, Inspectable, Shape};

/// Check if a string represents a valid non-negative integer array index.
///
/// # Example
///
/// ```
/// use state_inspect_path::is_valid_index;
///
/// assert!(is_valid_index("0"));
/// assert!(is_valid_index("123"));
/// assert!(!is_valid_index("01"));
/// assert!(!is_valid_index("-1"));
/// assert!(!is_valid_index("abc"));
/// ```
pub fn is_valid_index(index: &str) -> bool {
    if index.is_empty() {
        return false;
    }
    let bytes = index.as_bytes();
    // First char can't be leading zero unless it's just "0"
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|&b| b.is_ascii_digit())
}

/// Errors from writing into state by structural path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("path not found")]
    NotFound,
    #[error("parent is not a container")]
    NotContainer,
    #[error("invalid array index")]
    InvalidIndex,
    #[error("root can only be replaced by a container of the same kind")]
    RootNotContainer,
}
