//! Type definitions for structural paths.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A step in a structural path.
///
/// Either an object key or a non-negative array index.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Object property access.
    Key(String),
    /// Array element access.
    Index(usize),
}

/// A structural path: the sequence of steps from the root to a location.
pub type Path = Vec<PathSegment>;

impl PathSegment {
    /// Create a key segment.
    pub fn key(key: impl Into<String>) -> Self {
        PathSegment::Key(key.into())
    }

    /// Create an index segment.
    pub fn index(index: usize) -> Self {
        PathSegment::Index(index)
    }

    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathSegment::Key(key) => Some(key),
            PathSegment::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Key(_) => None,
            PathSegment::Index(idx) => Some(*idx),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{key}"),
            PathSegment::Index(idx) => write!(f, "[{idx}]"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_owned())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(idx: usize) -> Self {
        PathSegment::Index(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_accessors() {
        let key = PathSegment::key("todos");
        let idx = PathSegment::index(3);
        assert_eq!(key.as_key(), Some("todos"));
        assert_eq!(key.as_index(), None);
        assert_eq!(idx.as_index(), Some(3));
        assert_eq!(idx.as_key(), None);
    }

    #[test]
    fn test_segment_display() {
        assert_eq!(PathSegment::from("count").to_string(), "count");
        assert_eq!(PathSegment::from(0usize).to_string(), "[0]");
    }

    #[test]
    fn test_segment_serde_untagged() {
        let path: Path = vec!["todos".into(), 0usize.into()];
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#"["todos",0]"#);
        let back: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }
}
