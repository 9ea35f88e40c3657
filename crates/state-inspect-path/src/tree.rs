//! Path enumeration and the expanded-path set of the state tree.
//!
//! [`collect_all_paths`] walks any [`Inspectable`] value and yields the
//! canonical path of every reachable node. Values that can alias containers
//! (the host state graph) expose a container identity so the walk stops at
//! nodes it has already entered.

use std::collections::HashSet;

use indexmap::IndexSet;
use serde_json::Value;

use crate::codec::{child_path, ROOT};
use crate::types::PathSegment;

/// The children of one node, as seen by the tree walker.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape<T> {
    Leaf,
    Array(Vec<T>),
    Object(Vec<(String, T)>),
}

/// A value the tree walker can descend into.
pub trait Inspectable: Sized {
    /// Children of this node, in enumeration order.
    fn shape(&self) -> Shape<Self>;

    /// Identity of the underlying container, `None` for primitives.
    ///
    /// Two handles to the same container must return the same id.
    fn container_id(&self) -> Option<usize>;
}

impl<'a> Inspectable for &'a Value {
    fn shape(&self) -> Shape<Self> {
        match *self {
            Value::Array(arr) => Shape::Array(arr.iter().collect()),
            Value::Object(map) => Shape::Object(map.iter().map(|(k, v)| (k.clone(), v)).collect()),
            _ => Shape::Leaf,
        }
    }

    fn container_id(&self) -> Option<usize> {
        match *self {
            Value::Array(arr) => Some(arr as *const Vec<Value> as usize),
            Value::Object(map) => Some(map as *const serde_json::Map<String, Value> as usize),
            _ => None,
        }
    }
}

/// Enumerate the canonical path of every node reachable from `value`.
///
/// `base` is always included. Array elements are addressed as `base[i]`,
/// object properties as `base.key` (or bare `key` under the root). A
/// container reached a second time keeps its path but is not descended into
/// again.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use state_inspect_path::collect_all_paths;
///
/// let doc = json!({"todos": [{"done": true}], "count": 1});
/// let paths: Vec<_> = collect_all_paths(&&doc, "root").into_iter().collect();
/// assert_eq!(paths, vec!["root", "todos", "todos[0]", "todos[0].done", "count"]);
/// ```
pub fn collect_all_paths<T: Inspectable>(value: &T, base: &str) -> IndexSet<String> {
    let mut out = IndexSet::new();
    let mut seen = HashSet::new();
    walk(value, base.to_string(), &mut out, &mut seen);
    out
}

fn walk<T: Inspectable>(
    value: &T,
    base: String,
    out: &mut IndexSet<String>,
    seen: &mut HashSet<usize>,
) {
    let Some(id) = value.container_id() else {
        out.insert(base);
        return;
    };
    if !seen.insert(id) {
        out.insert(base);
        return;
    }
    let shape = value.shape();
    match shape {
        Shape::Leaf => {
            out.insert(base);
        }
        Shape::Array(items) => {
            out.insert(base.clone());
            for (idx, item) in items.iter().enumerate() {
                walk(item, child_path(&base, &PathSegment::Index(idx)), out, seen);
            }
        }
        Shape::Object(entries) => {
            out.insert(base.clone());
            for (key, item) in &entries {
                walk(item, child_path(&base, &PathSegment::Key(key.clone())), out, seen);
            }
        }
    }
}

/// The set of canonical paths the state tree renders expanded.
///
/// Always contains `root` after construction or a collapse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedPaths {
    paths: IndexSet<String>,
}

impl Default for ExpandedPaths {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpandedPaths {
    pub fn new() -> Self {
        let mut paths = IndexSet::new();
        paths.insert(ROOT.to_string());
        Self { paths }
    }

    /// Expand every node of `value`.
    pub fn all<T: Inspectable>(value: &T) -> Self {
        Self {
            paths: collect_all_paths(value, ROOT),
        }
    }

    pub fn expand_all<T: Inspectable>(&mut self, value: &T) {
        self.paths = collect_all_paths(value, ROOT);
    }

    pub fn collapse_all(&mut self) {
        *self = Self::new();
    }

    /// Add `path` if absent, remove it if present.
    pub fn toggle(&mut self, path: &str) {
        if !self.paths.shift_remove(path) {
            self.paths.insert(path.to_string());
        }
    }

    /// Expand `path` and each of its `.`-joined prefixes.
    ///
    /// Only `.` separates ancestors here: `todos[0].done` expands `todos[0]`
    /// and `todos[0].done`, but not `todos` on its own.
    pub fn expand_with_ancestors(&mut self, path: &str) {
        let parts: Vec<&str> = path.split('.').collect();
        for end in 1..=parts.len() {
            self.paths.insert(parts[..end].join("."));
        }
    }

    /// Update the set after `path` was edited to `value`.
    ///
    /// The edited node's `.`-ancestors stay expanded. A container value
    /// expands the node and everything now reachable below it; a primitive
    /// (or removed) value collapses the node itself.
    pub fn apply_edit(&mut self, path: &str, value: Option<&Value>) {
        self.expand_with_ancestors(path);
        match value {
            Some(v @ (Value::Array(_) | Value::Object(_))) => {
                self.paths.insert(path.to_string());
                self.paths.extend(collect_all_paths(&v, path));
            }
            _ => {
                self.paths.shift_remove(path);
            }
        }
    }

    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        self.paths.insert(path.into())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paths(value: &Value, base: &str) -> Vec<String> {
        collect_all_paths(&value, base).into_iter().collect()
    }

    #[test]
    fn test_primitive_yields_base_only() {
        assert_eq!(paths(&json!(42), "root"), vec!["root"]);
        assert_eq!(paths(&json!(null), "count"), vec!["count"]);
    }

    #[test]
    fn test_root_array() {
        assert_eq!(paths(&json!([1, [2]]), "root"), vec!["root", "root[0]", "root[1]", "root[1][0]"]);
    }

    #[test]
    fn test_nested_base() {
        assert_eq!(
            paths(&json!({"a": {"b": 1}}), "user"),
            vec!["user", "user.a", "user.a.b"]
        );
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(paths(&json!({"list": [], "map": {}}), "root"), vec!["root", "list", "map"]);
    }

    #[test]
    fn test_expanded_defaults_to_root() {
        let expanded = ExpandedPaths::new();
        assert!(expanded.contains("root"));
        assert_eq!(expanded.len(), 1);
    }

    #[test]
    fn test_toggle_is_symmetric() {
        let mut expanded = ExpandedPaths::new();
        expanded.toggle("todos");
        assert!(expanded.contains("todos"));
        expanded.toggle("todos");
        assert!(!expanded.contains("todos"));
    }

    #[test]
    fn test_expand_with_ancestors_splits_on_dots_only() {
        let mut expanded = ExpandedPaths::new();
        expanded.expand_with_ancestors("todos[0].meta.tags");
        assert!(expanded.contains("todos[0]"));
        assert!(expanded.contains("todos[0].meta"));
        assert!(expanded.contains("todos[0].meta.tags"));
        assert!(!expanded.contains("todos"));
    }

    #[test]
    fn test_apply_edit_container_expands_descendants() {
        let mut expanded = ExpandedPaths::new();
        let value = json!({"tags": ["a", "b"]});
        expanded.apply_edit("todos[0].meta", Some(&value));
        assert!(expanded.contains("todos[0]"));
        assert!(expanded.contains("todos[0].meta"));
        assert!(expanded.contains("todos[0].meta.tags"));
        assert!(expanded.contains("todos[0].meta.tags[1]"));
    }

    #[test]
    fn test_apply_edit_primitive_collapses() {
        let mut expanded = ExpandedPaths::new();
        expanded.insert("user");
        expanded.apply_edit("user", Some(&json!("anonymous")));
        assert!(!expanded.contains("user"));
        expanded.insert("user");
        expanded.apply_edit("user", None);
        assert!(!expanded.contains("user"));
    }

    #[test]
    fn test_apply_edit_primitive_keeps_ancestors() {
        let mut expanded = ExpandedPaths::new();
        expanded.apply_edit("user.profile", Some(&json!(1)));
        assert_eq!(expanded.iter().collect::<Vec<_>>(), vec!["root", "user"]);
    }

    #[test]
    fn test_expand_and_collapse_all() {
        let doc = json!({"a": [1, 2]});
        let mut expanded = ExpandedPaths::new();
        expanded.expand_all(&&doc);
        assert_eq!(expanded.iter().collect::<Vec<_>>(), vec!["root", "a", "a[0]", "a[1]"]);
        expanded.collapse_all();
        assert_eq!(expanded.iter().collect::<Vec<_>>(), vec!["root"]);
    }
}
