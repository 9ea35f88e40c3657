//! Canonical string form of structural paths.
//!
//! The canonical form is the one the state tree walker produces:
//!
//! - the empty path is the literal token `root`,
//! - the first key segment is written bare (`todos`),
//! - later key segments are joined with `.` (`todos.done`),
//! - index segments are wrapped in brackets (`todos[0]`); an index in first
//!   position is anchored to the root token (`root[0]`).
//!
//! Decoding also accepts the long form with an explicit `root.` prefix
//! (`root.todos[0]`) and never fails: malformed fragments are skipped.

use crate::types::{Path, PathSegment};

/// Token naming the root of the inspected state.
pub const ROOT: &str = "root";

/// Encode a structural path into its canonical string form.
///
/// # Example
///
/// ```
/// use state_inspect_path::{encode_path, PathSegment};
///
/// assert_eq!(encode_path(&[]), "root");
/// assert_eq!(encode_path(&["count".into()]), "count");
/// assert_eq!(encode_path(&["todos".into(), 0usize.into(), "text".into()]), "todos[0].text");
/// assert_eq!(encode_path(&[PathSegment::Index(2)]), "root[2]");
/// ```
pub fn encode_path(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in path {
        match segment {
            PathSegment::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            PathSegment::Index(idx) => {
                if out.is_empty() {
                    out.push_str(ROOT);
                }
                out.push('[');
                out.push_str(&idx.to_string());
                out.push(']');
            }
        }
    }
    if out.is_empty() {
        return ROOT.to_string();
    }
    out
}

/// Decode a path string into its structural segments.
///
/// Accepts `""` and `"root"` as the empty path and strips a leading `root`
/// token (with its trailing `.`). Each `.`-separated part is read as a key
/// followed by any number of `[index]` suffixes. Unmatched brackets and
/// non-numeric indices are dropped rather than reported.
///
/// # Example
///
/// ```
/// use state_inspect_path::{decode_path, PathSegment};
///
/// assert!(decode_path("").is_empty());
/// assert!(decode_path("root").is_empty());
/// assert_eq!(
///     decode_path("root.todos[0].text"),
///     vec![PathSegment::key("todos"), PathSegment::Index(0), PathSegment::key("text")]
/// );
/// assert_eq!(decode_path("todos[0]"), decode_path("root.todos[0]"));
/// ```
pub fn decode_path(path: &str) -> Path {
    let rest = strip_root(path);
    let mut out = Vec::new();
    for part in rest.split('.') {
        decode_part(part, &mut out);
    }
    out
}

/// Build the canonical path of a child from its parent's canonical path.
///
/// # Example
///
/// ```
/// use state_inspect_path::{child_path, PathSegment};
///
/// assert_eq!(child_path("root", &PathSegment::key("todos")), "todos");
/// assert_eq!(child_path("todos", &PathSegment::Index(1)), "todos[1]");
/// assert_eq!(child_path("todos[1]", &PathSegment::key("done")), "todos[1].done");
/// ```
pub fn child_path(base: &str, segment: &PathSegment) -> String {
    match segment {
        PathSegment::Index(idx) => format!("{base}[{idx}]"),
        PathSegment::Key(key) if base == ROOT => key.clone(),
        PathSegment::Key(key) => format!("{base}.{key}"),
    }
}

fn strip_root(path: &str) -> &str {
    match path.strip_prefix(ROOT) {
        Some(rest) if rest.is_empty() || rest.starts_with('[') => rest,
        Some(rest) if rest.starts_with('.') => &rest[1..],
        // `rooted` is a key, not the root token.
        _ => path,
    }
}

fn decode_part(part: &str, out: &mut Path) {
    let bytes = part.as_bytes();
    let mut x = 0;
    while x < bytes.len() {
        match bytes[x] {
            b'[' => match read_index(bytes, x) {
                Some((idx, next)) => {
                    out.push(PathSegment::Index(idx));
                    x = next;
                }
                None => x += 1,
            },
            b']' => x += 1,
            _ => {
                let start = x;
                while x < bytes.len() && bytes[x] != b'[' && bytes[x] != b']' {
                    x += 1;
                }
                // Bracket bytes are ASCII so `start..x` sits on char boundaries.
                out.push(PathSegment::Key(part[start..x].to_string()));
            }
        }
    }
}

/// Read `[digits]` starting at the opening bracket. Returns the index and the
/// offset just past the closing bracket.
fn read_index(bytes: &[u8], open: usize) -> Option<(usize, usize)> {
    let start = open + 1;
    let mut x = start;
    while x < bytes.len() && bytes[x].is_ascii_digit() {
        x += 1;
    }
    if x == start || x >= bytes.len() || bytes[x] != b']' {
        return None;
    }
    let digits = std::str::from_utf8(&bytes[start..x]).ok()?;
    let idx = digits.parse().ok()?;
    Some((idx, x + 1))
}
