use serde_json::Value;

use crate::types::PathSegment;

/// Get a value from a plain document by structural path.
///
/// Index segments address object properties by their decimal name, and key
/// segments that spell an index address array elements.
pub fn value_at_path<'a>(val: &'a Value, path: &[PathSegment]) -> Option<&'a Value> {
    let mut current = val;
    for step in path {
        current = match current {
            Value::Array(arr) => arr.get(array_index(step)?)?,
            Value::Object(map) => map.get(&*property_key(step))?,
            _ => return None,
        };
    }
    Some(current)
}

/// Set `arr[idx]`, appending past the end and filling any gap with `fill`.
pub fn write_array_slot<T: Clone>(arr: &mut Vec<T>, idx: usize, next: T, fill: T) {
    if idx < arr.len() {
        arr[idx] = next;
        return;
    }
    arr.resize(idx, fill);
    arr.push(next);
}

/// Resolve a segment to an array index.
pub fn array_index(step: &PathSegment) -> Option<usize> {
    match step {
        PathSegment::Index(idx) => Some(*idx),
        PathSegment::Key(key) if crate::is_valid_index(key) => key.parse().ok(),
        PathSegment::Key(_) => None,
    }
}

/// Resolve a segment to an object property name.
pub fn property_key(step: &PathSegment) -> std::borrow::Cow<'_, str> {
    match step {
        PathSegment::Key(key) => std::borrow::Cow::Borrowed(key.as_str()),
        PathSegment::Index(idx) => std::borrow::Cow::Owned(idx.to_string()),
    }
}
