//! The seam between the inspector and the state it observes.

use std::fmt;

use serde_json::Value;
use state_inspect_path::PathSegment;
use state_inspect_value::{HostValue, SnapshotError, WriteError};

/// A handle to the root of an observed state graph.
///
/// Handles are cheap to clone and all clones address the same state.
pub trait HostRoot: Clone + 'static {
    type SnapshotError: fmt::Display;
    type WriteError: fmt::Display;

    /// Deep, plain copy of the whole state.
    fn snapshot(&self) -> Result<Value, Self::SnapshotError>;

    /// Deep copy that cannot fail; unrepresentable parts are replaced by
    /// placeholders.
    fn snapshot_lossy(&self) -> Value;

    /// Write `value` at `path` in place. An empty path replaces the root's
    /// contents.
    fn apply_write(&self, path: &[PathSegment], value: &Value) -> Result<(), Self::WriteError>;
}

impl HostRoot for HostValue {
    type SnapshotError = SnapshotError;
    type WriteError = WriteError;

    fn snapshot(&self) -> Result<Value, SnapshotError> {
        self.to_plain()
    }

    fn snapshot_lossy(&self) -> Value {
        self.to_plain_lossy()
    }

    fn apply_write(&self, path: &[PathSegment], value: &Value) -> Result<(), WriteError> {
        HostValue::apply_write(self, path, value)
    }
}
