//! Bounded history of state mutations.
//!
//! Every write recorded by the inspector becomes a [`Snapshot`] holding a
//! single [`Change`]. The log keeps at most `capacity` snapshots and drops
//! the oldest first; the synthetic initial snapshot is the first to go.

use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::clock::{format_time, Clock, SystemClock};
use crate::config::InspectorConfig;

pub const DEFAULT_CAPACITY: usize = 300;
pub const INITIAL_ACTION: &str = "Initial State";

/// One mutation. `None` stands for an absent (`undefined`) value and is left
/// out of the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    pub id: u64,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub from: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub to: Option<Value>,
}

// A field that is present, even as `null`, is `Some`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: u64,
    /// The changed path, or the initial action label.
    pub action: String,
    /// Local time of day, `HH:MM:SS`.
    pub timestamp: String,
    pub changes: Vec<Change>,
}

pub struct ChangeLog {
    snapshots: VecDeque<Snapshot>,
    capacity: usize,
    initial_action: String,
    next_snapshot_id: u64,
    next_change_id: u64,
    clock: Rc<dyn Clock>,
}

impl Default for ChangeLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ChangeLog {
    /// Create a log holding only the initial snapshot. A capacity of zero is
    /// treated as one.
    pub fn new(capacity: usize) -> Self {
        Self::with_clock(capacity, Rc::new(SystemClock))
    }

    pub fn with_clock(capacity: usize, clock: Rc<dyn Clock>) -> Self {
        Self::with_initial_action(capacity, INITIAL_ACTION, clock)
    }

    pub fn from_config(config: &InspectorConfig, clock: Rc<dyn Clock>) -> Self {
        Self::with_initial_action(config.snapshot_capacity, &config.initial_action, clock)
    }

    fn with_initial_action(capacity: usize, initial_action: &str, clock: Rc<dyn Clock>) -> Self {
        let mut log = Self {
            snapshots: VecDeque::new(),
            capacity: capacity.max(1),
            initial_action: initial_action.to_string(),
            next_snapshot_id: 1,
            next_change_id: 0,
            clock,
        };
        log.clear();
        log
    }

    /// Drop all history and start over from a fresh initial snapshot.
    ///
    /// Snapshot ids restart at 1 and change ids at 0.
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.snapshots.push_back(Snapshot {
            id: 0,
            action: self.initial_action.clone(),
            timestamp: self.timestamp(),
            changes: Vec::new(),
        });
        self.next_snapshot_id = 1;
        self.next_change_id = 0;
    }

    /// Append a snapshot for a write at `path` and return it.
    pub fn record(&mut self, path: impl Into<String>, from: Option<Value>, to: Option<Value>) -> Snapshot {
        let path = path.into();
        let change = Change {
            id: self.next_change_id,
            path: path.clone(),
            from,
            to,
        };
        self.next_change_id += 1;

        let snapshot = Snapshot {
            id: self.next_snapshot_id,
            action: path,
            timestamp: self.timestamp(),
            changes: vec![change],
        };
        self.next_snapshot_id += 1;

        self.snapshots.push_back(snapshot.clone());
        while self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        snapshot
    }

    /// Oldest first.
    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.snapshots.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }

    pub fn get(&self, id: u64) -> Option<&Snapshot> {
        self.snapshots.iter().find(|s| s.id == id)
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn timestamp(&self) -> String {
        format_time(self.clock.now())
    }
}
