//! Which parts of the state each consumer depends on, and how often it
//! re-rendered.
//!
//! Two kinds of consumer are tracked. A *subscription* (`sub-<n>`) is an
//! explicit change listener; every time it fires its render count goes up.
//! A *read pass* (`snapshot-<label>`) is a synchronous render that reads
//! state; the paths it reads are collected while the pass is open and merged
//! into the consumer's path set when the pass is finalized.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::clock::{format_time_millis, Clock, SystemClock};

pub const DEFAULT_COMPONENT_LABEL: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriberId(String);

impl SubscriberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Published view of one consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberRecord {
    pub id: SubscriberId,
    pub component: String,
    /// Canonical paths, sorted.
    pub paths: Vec<String>,
    pub render_count: u64,
    /// `HH:MM:SS.mmm`
    pub last_render: String,
}

/// Names one read pass. Only the most recently opened pass can be finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassToken(u64);

struct Subscriber {
    component: String,
    paths: BTreeSet<String>,
    render_count: u64,
    last_render: String,
}

struct ReadPass {
    token: PassToken,
    subscriber: SubscriberId,
    reads: IndexSet<String>,
}

pub struct SubscriberRegistry {
    subscribers: IndexMap<SubscriberId, Subscriber>,
    open_pass: Option<ReadPass>,
    next_subscription: u64,
    next_pass: u64,
    default_label: String,
    clock: Rc<dyn Clock>,
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_COMPONENT_LABEL, Rc::new(SystemClock))
    }
}

impl SubscriberRegistry {
    pub fn new(default_label: impl Into<String>, clock: Rc<dyn Clock>) -> Self {
        Self {
            subscribers: IndexMap::new(),
            open_pass: None,
            next_subscription: 0,
            next_pass: 0,
            default_label: default_label.into(),
            clock,
        }
    }

    /// Register an explicit subscription. It starts with no paths and a
    /// render count of zero.
    pub fn register_subscription(&mut self, label: Option<&str>) -> SubscriberId {
        let id = SubscriberId(format!("sub-{}", self.next_subscription));
        self.next_subscription += 1;
        let subscriber = Subscriber {
            component: self.label(label),
            paths: BTreeSet::new(),
            render_count: 0,
            last_render: self.now(),
        };
        self.subscribers.insert(id.clone(), subscriber);
        id
    }

    /// A subscription callback fired. Returns `false` for unknown ids.
    pub fn notify(&mut self, id: &SubscriberId) -> bool {
        let now = self.now();
        let Some(subscriber) = self.subscribers.get_mut(id) else {
            return false;
        };
        subscriber.render_count += 1;
        subscriber.last_render = now;
        true
    }

    /// Open a read pass for `label`, counting one render of its consumer.
    ///
    /// A pass that is still open is discarded together with the reads it
    /// collected.
    pub fn begin_read_pass(&mut self, label: Option<&str>) -> PassToken {
        let component = self.label(label);
        let id = SubscriberId(format!("snapshot-{component}"));
        let now = self.now();
        let subscriber = self.subscribers.entry(id.clone()).or_insert_with(|| Subscriber {
            component,
            paths: BTreeSet::new(),
            render_count: 0,
            last_render: now.clone(),
        });
        subscriber.render_count += 1;
        subscriber.last_render = now;

        let token = PassToken(self.next_pass);
        self.next_pass += 1;
        let previous = self.open_pass.replace(ReadPass {
            token,
            subscriber: id,
            reads: IndexSet::new(),
        });
        if let Some(previous) = previous {
            log::debug!(
                "discarding read pass of {} with {} unattributed reads",
                previous.subscriber,
                previous.reads.len()
            );
        }
        token
    }

    /// Note a read of `path` by the open pass. Ignored when none is open.
    pub fn record_read(&mut self, path: &str) -> bool {
        match &mut self.open_pass {
            Some(pass) => {
                pass.reads.insert(path.to_string());
                true
            }
            None => false,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.open_pass.is_some()
    }

    /// Attribute the reads of the pass named by `token` and close it.
    ///
    /// Returns `false` when `token` no longer names the open pass.
    pub fn finalize_pass(&mut self, token: PassToken) -> bool {
        if self.open_pass.as_ref().map(|pass| pass.token) != Some(token) {
            return false;
        }
        let Some(pass) = self.open_pass.take() else {
            return false;
        };
        if let Some(subscriber) = self.subscribers.get_mut(&pass.subscriber) {
            subscriber.paths.extend(pass.reads);
        }
        true
    }

    /// All consumers, in order of first registration.
    pub fn records(&self) -> Vec<SubscriberRecord> {
        self.subscribers
            .iter()
            .map(|(id, subscriber)| subscriber.record(id))
            .collect()
    }

    pub fn get(&self, id: &SubscriberId) -> Option<SubscriberRecord> {
        self.subscribers.get(id).map(|subscriber| subscriber.record(id))
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    fn label(&self, label: Option<&str>) -> String {
        label.unwrap_or(&self.default_label).to_string()
    }

    fn now(&self) -> String {
        format_time_millis(self.clock.now())
    }
}

impl Subscriber {
    fn record(&self, id: &SubscriberId) -> SubscriberRecord {
        SubscriberRecord {
            id: id.clone(),
            component: self.component.clone(),
            paths: self.paths.iter().cloned().collect(),
            render_count: self.render_count,
            last_render: self.last_render.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::NaiveTime;
    use serde_json::json;

    fn registry() -> SubscriberRegistry {
        let time = NaiveTime::from_hms_milli_opt(8, 0, 1, 250).unwrap();
        SubscriberRegistry::new("Unknown", Rc::new(FixedClock(time)))
    }

    #[test]
    fn test_subscription_ids_are_sequential() {
        let mut registry = registry();
        let a = registry.register_subscription(Some("Counter"));
        let b = registry.register_subscription(None);
        assert_eq!(a.as_str(), "sub-0");
        assert_eq!(b.as_str(), "sub-1");
        let record = registry.get(&b).unwrap();
        assert_eq!(record.component, "Unknown");
        assert_eq!(record.render_count, 0);
        assert_eq!(record.last_render, "08:00:01.250");
    }

    #[test]
    fn test_notify_counts_renders() {
        let mut registry = registry();
        let id = registry.register_subscription(Some("Counter"));
        assert!(registry.notify(&id));
        assert!(registry.notify(&id));
        assert_eq!(registry.get(&id).unwrap().render_count, 2);
        assert!(!registry.notify(&SubscriberId::new("sub-99")));
    }

    #[test]
    fn test_read_pass_attributes_on_finalize() {
        let mut registry = registry();
        let token = registry.begin_read_pass(Some("TodoList"));
        registry.record_read("todos");
        registry.record_read("todos[0]");
        registry.record_read("todos");
        let id = SubscriberId::new("snapshot-TodoList");
        assert!(registry.get(&id).unwrap().paths.is_empty());
        assert!(registry.finalize_pass(token));
        let record = registry.get(&id).unwrap();
        assert_eq!(record.paths, vec!["todos", "todos[0]"]);
        assert_eq!(record.render_count, 1);
        assert!(!registry.is_tracking());
    }

    #[test]
    fn test_reads_outside_a_pass_are_ignored() {
        let mut registry = registry();
        assert!(!registry.record_read("count"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_newer_pass_discards_older() {
        let mut registry = registry();
        let first = registry.begin_read_pass(Some("A"));
        registry.record_read("x");
        let second = registry.begin_read_pass(Some("B"));
        registry.record_read("y");
        assert!(!registry.finalize_pass(first));
        assert!(registry.finalize_pass(second));
        assert!(registry.get(&SubscriberId::new("snapshot-A")).unwrap().paths.is_empty());
        assert_eq!(registry.get(&SubscriberId::new("snapshot-B")).unwrap().paths, vec!["y"]);
    }

    #[test]
    fn test_records_keep_registration_order() {
        let mut registry = registry();
        registry.begin_read_pass(Some("Header"));
        registry.register_subscription(Some("Footer"));
        let ids: Vec<String> = registry.records().into_iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, vec!["snapshot-Header", "sub-0"]);
    }

    #[test]
    fn test_record_wire_shape() {
        let mut registry = registry();
        let id = registry.register_subscription(Some("Counter"));
        assert_eq!(
            serde_json::to_value(registry.get(&id).unwrap()).unwrap(),
            json!({
                "id": "sub-0",
                "component": "Counter",
                "paths": [],
                "renderCount": 0,
                "lastRender": "08:00:01.250"
            })
        );
    }
}
