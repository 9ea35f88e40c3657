//! Adapter between a reactive state host and the inspector [`Bridge`].
//!
//! The host calls the `on_*` hooks as its state is read, written and
//! subscribed to. The inspector turns those calls into change-log snapshots,
//! subscriber records and state broadcasts, and answers the bridge's edit
//! and clear commands.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use serde_json::json;
//! use state_inspect::{Bridge, Inspector, InspectorConfig};
//! use state_inspect_path::decode_path;
//! use state_inspect_value::HostValue;
//!
//! let bridge = Rc::new(Bridge::new());
//! let inspector = Inspector::<HostValue>::attach(Rc::clone(&bridge), InspectorConfig::default());
//! let state = HostValue::from_plain(&json!({"count": 0}));
//!
//! let path = decode_path("count");
//! inspector.on_before_write(&path, Some(&json!(1)), Some(&json!(0)), &state);
//! state.apply_write(&path, &json!(1)).unwrap();
//! inspector.on_after_write(&path, Some(&json!(1)), &state);
//!
//! assert_eq!(bridge.get_state(), Some(json!({"count": 1})));
//! assert_eq!(bridge.get_snapshots()[1].action, "count");
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::Value;
use state_inspect_path::{decode_path, encode_path, PathSegment};

use crate::bridge::{Bridge, ClearFn, Commands, EditFn};
use crate::change_log::{ChangeLog, Snapshot};
use crate::clock::{Clock, SystemClock};
use crate::config::InspectorConfig;
use crate::host::HostRoot;
use crate::microtask::{Microtask, MicrotaskQueue};
use crate::subscribers::{PassToken, SubscriberId, SubscriberRecord, SubscriberRegistry};

struct PendingChange {
    path: String,
    prev: Option<Value>,
}

pub struct Inspector<R: HostRoot> {
    bridge: Rc<Bridge>,
    config: InspectorConfig,
    root: RefCell<Option<R>>,
    change_log: RefCell<ChangeLog>,
    subscribers: RefCell<SubscriberRegistry>,
    microtasks: RefCell<MicrotaskQueue>,
    pending: RefCell<Option<PendingChange>>,
    announced: Cell<bool>,
    snapshot_warned: Cell<bool>,
    previous_commands: RefCell<Option<Commands>>,
}

impl<R: HostRoot> Inspector<R> {
    /// Connect a new inspector to `bridge`.
    ///
    /// Installs the edit and clear commands (the inspector is only weakly
    /// referenced by them) and publishes the initial snapshot history.
    pub fn attach(bridge: Rc<Bridge>, config: InspectorConfig) -> Rc<Self> {
        Self::attach_with_clock(bridge, config, Rc::new(SystemClock))
    }

    pub fn attach_with_clock(bridge: Rc<Bridge>, config: InspectorConfig, clock: Rc<dyn Clock>) -> Rc<Self> {
        let inspector = Rc::new(Self {
            change_log: RefCell::new(ChangeLog::from_config(&config, Rc::clone(&clock))),
            subscribers: RefCell::new(SubscriberRegistry::new(
                config.default_component_label.clone(),
                clock,
            )),
            bridge,
            config,
            root: RefCell::new(None),
            microtasks: RefCell::new(MicrotaskQueue::new()),
            pending: RefCell::new(None),
            announced: Cell::new(false),
            snapshot_warned: Cell::new(false),
            previous_commands: RefCell::new(None),
        });

        let target = Rc::downgrade(&inspector);
        let edit: EditFn = Rc::new(move |path: &str, value: Option<Value>| {
            if let Some(inspector) = target.upgrade() {
                inspector.edit(path, value);
            }
        });
        let target = Rc::downgrade(&inspector);
        let clear: ClearFn = Rc::new(move || {
            if let Some(inspector) = target.upgrade() {
                inspector.clear_snapshots();
            }
        });
        let previous = inspector.bridge.install_commands(edit, clear);
        *inspector.previous_commands.borrow_mut() = Some(previous);

        inspector.publish_snapshots();
        inspector
    }

    /// Put back the bridge commands that were installed before this
    /// inspector attached.
    pub fn detach(&self) {
        if let Some(previous) = self.previous_commands.borrow_mut().take() {
            self.bridge.restore_commands(previous);
        }
    }

    // ── Host hooks ────────────────────────────────────────────────────────

    pub fn on_read(&self, path: &[PathSegment], root: &R) {
        self.capture_root(root);
        self.subscribers.borrow_mut().record_read(&encode_path(path));
    }

    /// Called before a write lands. Writes are never vetoed.
    pub fn on_before_write(
        &self,
        path: &[PathSegment],
        _next: Option<&Value>,
        prev: Option<&Value>,
        root: &R,
    ) -> bool {
        self.capture_root(root);
        *self.pending.borrow_mut() = Some(PendingChange {
            path: encode_path(path),
            prev: prev.cloned(),
        });
        true
    }

    /// Called after a write landed: records a snapshot and broadcasts the
    /// new state.
    pub fn on_after_write(&self, path: &[PathSegment], next: Option<&Value>, root: &R) {
        self.capture_root(root);
        let path = encode_path(path);
        let from = match self.pending.borrow_mut().take() {
            Some(pending) if pending.path == path => pending.prev,
            _ => None,
        };
        self.change_log.borrow_mut().record(path, from, next.cloned());
        self.publish_snapshots();
        self.broadcast_state();
    }

    pub fn on_subscription_established(&self, target: &R, label: Option<&str>) -> SubscriberId {
        self.capture_root(target);
        let id = self.subscribers.borrow_mut().register_subscription(label);
        self.publish_subscribers();
        id
    }

    pub fn on_subscription_fired(&self, id: &SubscriberId) {
        let known = self.subscribers.borrow_mut().notify(id);
        if known {
            self.publish_subscribers();
        }
    }

    /// A render pass is about to read state. Reads reported through
    /// [`Inspector::on_read`] until the next [`Inspector::run_microtasks`]
    /// are attributed to `label`.
    pub fn on_snapshot_taken(&self, label: Option<&str>) -> PassToken {
        let token = self.subscribers.borrow_mut().begin_read_pass(label);
        self.microtasks.borrow_mut().push(Microtask::FinalizeReadPass(token));
        token
    }

    /// Run deferred work until the queue is empty. Returns the number of
    /// tasks run.
    pub fn run_microtasks(&self) -> usize {
        let mut ran = 0;
        loop {
            let task = self.microtasks.borrow_mut().pop();
            let Some(task) = task else {
                return ran;
            };
            match task {
                Microtask::FinalizeReadPass(token) => {
                    let finalized = self.subscribers.borrow_mut().finalize_pass(token);
                    if finalized {
                        self.publish_subscribers();
                    }
                }
            }
            ran += 1;
        }
    }

    // ── Commands ──────────────────────────────────────────────────────────

    /// Write `value` at the canonical `path` of the captured root.
    ///
    /// Dropped when no root has been seen yet; write failures are logged
    /// and otherwise ignored.
    pub fn edit(&self, path: &str, value: Option<Value>) {
        let root = self.root.borrow().clone();
        let Some(root) = root else {
            log::debug!("dropping edit of {path}: no state observed yet");
            return;
        };
        let segments = decode_path(path);
        let value = value.unwrap_or(Value::Null);
        if let Err(err) = root.apply_write(&segments, &value) {
            log::debug!("edit of {path} failed: {err}");
        }
    }

    /// Reset the snapshot history and republish.
    pub fn clear_snapshots(&self) {
        self.change_log.borrow_mut().clear();
        self.publish_snapshots();
        self.broadcast_state();
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn bridge(&self) -> &Rc<Bridge> {
        &self.bridge
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    pub fn root(&self) -> Option<R> {
        self.root.borrow().clone()
    }

    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.change_log.borrow().snapshots()
    }

    pub fn subscribers(&self) -> Vec<SubscriberRecord> {
        self.subscribers.borrow().records()
    }

    pub fn pending_microtasks(&self) -> usize {
        self.microtasks.borrow().len()
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn capture_root(&self, root: &R) {
        if self.root.borrow().is_none() {
            *self.root.borrow_mut() = Some(root.clone());
        }
        if !self.announced.replace(true) {
            self.broadcast_state();
            self.publish_snapshots();
        }
    }

    fn broadcast_state(&self) {
        let root = self.root.borrow().clone();
        let Some(root) = root else {
            return;
        };
        let state = match root.snapshot() {
            Ok(state) => state,
            Err(err) => {
                if !self.snapshot_warned.replace(true) {
                    log::warn!("state snapshot failed, broadcasting a lossy copy: {err}");
                }
                root.snapshot_lossy()
            }
        };
        self.bridge.ingest_state(state);
    }

    fn publish_snapshots(&self) {
        let snapshots = self.change_log.borrow().snapshots();
        self.bridge.ingest_snapshots(snapshots);
    }

    fn publish_subscribers(&self) {
        let records = self.subscribers.borrow().records();
        self.bridge.ingest_subscribers(records);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::NaiveTime;
    use serde_json::json;
    use state_inspect_value::HostValue;

    fn attach() -> (Rc<Bridge>, Rc<Inspector<HostValue>>) {
        let bridge = Rc::new(Bridge::new());
        let time = NaiveTime::from_hms_milli_opt(14, 2, 3, 4).unwrap();
        let inspector = Inspector::attach_with_clock(
            Rc::clone(&bridge),
            InspectorConfig::default(),
            Rc::new(FixedClock(time)),
        );
        (bridge, inspector)
    }

    #[test]
    fn test_attach_publishes_initial_history() {
        let (bridge, _inspector) = attach();
        let snapshots = bridge.get_snapshots();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].action, "Initial State");
        assert_eq!(snapshots[0].timestamp, "14:02:03");
        assert_eq!(bridge.get_state(), None);
    }

    #[test]
    fn test_first_read_announces_state() {
        let (bridge, inspector) = attach();
        let state = HostValue::from_plain(&json!({"count": 0}));
        inspector.on_read(&decode_path("count"), &state);
        assert_eq!(bridge.get_state(), Some(json!({"count": 0})));
    }

    #[test]
    fn test_write_without_before_hook_has_no_from() {
        let (_bridge, inspector) = attach();
        let state = HostValue::from_plain(&json!({"a": 1}));
        inspector.on_after_write(&decode_path("a"), Some(&json!(2)), &state);
        let change = &inspector.snapshots()[1].changes[0];
        assert_eq!(change.from, None);
        assert_eq!(change.to, Some(json!(2)));
    }

    #[test]
    fn test_pending_change_for_other_path_is_ignored() {
        let (_bridge, inspector) = attach();
        let state = HostValue::from_plain(&json!({"a": 1, "b": 2}));
        inspector.on_before_write(&decode_path("a"), Some(&json!(5)), Some(&json!(1)), &state);
        inspector.on_after_write(&decode_path("b"), Some(&json!(3)), &state);
        assert_eq!(inspector.snapshots()[1].changes[0].from, None);
    }

    #[test]
    fn test_edit_before_any_state_is_dropped() {
        let (bridge, inspector) = attach();
        bridge.edit("count", Some(json!(1)));
        assert!(inspector.root().is_none());
        assert_eq!(bridge.get_state(), None);
    }

    #[test]
    fn test_edit_writes_through_to_root() {
        let (bridge, inspector) = attach();
        let state = HostValue::from_plain(&json!({"todos": [{"done": false}]}));
        inspector.on_read(&decode_path("todos"), &state);
        bridge.edit("todos[0].done", Some(json!(true)));
        assert_eq!(state.to_plain().unwrap(), json!({"todos": [{"done": true}]}));
    }

    #[test]
    fn test_failed_edit_is_swallowed() {
        let (bridge, inspector) = attach();
        let state = HostValue::from_plain(&json!({"count": 0}));
        inspector.on_read(&[], &state);
        bridge.edit("missing.deep", Some(json!(1)));
        bridge.edit("root", Some(json!(5)));
        assert_eq!(state.to_plain().unwrap(), json!({"count": 0}));
    }

    #[test]
    fn test_detach_restores_previous_commands() {
        let bridge = Rc::new(Bridge::new());
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        bridge.install_commands(
            Rc::new(|_: &str, _: Option<Value>| {}),
            Rc::new(move || counter.set(counter.get() + 1)),
        );
        let inspector = Inspector::<HostValue>::attach(Rc::clone(&bridge), InspectorConfig::default());
        bridge.clear_snapshots();
        assert_eq!(hits.get(), 0);
        inspector.detach();
        bridge.clear_snapshots();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_commands_outlive_inspector_harmlessly() {
        let (bridge, inspector) = attach();
        drop(inspector);
        bridge.edit("count", Some(json!(1)));
        bridge.clear_snapshots();
        assert_eq!(bridge.get_snapshots().len(), 1);
    }
}
