//! Event bridge between the inspector core and an inspector UI.
//!
//! The bridge carries three streams (current state, snapshot history,
//! subscriber records) and two commands going the other way (edit a value,
//! clear the history). Each stream remembers its last value so a consumer
//! that connects late can read it with the matching `get_*` method.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use serde_json::Value;

use crate::change_log::Snapshot;
use crate::subscribers::SubscriberRecord;

pub type Listener<T> = Rc<dyn Fn(&T)>;

/// Write-back command: canonical path and the parsed value (`None` is
/// `undefined`).
pub type EditFn = Rc<dyn Fn(&str, Option<Value>)>;
pub type ClearFn = Rc<dyn Fn()>;

/// The installed command handlers.
#[derive(Clone, Default)]
pub struct Commands {
    pub edit: Option<EditFn>,
    pub clear: Option<ClearFn>,
}

struct Stream<T> {
    value: RefCell<Option<Rc<T>>>,
    next_listener_id: Cell<u64>,
    listeners: RefCell<BTreeMap<u64, Listener<T>>>,
}

impl<T: 'static> Stream<T> {
    fn new() -> Rc<Self> {
        Rc::new(Self {
            value: RefCell::new(None),
            next_listener_id: Cell::new(1),
            listeners: RefCell::new(BTreeMap::new()),
        })
    }

    fn get(&self) -> Option<Rc<T>> {
        self.value.borrow().clone()
    }

    fn emit(&self, next: T) {
        let value = Rc::new(next);
        *self.value.borrow_mut() = Some(Rc::clone(&value));
        // Listeners may add or remove listeners while we iterate.
        let listeners: Vec<Listener<T>> = self.listeners.borrow().values().cloned().collect();
        for listener in listeners {
            listener(&value);
        }
    }

    fn on(self: &Rc<Self>, listener: Listener<T>) -> Subscription {
        let id = self.next_listener_id.get();
        self.next_listener_id.set(id.saturating_add(1));
        self.listeners.borrow_mut().insert(id, listener);
        let stream: Weak<Self> = Rc::downgrade(self);
        Subscription {
            remove: Box::new(move || match stream.upgrade() {
                Some(stream) => stream.listeners.borrow_mut().remove(&id).is_some(),
                None => false,
            }),
        }
    }
}

/// Handle to a registered listener.
///
/// Dropping the handle leaves the listener registered.
pub struct Subscription {
    remove: Box<dyn FnOnce() -> bool>,
}

impl Subscription {
    /// Remove the listener. Returns whether it was still registered.
    pub fn unsubscribe(self) -> bool {
        (self.remove)()
    }
}

pub struct Bridge {
    state: Rc<Stream<Value>>,
    snapshots: Rc<Stream<Vec<Snapshot>>>,
    subscribers: Rc<Stream<Vec<SubscriberRecord>>>,
    commands: RefCell<Commands>,
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Bridge {
    pub fn new() -> Self {
        Self {
            state: Stream::new(),
            snapshots: Stream::new(),
            subscribers: Stream::new(),
            commands: RefCell::new(Commands::default()),
        }
    }

    // ── Streams ───────────────────────────────────────────────────────────

    pub fn on_state<F: Fn(&Value) + 'static>(&self, listener: F) -> Subscription {
        self.state.on(Rc::new(listener))
    }

    pub fn on_snapshots<F: Fn(&Vec<Snapshot>) + 'static>(&self, listener: F) -> Subscription {
        self.snapshots.on(Rc::new(listener))
    }

    pub fn on_subscribers<F: Fn(&Vec<SubscriberRecord>) + 'static>(&self, listener: F) -> Subscription {
        self.subscribers.on(Rc::new(listener))
    }

    pub fn ingest_state(&self, next: Value) {
        self.state.emit(next);
    }

    pub fn ingest_snapshots(&self, next: Vec<Snapshot>) {
        self.snapshots.emit(next);
    }

    pub fn ingest_subscribers(&self, next: Vec<SubscriberRecord>) {
        self.subscribers.emit(next);
    }

    /// `None` until the first state has been ingested.
    pub fn get_state(&self) -> Option<Value> {
        self.state.get().map(|value| (*value).clone())
    }

    pub fn get_snapshots(&self) -> Vec<Snapshot> {
        self.snapshots.get().map(|value| (*value).clone()).unwrap_or_default()
    }

    pub fn get_subscribers(&self) -> Vec<SubscriberRecord> {
        self.subscribers.get().map(|value| (*value).clone()).unwrap_or_default()
    }

    // ── Commands ──────────────────────────────────────────────────────────

    /// Install the command handlers and return the ones they replace.
    pub fn install_commands(&self, edit: EditFn, clear: ClearFn) -> Commands {
        self.commands.replace(Commands {
            edit: Some(edit),
            clear: Some(clear),
        })
    }

    /// Put back handlers previously returned by [`Bridge::install_commands`].
    pub fn restore_commands(&self, previous: Commands) {
        *self.commands.borrow_mut() = previous;
    }

    /// Ask the host to write `value` at `path`. No-op without a handler.
    pub fn edit(&self, path: &str, value: Option<Value>) {
        let handler = self.commands.borrow().edit.clone();
        if let Some(handler) = handler {
            handler(path, value);
        }
    }

    /// Ask the host to reset the snapshot history. No-op without a handler.
    pub fn clear_snapshots(&self) {
        let handler = self.commands.borrow().clear.clone();
        if let Some(handler) = handler {
            handler();
        }
    }
}
