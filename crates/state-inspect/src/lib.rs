//! Inspector core for reactive proxy state.
//!
//! An [`Inspector`] observes a state host through its read, write and
//! subscription hooks. It keeps a bounded [`ChangeLog`] of writes, tracks
//! which paths each consumer reads in a [`SubscriberRegistry`], and
//! publishes all of it, together with the current state, on a [`Bridge`]
//! that an inspector UI listens to. The UI talks back through the bridge's
//! edit and clear commands.

pub mod bridge;
pub mod change_log;
pub mod cli;
pub mod clock;
pub mod config;
pub mod host;
pub mod inspector;
pub mod microtask;
pub mod subscribers;

pub use bridge::{Bridge, ClearFn, Commands, EditFn, Listener, Subscription};
pub use change_log::{Change, ChangeLog, Snapshot, DEFAULT_CAPACITY, INITIAL_ACTION};
pub use clock::{format_time, format_time_millis, Clock, FixedClock, SystemClock};
pub use config::{ConfigError, InspectorConfig};
pub use host::HostRoot;
pub use inspector::Inspector;
pub use microtask::{Microtask, MicrotaskQueue};
pub use subscribers::{
    PassToken, SubscriberId, SubscriberRecord, SubscriberRegistry, DEFAULT_COMPONENT_LABEL,
};
