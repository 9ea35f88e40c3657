//! Value layer of the state inspector.
//!
//! - [`parse_loose_value`] turns text typed into the editor into a value,
//!   falling back to the text itself whenever nothing else fits.
//! - [`RelaxedDecoder`] decodes the hand-written JSON superset the loose
//!   parser accepts for objects and arrays.
//! - [`HostValue`] models the live, possibly self-referencing application
//!   state and copies it into plain [`serde_json::Value`]s.
//!
//! `undefined` has no plain form: the loose parser reports it as `None`.

mod error;
pub use error::DecodeError;

pub mod number;
pub use number::{js_number, normalize_numbers};

pub mod relaxed;
pub use relaxed::{RelaxedDecoder, MAX_DEPTH};

mod loose;
pub use loose::{is_numeric_literal, parse_loose_value};

pub mod host;
pub use host::{HostArray, HostObject, HostValue, SnapshotError, WriteError, CIRCULAR_PLACEHOLDER};
