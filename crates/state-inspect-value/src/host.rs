//! `HostValue` — the inspected application state as a shared graph.
//!
//! Host state is mutable in place and may alias: two properties can hold the
//! same container and a container can (transitively) hold itself. Containers
//! are therefore reference-counted cells, and copying the graph into a plain
//! [`Value`] is fallible.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use state_inspect_path::{
    array_index, child_path, property_key, write_array_slot, Inspectable, PathError, PathSegment,
    Shape, ROOT,
};
use thiserror::Error;

pub type HostArray = Rc<RefCell<Vec<HostValue>>>;
pub type HostObject = Rc<RefCell<IndexMap<String, HostValue>>>;

/// Placeholder a back-reference is replaced with in a lossy copy.
pub const CIRCULAR_PLACEHOLDER: &str = "[Circular]";

#[derive(Clone)]
pub enum HostValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// A callable. Copied out as a placeholder string.
    Function(Option<String>),
    Array(HostArray),
    Object(HostObject),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("circular structure at {path}")]
    Circular { path: String },
    #[error("container at {path} is being mutated")]
    Busy { path: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WriteError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("container is being read or mutated")]
    Busy,
}

impl HostValue {
    pub fn array(items: Vec<HostValue>) -> Self {
        HostValue::Array(Rc::new(RefCell::new(items)))
    }

    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, HostValue)>) -> Self {
        HostValue::Object(Rc::new(RefCell::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    pub fn function(name: impl Into<String>) -> Self {
        HostValue::Function(Some(name.into()))
    }

    /// Build fresh containers holding a copy of `value`.
    pub fn from_plain(value: &Value) -> Self {
        match value {
            Value::Null => HostValue::Null,
            Value::Bool(b) => HostValue::Bool(*b),
            Value::Number(n) => HostValue::Number(n.clone()),
            Value::String(s) => HostValue::String(s.clone()),
            Value::Array(arr) => HostValue::array(arr.iter().map(HostValue::from_plain).collect()),
            Value::Object(map) => {
                HostValue::object(map.iter().map(|(k, v)| (k.clone(), HostValue::from_plain(v))))
            }
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, HostValue::Array(_) | HostValue::Object(_))
    }

    /// Whether both handles name the same container.
    pub fn same_container(&self, other: &HostValue) -> bool {
        match (self.container_id(), other.container_id()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Structural copy. Fails on a back-reference to a container that is
    /// still being copied; shared (non-cyclic) subtrees are copied twice.
    pub fn to_plain(&self) -> Result<Value, SnapshotError> {
        let mut stack = HashSet::new();
        self.copy_strict(ROOT, &mut stack)
    }

    /// Structural copy that never fails: back-references become
    /// [`CIRCULAR_PLACEHOLDER`] and busy containers become `null`.
    pub fn to_plain_lossy(&self) -> Value {
        let mut stack = HashSet::new();
        self.copy_lossy(&mut stack)
    }

    fn copy_strict(&self, path: &str, stack: &mut HashSet<usize>) -> Result<Value, SnapshotError> {
        let Some(id) = self.container_id() else {
            return Ok(self.leaf_to_plain());
        };
        if !stack.insert(id) {
            return Err(SnapshotError::Circular {
                path: path.to_string(),
            });
        }
        let busy = || SnapshotError::Busy {
            path: path.to_string(),
        };
        let copied = match self {
            HostValue::Array(items) => {
                let items = items.try_borrow().map_err(|_| busy())?;
                let mut out = Vec::with_capacity(items.len());
                for (idx, item) in items.iter().enumerate() {
                    let child = child_path(path, &PathSegment::Index(idx));
                    out.push(item.copy_strict(&child, stack)?);
                }
                Value::Array(out)
            }
            HostValue::Object(entries) => {
                let entries = entries.try_borrow().map_err(|_| busy())?;
                let mut out = Map::new();
                for (key, item) in entries.iter() {
                    let child = child_path(path, &PathSegment::Key(key.clone()));
                    out.insert(key.clone(), item.copy_strict(&child, stack)?);
                }
                Value::Object(out)
            }
            _ => self.leaf_to_plain(),
        };
        stack.remove(&id);
        Ok(copied)
    }

    fn copy_lossy(&self, stack: &mut HashSet<usize>) -> Value {
        let Some(id) = self.container_id() else {
            return self.leaf_to_plain();
        };
        if !stack.insert(id) {
            return Value::String(CIRCULAR_PLACEHOLDER.to_string());
        }
        let copied = match self {
            HostValue::Array(items) => match items.try_borrow() {
                Ok(items) => Value::Array(items.iter().map(|item| item.copy_lossy(stack)).collect()),
                Err(_) => Value::Null,
            },
            HostValue::Object(entries) => match entries.try_borrow() {
                Ok(entries) => Value::Object(
                    entries
                        .iter()
                        .map(|(key, item)| (key.clone(), item.copy_lossy(stack)))
                        .collect(),
                ),
                Err(_) => Value::Null,
            },
            _ => Value::Null,
        };
        stack.remove(&id);
        copied
    }

    fn leaf_to_plain(&self) -> Value {
        match self {
            HostValue::Null => Value::Null,
            HostValue::Bool(b) => Value::Bool(*b),
            HostValue::Number(n) => Value::Number(n.clone()),
            HostValue::String(s) => Value::String(s.clone()),
            HostValue::Function(Some(name)) => Value::String(format!("[Function {name}]")),
            HostValue::Function(None) => Value::String("[Function]".to_string()),
            HostValue::Array(_) | HostValue::Object(_) => Value::Null,
        }
    }

    /// Look up a child by structural path. Returns a handle sharing the
    /// underlying container.
    pub fn get(&self, path: &[PathSegment]) -> Option<HostValue> {
        let mut current = self.clone();
        for step in path {
            let next = current.child(step)?;
            current = next;
        }
        Some(current)
    }

    fn child(&self, step: &PathSegment) -> Option<HostValue> {
        match self {
            HostValue::Array(items) => items.try_borrow().ok()?.get(array_index(step)?).cloned(),
            HostValue::Object(entries) => entries.try_borrow().ok()?.get(&*property_key(step)).cloned(),
            _ => None,
        }
    }

    /// Write `next` at `path`, in place.
    ///
    /// An empty path clears this container and refills it with the contents
    /// of `next` (the container keeps its identity, so every alias observes
    /// the new contents). Otherwise the parent is resolved and the last
    /// segment is set; array writes past the end append and pad with `null`.
    pub fn apply_write(&self, path: &[PathSegment], next: &Value) -> Result<(), WriteError> {
        let Some((last, parents)) = path.split_last() else {
            return self.replace_contents(next);
        };
        let parent = self.get(parents).ok_or(PathError::NotFound)?;
        match &parent {
            HostValue::Array(items) => {
                let idx = array_index(last).ok_or(PathError::InvalidIndex)?;
                let mut items = items.try_borrow_mut().map_err(|_| WriteError::Busy)?;
                write_array_slot(&mut *items, idx, HostValue::from_plain(next), HostValue::Null);
                Ok(())
            }
            HostValue::Object(entries) => {
                let mut entries = entries.try_borrow_mut().map_err(|_| WriteError::Busy)?;
                entries.insert(property_key(last).into_owned(), HostValue::from_plain(next));
                Ok(())
            }
            _ => Err(PathError::NotContainer.into()),
        }
    }

    fn replace_contents(&self, next: &Value) -> Result<(), WriteError> {
        match (self, next) {
            (HostValue::Object(entries), Value::Object(next)) => {
                let mut entries = entries.try_borrow_mut().map_err(|_| WriteError::Busy)?;
                entries.clear();
                for (key, value) in next {
                    entries.insert(key.clone(), HostValue::from_plain(value));
                }
                Ok(())
            }
            (HostValue::Array(items), Value::Array(next)) => {
                let mut items = items.try_borrow_mut().map_err(|_| WriteError::Busy)?;
                items.clear();
                items.extend(next.iter().map(HostValue::from_plain));
                Ok(())
            }
            _ => Err(PathError::RootNotContainer.into()),
        }
    }
}

impl Inspectable for HostValue {
    fn shape(&self) -> Shape<Self> {
        match self {
            HostValue::Array(items) => match items.try_borrow() {
                Ok(items) => Shape::Array(items.clone()),
                Err(_) => Shape::Leaf,
            },
            HostValue::Object(entries) => match entries.try_borrow() {
                Ok(entries) => Shape::Object(
                    entries
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect(),
                ),
                Err(_) => Shape::Leaf,
            },
            _ => Shape::Leaf,
        }
    }

    fn container_id(&self) -> Option<usize> {
        match self {
            HostValue::Array(items) => Some(Rc::as_ptr(items) as *const () as usize),
            HostValue::Object(entries) => Some(Rc::as_ptr(entries) as *const () as usize),
            _ => None,
        }
    }
}

impl From<&Value> for HostValue {
    fn from(value: &Value) -> Self {
        HostValue::from_plain(value)
    }
}

// Containers print shallowly: a cyclic graph must not recurse.
impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Null => write!(f, "Null"),
            HostValue::Bool(b) => write!(f, "Bool({b})"),
            HostValue::Number(n) => write!(f, "Number({n})"),
            HostValue::String(s) => write!(f, "String({s:?})"),
            HostValue::Function(name) => write!(f, "Function({name:?})"),
            HostValue::Array(items) => match items.try_borrow() {
                Ok(items) => write!(f, "Array(len = {})", items.len()),
                Err(_) => write!(f, "Array(<borrowed>)"),
            },
            HostValue::Object(entries) => match entries.try_borrow() {
                Ok(entries) => f.debug_tuple("Object").field(&entries.keys().collect::<Vec<_>>()).finish(),
                Err(_) => write!(f, "Object(<borrowed>)"),
            },
        }
    }
}
