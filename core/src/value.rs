//! Dynamic value model for untyped input trees and hydrated graphs.
//!
//! [`Value`] plays the role of a parsed-but-untyped data tree (e.g. the
//! result of deserializing JSON) on the input side, and of the hydrated,
//! schema-conformant graph on the output side. Scalars are plain copies;
//! arrays, objects and entity instances are shared `Rc` references so that
//! a graph can contain shared substructures and cycles, and so the cloner
//! can reason about reference identity.

use std::cell::RefCell;
use std::rc::Rc;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::entity::Instance;

/// An insertion-ordered string-keyed map of values.
///
/// Key-enumeration order is insertion order, which fixes the field order
/// observed by dynamic-map hydration and by serialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(Rc<str>, Value)>,
}

impl Fields {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Looks up an entry by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v)
    }

    /// Inserts or replaces an entry. New keys append at the end.
    pub fn insert(&mut self, key: impl Into<Rc<str>>, value: Value) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_ref(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A dynamically typed value.
///
/// Mirrors the runtime type universe the schema grammar matches against:
/// the primitive tags plus arrays, string-keyed objects, and typed entity
/// instances. Reference variants share their backing cell when cloned with
/// ordinary [`Clone`]; use [`Value::deep_clone`] for an identity-preserving
/// deep copy.
///
/// # Examples
///
/// ```
/// use hydrator_core::Value;
///
/// let v = Value::object([("name", Value::from("ada")), ("age", Value::from(36))]);
/// let obj = v.as_object().unwrap().borrow();
/// assert_eq!(obj.get("name"), Some(&Value::from("ada")));
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent value (`undefined`).
    Undefined,
    /// Explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Double-precision number.
    Number(f64),
    /// Arbitrary-precision-style integer.
    BigInt(i128),
    /// Immutable string.
    String(Rc<str>),
    /// Opaque token; two symbols are equal only if they share one token.
    Symbol(Rc<str>),
    /// Ordered sequence, shared by reference.
    Array(Rc<RefCell<Vec<Value>>>),
    /// String-keyed map, shared by reference.
    Object(Rc<RefCell<Fields>>),
    /// Hydrated typed-entity instance, shared by reference.
    Entity(Rc<RefCell<Instance>>),
}

impl Value {
    /// Creates a string value.
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::String(s.into())
    }

    /// Creates a fresh symbol with the given description token.
    pub fn symbol(description: impl Into<Rc<str>>) -> Self {
        Value::Symbol(description.into())
    }

    /// Creates an array value from its elements.
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items.into_iter().collect())))
    }

    /// Creates an object value from `(key, value)` pairs, in order.
    pub fn object<K: Into<Rc<str>>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        let mut fields = Fields::new();
        for (k, v) in entries {
            fields.insert(k, v);
        }
        Value::Object(Rc::new(RefCell::new(fields)))
    }

    /// The `typeof`-style tag used by primitive matching and error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Array(_) => "array",
            Value::Object(_) | Value::Entity(_) => "object",
        }
    }

    /// Borrowed handle to the backing cell, if this is an object.
    pub fn as_object(&self) -> Option<&Rc<RefCell<Fields>>> {
        match self {
            Value::Object(cell) => Some(cell),
            _ => None,
        }
    }

    /// Borrowed handle to the backing cell, if this is an array.
    pub fn as_array(&self) -> Option<&Rc<RefCell<Vec<Value>>>> {
        match self {
            Value::Array(cell) => Some(cell),
            _ => None,
        }
    }

    /// Borrowed handle to the backing cell, if this is an entity instance.
    pub fn as_entity(&self) -> Option<&Rc<RefCell<Instance>>> {
        match self {
            Value::Entity(cell) => Some(cell),
            _ => None,
        }
    }

    /// String slice, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// Numeric value, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Identity key of the backing allocation, for reference variants.
    ///
    /// Scalars have no identity and return `None`.
    pub fn ref_addr(&self) -> Option<usize> {
        match self {
            Value::Array(cell) => Some(Rc::as_ptr(cell) as usize),
            Value::Object(cell) => Some(Rc::as_ptr(cell) as usize),
            Value::Entity(cell) => Some(Rc::as_ptr(cell) as usize),
            _ => None,
        }
    }

    /// Whether two values are the *same* reference (shared backing cell).
    ///
    /// Always `false` for scalars, whose identity is not tracked.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self.ref_addr(), other.ref_addr()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// Structural equality.
///
/// Compares reference variants by content, not identity. Only defined for
/// acyclic graphs; comparing cyclic graphs does not terminate.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => Rc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => *a.borrow() == *b.borrow(),
            (Value::Object(a), Value::Object(b)) => *a.borrow() == *b.borrow(),
            (Value::Entity(a), Value::Entity(b)) => *a.borrow() == *b.borrow(),
            _ => false,
        }
    }
}

impl From<Fields> for Value {
    fn from(fields: Fields) -> Self {
        Value::Object(Rc::new(RefCell::new(fields)))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

/// Converts parsed JSON into the engine's value model.
///
/// Numbers map to [`Value::Number`] (JSON has a single numeric type);
/// object key order follows the deserializer's iteration order.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::string(s),
            serde_json::Value::Array(items) => Value::array(items.into_iter().map(Value::from)),
            serde_json::Value::Object(map) => {
                Value::object(map.into_iter().map(|(k, v)| (k, Value::from(v))))
            }
        }
    }
}

/// Serializes a hydrated graph back out as plain data.
///
/// Entities render as maps of their fields; `Undefined` entries inside
/// objects and entities are dropped, while a bare `Undefined` (or an array
/// element) renders as null. Symbols render as their description token.
/// Only defined for acyclic graphs.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Undefined | Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::BigInt(n) => serializer.serialize_i128(*n),
            Value::String(s) | Value::Symbol(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let items = items.borrow();
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(fields) => serialize_fields(&fields.borrow(), serializer),
            Value::Entity(instance) => {
                let instance = instance.borrow();
                let defined: Vec<_> = instance
                    .fields()
                    .filter(|(_, v)| !matches!(v, Value::Undefined))
                    .collect();
                let mut map = serializer.serialize_map(Some(defined.len()))?;
                for (key, value) in defined {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

fn serialize_fields<S: Serializer>(fields: &Fields, serializer: S) -> Result<S::Ok, S::Error> {
    let defined: Vec<_> = fields
        .iter()
        .filter(|(_, v)| !matches!(v, Value::Undefined))
        .collect();
    let mut map = serializer.serialize_map(Some(defined.len()))?;
    for (key, value) in defined {
        map.serialize_entry(key, value)?;
    }
    map.end()
}
