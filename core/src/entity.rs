//! Typed entities: named types binding a fixed field-to-schema shape.
//!
//! An [`EntityType`] declares the shape; an [`Instance`] is a concrete
//! object populated through exactly one of two construction paths:
//!
//! - **from raw input** ([`EntityType::hydrate`]): every shape field is
//!   hydrated from the input object, so a successful construction always
//!   satisfies the shape.
//! - **from a source instance** (`from_source`, used by the cloner):
//!   fields are deep-copied without re-validation, with the new
//!   instance registered in the visited map before any field is walked so
//!   self-referential graphs clone correctly.

use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::clone::{VisitedMap, clone_value};
use crate::error::{HydrationError, HydrationResult};
use crate::hydrate::hydrate;
use crate::schema::Schema;
use crate::value::Value;

/// A named entity type with a fixed field-to-schema shape.
///
/// Always handled as `Rc<EntityType>` so schema nodes can reference it.
/// Shapes that reference their own type (or each other) are declared in
/// two phases: [`EntityType::declare`] first, then [`EntityType::define`].
///
/// # Examples
///
/// ```
/// use hydrator_core::{EntityType, Schema, Value};
///
/// let user = EntityType::new("User", [
///     ("name", Schema::string()),
///     ("age", Schema::number().optional()),
/// ]);
///
/// let input = Value::object([("name", Value::from("ada")), ("age", Value::from(36))]);
/// let hydrated = user.hydrate(&input).unwrap();
/// let instance = hydrated.as_entity().unwrap().borrow();
/// assert_eq!(instance.get("name"), Some(&Value::from("ada")));
/// ```
#[derive(Debug)]
pub struct EntityType {
    name: String,
    shape: RefCell<Vec<(String, Schema)>>,
    me: Weak<EntityType>,
}

impl EntityType {
    /// Creates a fully defined entity type in one step.
    pub fn new<K: Into<String>>(
        name: &str,
        shape: impl IntoIterator<Item = (K, Schema)>,
    ) -> Rc<Self> {
        let ty = Self::declare(name);
        ty.define(shape);
        ty
    }

    /// Declares an entity type with an empty shape, to be filled in by
    /// [`define`](EntityType::define). Needed for self-referential and
    /// mutually-referential shapes.
    ///
    /// # Examples
    ///
    /// ```
    /// use hydrator_core::{EntityType, Schema};
    ///
    /// let node = EntityType::declare("Node");
    /// node.define([
    ///     ("id", Schema::number()),
    ///     ("next", Schema::entity(&node).optional()),
    /// ]);
    /// ```
    pub fn declare(name: &str) -> Rc<Self> {
        Rc::new_cyclic(|me| Self {
            name: name.to_string(),
            shape: RefCell::new(Vec::new()),
            me: me.clone(),
        })
    }

    // `declare` hands out the only way to own an EntityType, so the
    // upgrade cannot fail while `&self` exists.
    fn handle(&self) -> Rc<EntityType> {
        self.me.upgrade().expect("EntityType is always Rc-owned")
    }

    /// Sets the declared shape, replacing any previous definition.
    pub fn define<K: Into<String>>(&self, shape: impl IntoIterator<Item = (K, Schema)>) {
        *self.shape.borrow_mut() = shape.into_iter().map(|(k, s)| (k.into(), s)).collect();
    }

    /// The type's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared shape, in field-declaration order.
    pub fn shape(&self) -> Ref<'_, Vec<(String, Schema)>> {
        self.shape.borrow()
    }

    /// Constructs an instance from raw untyped input.
    ///
    /// Every declared field is hydrated against its schema with `input` as
    /// the root of the sub-construction; a required field that is missing
    /// or invalid fails with a [`HydrationError`] naming that field's path.
    pub fn hydrate(&self, input: &Value) -> HydrationResult<Value> {
        debug!(entity = %self.name, "hydrating entity from raw input");
        self.from_input(input)
    }

    pub(crate) fn from_input(&self, input: &Value) -> HydrationResult<Value> {
        let Value::Object(map) = input else {
            return Err(HydrationError::mismatch("object", input.type_name()));
        };

        let ancestors = [input.clone()];
        let shape = self.shape.borrow();
        let mut fields = Vec::with_capacity(shape.len());
        for (name, schema) in shape.iter() {
            let raw = map.borrow().get(name).cloned().unwrap_or(Value::Undefined);
            let hydrated = hydrate(&raw, schema, Some(name.as_str()), &ancestors)?;
            fields.push((name.clone(), hydrated));
        }

        Ok(Value::Entity(Rc::new(RefCell::new(Instance {
            ty: self.handle(),
            fields,
        }))))
    }

    /// Constructs an instance by deep-copying `source` without re-validating.
    ///
    /// The clone is registered in `visited` before any field is copied, so
    /// a field chain that leads back to `source` resolves to the clone
    /// itself rather than recursing forever.
    pub(crate) fn from_source(
        &self,
        source: &Rc<RefCell<Instance>>,
        visited: &mut VisitedMap,
    ) -> Value {
        let shape = self.shape.borrow();
        let clone = Rc::new(RefCell::new(Instance {
            ty: self.handle(),
            fields: Vec::with_capacity(shape.len()),
        }));
        visited.insert(Rc::as_ptr(source) as usize, Value::Entity(Rc::clone(&clone)));

        for (name, _) in shape.iter() {
            let raw = source
                .borrow()
                .get(name)
                .cloned()
                .unwrap_or(Value::Undefined);
            let copied = clone_value(&raw, visited);
            clone.borrow_mut().fields.push((name.clone(), copied));
        }

        Value::Entity(clone)
    }
}

/// A concrete instance of an [`EntityType`].
///
/// After construction, every field declared in the type's shape is present
/// (optional fields that failed hold their default, or `Undefined`).
#[derive(Debug)]
pub struct Instance {
    ty: Rc<EntityType>,
    fields: Vec<(String, Value)>,
}

impl Instance {
    /// The type this instance was constructed from.
    pub fn entity_type(&self) -> &Rc<EntityType> {
        &self.ty
    }

    /// Reads a field by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, v)| v)
    }

    /// Overwrites a field in place.
    ///
    /// The engine never mutates instances after construction; this exists
    /// so callers can link hydrated instances into shared or cyclic graphs.
    pub fn set(&mut self, field: &str, value: Value) {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((field.to_string(), value)),
        }
    }

    /// Iterates fields in shape-declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Structural equality: same type name, equal fields. Identity-insensitive.
impl PartialEq for Instance {
    fn eq(&self, other: &Instance) -> bool {
        self.ty.name == other.ty.name && self.fields == other.fields
    }
}

/// Name-to-type table used when parsing wire-format entity references.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: HashMap<String, Rc<EntityType>>,
}

impl EntityRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type under its name, replacing any previous entry.
    pub fn register(&mut self, ty: &Rc<EntityType>) {
        self.entities.insert(ty.name().to_string(), Rc::clone(ty));
    }

    /// Looks up a type by name.
    pub fn get(&self, name: &str) -> Option<&Rc<EntityType>> {
        self.entities.get(name)
    }
}
