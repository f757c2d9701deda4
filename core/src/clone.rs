//! Identity-preserving deep copy of hydrated value graphs.
//!
//! Two references that share identity in the source share identity in the
//! clone, and cyclic graphs clone into isomorphic cyclic graphs. Both
//! properties come from the same invariant: the clone container is
//! allocated and recorded in the visited map *before* its contents are
//! recursed into, so any edge leading back to an already-visited source
//! resolves to its clone instead of duplicating it or recursing forever.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::value::{Fields, Value};

/// Transient association from a source reference's identity to its clone.
///
/// Scoped to a single top-level clone invocation; never reused across
/// invocations.
#[derive(Debug, Default)]
pub struct VisitedMap {
    entries: HashMap<usize, Value>,
}

impl VisitedMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, addr: usize) -> Option<&Value> {
        self.entries.get(&addr)
    }

    pub(crate) fn insert(&mut self, addr: usize, clone: Value) {
        self.entries.insert(addr, clone);
    }
}

/// Deep-copies a value graph, preserving reference identity.
///
/// Equivalent to [`Value::deep_clone`] with a caller-supplied visited map;
/// a fresh map must be used per top-level invocation.
pub fn clone_graph(value: &Value) -> Value {
    debug!(input = value.type_name(), "cloning value graph");
    clone_value(value, &mut VisitedMap::new())
}

/// Deep-copies one value, threading the visited map through recursion.
///
/// Scalars are returned unchanged (they share identity trivially). A
/// reference already present in `visited` yields the previously produced
/// clone. Total over well-formed graphs; never re-validates.
pub fn clone_value(value: &Value, visited: &mut VisitedMap) -> Value {
    let Some(addr) = value.ref_addr() else {
        return value.clone();
    };
    if let Some(existing) = visited.get(addr) {
        return existing.clone();
    }

    match value {
        Value::Array(items) => {
            let items = items.borrow();
            let out = Rc::new(RefCell::new(Vec::with_capacity(items.len())));
            visited.insert(addr, Value::Array(Rc::clone(&out)));
            for item in items.iter() {
                let cloned = clone_value(item, visited);
                out.borrow_mut().push(cloned);
            }
            Value::Array(out)
        }
        Value::Object(fields) => {
            let fields = fields.borrow();
            let out = Rc::new(RefCell::new(Fields::with_capacity(fields.len())));
            visited.insert(addr, Value::Object(Rc::clone(&out)));
            for (key, item) in fields.iter() {
                let cloned = clone_value(item, visited);
                out.borrow_mut().insert(key, cloned);
            }
            Value::Object(out)
        }
        Value::Entity(instance) => {
            let ty = Rc::clone(instance.borrow().entity_type());
            ty.from_source(instance, visited)
        }
        // ref_addr() returned Some, so only reference variants reach here.
        _ => unreachable!("scalars have no reference identity"),
    }
}

impl Value {
    /// Deep-copies this value graph, preserving reference identity.
    ///
    /// # Examples
    ///
    /// ```
    /// use hydrator_core::Value;
    ///
    /// let shared = Value::array([Value::from(1)]);
    /// let graph = Value::object([("a", shared.clone()), ("b", shared)]);
    ///
    /// let copy = graph.deep_clone();
    /// let obj = copy.as_object().unwrap().borrow();
    /// assert!(!copy.ptr_eq(&graph));
    /// assert!(obj.get("a").unwrap().ptr_eq(obj.get("b").unwrap()));
    /// ```
    pub fn deep_clone(&self) -> Value {
        clone_graph(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityType;
    use crate::schema::Schema;

    #[test]
    fn test_scalars_pass_through() {
        assert_eq!(Value::from(1).deep_clone(), Value::from(1));
        assert_eq!(Value::Null.deep_clone(), Value::Null);
        assert_eq!(Value::Undefined.deep_clone(), Value::Undefined);

        let sym = Value::symbol("tag");
        // Symbols keep their token identity through a clone.
        assert_eq!(sym.deep_clone(), sym);
    }

    #[test]
    fn test_clone_is_deep_equal_but_not_same_reference() {
        let graph = Value::object([
            ("list", Value::array([Value::from(1), Value::from(2)])),
            ("name", Value::from("x")),
        ]);

        let copy = graph.deep_clone();
        assert_eq!(copy, graph);
        assert!(!copy.ptr_eq(&graph));

        let original_list = graph.as_object().unwrap().borrow().get("list").cloned();
        let copied_list = copy.as_object().unwrap().borrow().get("list").cloned();
        assert!(!original_list.unwrap().ptr_eq(&copied_list.unwrap()));
    }

    #[test]
    fn test_shared_references_stay_shared() {
        let shared = Value::object([("v", Value::from(1))]);
        let graph = Value::array([shared.clone(), shared.clone(), Value::from(3)]);

        let copy = graph.deep_clone();
        let items = copy.as_array().unwrap().borrow();
        assert!(items[0].ptr_eq(&items[1]));
        assert!(!items[0].ptr_eq(&shared));
    }

    #[test]
    fn test_cyclic_array_clones_isomorphically() {
        let cell = Value::array([Value::from(1)]);
        cell.as_array().unwrap().borrow_mut().push(cell.clone());

        let copy = cell.deep_clone();
        let items = copy.as_array().unwrap().borrow();
        assert_eq!(items[0], Value::from(1));
        assert!(items[1].ptr_eq(&copy));
        assert!(!items[1].ptr_eq(&cell));
    }

    #[test]
    fn test_mutually_referential_entities_clone() {
        let node = EntityType::declare("Node");
        node.define([
            ("id", Schema::number()),
            ("next", Schema::entity(&node).optional()),
        ]);

        let a = node
            .hydrate(&Value::object([("id", Value::from(1))]))
            .unwrap();
        let b = node
            .hydrate(&Value::object([("id", Value::from(2))]))
            .unwrap();
        a.as_entity().unwrap().borrow_mut().set("next", b.clone());
        b.as_entity().unwrap().borrow_mut().set("next", a.clone());

        let copy = a.deep_clone();
        let copy_instance = copy.as_entity().unwrap().borrow();
        let next = copy_instance.get("next").cloned().unwrap();
        let next_instance = next.as_entity().unwrap().borrow();
        assert_eq!(
            next_instance.get("id"),
            Some(&Value::from(2))
        );

        // Following the cycle comes back to the clone, not the original.
        let back = next_instance.get("next").cloned().unwrap();
        assert!(back.ptr_eq(&copy));
        assert!(!back.ptr_eq(&a));
    }

    #[test]
    fn test_entity_clone_does_not_revalidate() {
        let user = EntityType::new("User", [("age", Schema::number())]);
        let hydrated = user
            .hydrate(&Value::object([("age", Value::from(30))]))
            .unwrap();

        // Force an out-of-shape value in; cloning must copy it untouched.
        hydrated
            .as_entity()
            .unwrap()
            .borrow_mut()
            .set("age", Value::from("not a number"));

        let copy = hydrated.deep_clone();
        let instance = copy.as_entity().unwrap().borrow();
        assert_eq!(instance.get("age"), Some(&Value::from("not a number")));
    }
}
