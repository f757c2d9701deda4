//! Schema resolution: normalizing a declared node before interpretation.
//!
//! The only node kind that needs work at this point is the transformer,
//! which is invoked with the current value and its ancestor chain. A
//! transformer may hand back another transformer; resolution simply loops,
//! so re-entrant chains of any depth are supported.

use std::rc::Rc;

use crate::schema::{Schema, SchemaKind};
use crate::value::Value;

/// Resolves `schema` against the value it is about to interpret.
///
/// Pure: neither `current` nor `ancestors` is mutated. Non-transformer
/// nodes pass through unchanged (children are `Rc`-shared, so the clone is
/// cheap).
///
/// Optionality declared on a transformer node itself survives resolution:
/// the produced node is optional if either side says so, and inherits the
/// transformer node's default when it carries none of its own.
///
/// # Examples
///
/// ```
/// use hydrator_core::{Schema, SchemaKind, Value, resolve};
///
/// let schema = Schema::transform(|value, _| match value {
///     Value::String(_) => Schema::string(),
///     _ => Schema::number(),
/// });
///
/// let resolved = resolve(&schema, &Value::from("hi"), &[]);
/// assert!(matches!(resolved.kind, SchemaKind::Primitive(_)));
/// ```
pub fn resolve(schema: &Schema, current: &Value, ancestors: &[Value]) -> Schema {
    let mut node = schema.clone();
    while let SchemaKind::Transform(transform) = node.kind.clone() {
        let produced = transform(current, ancestors);
        node = Schema {
            required: node.required && produced.required,
            default: produced.default.or(node.default),
            kind: produced.kind,
        };
    }
    node
}
