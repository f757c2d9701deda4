//! The hydration engine: recursive interpretation of a value against a
//! resolved schema node.
//!
//! Each frame resolves its node, interprets the input against it, and on
//! failure either absorbs (optional node: default-or-undefined) or
//! annotates the failure with its path segment and propagates. Matched
//! primitives pass through unchanged; there is no coercion.

use tracing::{debug, trace};

use crate::error::{FailureCause, HydrationError, HydrationResult};
use crate::resolve::resolve;
use crate::schema::{Primitive, Schema, SchemaKind};
use crate::value::{Fields, Value};

/// Hydrates `input` against `schema` as the root of a value tree.
///
/// # Examples
///
/// ```
/// use hydrator_core::{Schema, Value, hydrate_root};
///
/// let schema = Schema::object([
///     ("a", Schema::object([("b", Schema::number())])),
/// ]);
/// let input = Value::object([("a", Value::object([("b", Value::from("x"))]))]);
///
/// let err = hydrate_root(&input, &schema).unwrap_err();
/// assert_eq!(err.path(), Some("a.b"));
/// ```
pub fn hydrate_root(input: &Value, schema: &Schema) -> HydrationResult<Value> {
    debug!(input = input.type_name(), "hydrating root value");
    hydrate(input, schema, None, &[])
}

/// Hydrates one value within a larger tree.
///
/// `segment` is the path component this frame contributes to failure
/// records (a field name or `[index]`); `ancestors` is the chain of
/// enclosing raw inputs, innermost first, made visible to transformers.
pub fn hydrate(
    input: &Value,
    schema: &Schema,
    segment: Option<&str>,
    ancestors: &[Value],
) -> HydrationResult<Value> {
    trace!(segment, input = input.type_name(), "hydrating value");
    let resolved = resolve(schema, input, ancestors);

    match interpret(input, &resolved, ancestors) {
        Ok(value) => Ok(value),
        Err(_) if !resolved.required => {
            // Optional nodes absorb failures entirely.
            Ok(resolved.default.clone().unwrap_or(Value::Undefined))
        }
        Err(err) => Err(match segment {
            Some(segment) => err.prefix_path(segment),
            None => err,
        }),
    }
}

fn interpret(input: &Value, node: &Schema, ancestors: &[Value]) -> HydrationResult<Value> {
    match &node.kind {
        SchemaKind::Primitive(primitive) => interpret_primitive(input, *primitive),
        SchemaKind::Struct { fields } => {
            let Value::Object(map) = input else {
                return Err(HydrationError::mismatch("object", input.type_name()));
            };

            let nested = extend(input, ancestors);
            let mut out = Fields::with_capacity(fields.len());
            for (key, child) in fields.iter() {
                let raw = map.borrow().get(key).cloned().unwrap_or(Value::Undefined);
                out.insert(key.as_str(), hydrate(&raw, child, Some(key.as_str()), &nested)?);
            }
            Ok(Value::from(out))
        }
        SchemaKind::Map { children } => {
            let Value::Object(map) = input else {
                return Err(HydrationError::mismatch("object", input.type_name()));
            };

            let nested = extend(input, ancestors);
            // Snapshot so no borrow is held across recursion.
            let entries: Vec<(String, Value)> = map
                .borrow()
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect();
            let mut out = Fields::with_capacity(entries.len());
            for (key, raw) in &entries {
                out.insert(key.as_str(), hydrate(raw, children, Some(key.as_str()), &nested)?);
            }
            Ok(Value::from(out))
        }
        SchemaKind::Array {
            children,
            skip_invalid,
        } => {
            let Value::Array(items) = input else {
                return Err(HydrationError::mismatch("array", input.type_name()));
            };

            let nested = extend(input, ancestors);
            let snapshot: Vec<Value> = items.borrow().clone();
            let mut out = Vec::with_capacity(snapshot.len());
            for (index, raw) in snapshot.iter().enumerate() {
                let segment = format!("[{index}]");
                match hydrate(raw, children, Some(segment.as_str()), &nested) {
                    Ok(value) => out.push(value),
                    Err(_) if *skip_invalid => continue,
                    Err(err) => return Err(err),
                }
            }
            Ok(Value::array(out))
        }
        SchemaKind::Entity(ty) => match input {
            Value::Object(_) => ty.from_input(input),
            _ => Err(HydrationError::mismatch("object", input.type_name())),
        },
        // `resolve` never returns a transformer node.
        SchemaKind::Transform(_) => unreachable!("transformers are resolved before interpretation"),
    }
}

fn interpret_primitive(input: &Value, primitive: Primitive) -> HydrationResult<Value> {
    let matched = match primitive {
        Primitive::Never => return Err(HydrationError::new(FailureCause::Never)),
        Primitive::Null => matches!(input, Value::Null),
        Primitive::Undefined => matches!(input, Value::Undefined),
        Primitive::Bool => matches!(input, Value::Bool(_)),
        Primitive::Number => matches!(input, Value::Number(_)),
        Primitive::BigInt => matches!(input, Value::BigInt(_)),
        Primitive::String => matches!(input, Value::String(_)),
        Primitive::Symbol => matches!(input, Value::Symbol(_)),
    };

    if matched {
        Ok(input.clone())
    } else {
        Err(HydrationError::mismatch(primitive.name(), input.type_name()))
    }
}

/// New ancestor chain for a nested frame: `[input, ...ancestors]`.
fn extend(input: &Value, ancestors: &[Value]) -> Vec<Value> {
    let mut nested = Vec::with_capacity(ancestors.len() + 1);
    nested.push(input.clone());
    nested.extend_from_slice(ancestors);
    nested
}
