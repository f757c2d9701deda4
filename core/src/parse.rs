//! Wire-format schema declarations.
//!
//! Schemas can be declared as plain JSON and parsed into [`Schema`] nodes:
//! shorthand string tokens (`"number"`, `"User"`), array/object shapes with
//! `children` or a `schema` field table, and the optionality envelope
//! (`"required": false`, `"default"`). Transformers are procedural and have
//! no wire form.
//!
//! Entity shapes can also be declared in JSON via [`parse_entities`];
//! declaration is two-phase (names first, then shapes) so mutually
//! recursive entity references work.

use std::rc::Rc;

use serde_json::Value as Json;
use thiserror::Error;

use crate::entity::{EntityRegistry, EntityType};
use crate::schema::{Primitive, Schema};
use crate::value::Value;

/// Errors found while parsing a schema declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaParseError {
    /// A string token is neither a primitive name nor a registered entity.
    #[error("unknown schema token '{0}'")]
    UnknownToken(String),
    /// A declaration object has no `type` field.
    #[error("schema declaration is missing its 'type' field")]
    MissingTypeTag,
    /// The `type` field is not a string token.
    #[error("'type' must be a string token")]
    InvalidTypeTag,
    /// An array declaration has no `children` schema.
    #[error("array schema requires a 'children' declaration")]
    MissingChildren,
    /// An object declaration has neither a `schema` table nor `children`.
    #[error("object schema requires either a 'schema' table or 'children'")]
    MissingObjectBody,
    /// The declaration is neither a string token nor an object.
    #[error("schema declaration must be a string token or an object, found {0}")]
    InvalidDeclaration(&'static str),
    /// An entity table entry is not an object of field declarations.
    #[error("entity '{0}' must be declared as an object of field schemas")]
    InvalidEntityShape(String),
}

/// Convenience alias for results with [`SchemaParseError`].
pub type ParseResult<T> = std::result::Result<T, SchemaParseError>;

/// Parses one schema declaration.
///
/// `registry` supplies the entity types that bare entity-reference tokens
/// resolve against.
///
/// # Examples
///
/// ```
/// use hydrator_core::{EntityRegistry, parse_schema};
/// use serde_json::json;
///
/// let registry = EntityRegistry::new();
/// let decl = json!({
///     "type": "array",
///     "children": { "type": "number", "required": false, "default": 0 },
///     "skipInvalid": true,
/// });
/// let schema = parse_schema(&decl, &registry).unwrap();
/// assert!(schema.required);
/// ```
pub fn parse_schema(decl: &Json, registry: &EntityRegistry) -> ParseResult<Schema> {
    match decl {
        Json::String(token) => parse_token(token, registry),
        Json::Object(map) => {
            let token = map
                .get("type")
                .ok_or(SchemaParseError::MissingTypeTag)?
                .as_str()
                .ok_or(SchemaParseError::InvalidTypeTag)?;

            let mut schema = match token {
                "array" => {
                    let children = map
                        .get("children")
                        .ok_or(SchemaParseError::MissingChildren)?;
                    let mut schema = Schema::array(parse_schema(children, registry)?);
                    if map.get("skipInvalid").and_then(Json::as_bool) == Some(true) {
                        schema = schema.skip_invalid();
                    }
                    schema
                }
                "object" => {
                    if let Some(table) = map.get("schema") {
                        let Json::Object(table) = table else {
                            return Err(SchemaParseError::MissingObjectBody);
                        };
                        let fields = table
                            .iter()
                            .map(|(name, decl)| {
                                Ok((name.clone(), parse_schema(decl, registry)?))
                            })
                            .collect::<ParseResult<Vec<_>>>()?;
                        Schema::object(fields)
                    } else if let Some(children) = map.get("children") {
                        Schema::map(parse_schema(children, registry)?)
                    } else {
                        return Err(SchemaParseError::MissingObjectBody);
                    }
                }
                token => parse_token(token, registry)?,
            };

            if map.get("required").and_then(Json::as_bool) == Some(false) {
                schema.required = false;
            }
            if let Some(default) = map.get("default") {
                schema.default = Some(Value::from(default.clone()));
            }
            Ok(schema)
        }
        other => Err(SchemaParseError::InvalidDeclaration(json_kind(other))),
    }
}

/// Parses a table of entity declarations (`{name: {field: schema, ...}}`),
/// registering every declared type.
///
/// All names are declared before any shape is parsed, so entity shapes may
/// reference each other (or themselves) freely.
pub fn parse_entities(
    decls: &Json,
    registry: &mut EntityRegistry,
) -> ParseResult<Vec<Rc<EntityType>>> {
    let Json::Object(map) = decls else {
        return Err(SchemaParseError::InvalidDeclaration(json_kind(decls)));
    };

    let declared: Vec<Rc<EntityType>> = map
        .keys()
        .map(|name| {
            let ty = EntityType::declare(name);
            registry.register(&ty);
            ty
        })
        .collect();

    for (ty, (name, body)) in declared.iter().zip(map.iter()) {
        let Json::Object(fields) = body else {
            return Err(SchemaParseError::InvalidEntityShape(name.clone()));
        };
        let shape = fields
            .iter()
            .map(|(field, decl)| Ok((field.clone(), parse_schema(decl, registry)?)))
            .collect::<ParseResult<Vec<_>>>()?;
        ty.define(shape);
    }

    Ok(declared)
}

fn parse_token(token: &str, registry: &EntityRegistry) -> ParseResult<Schema> {
    if let Some(primitive) = Primitive::from_token(token) {
        return Ok(Schema::primitive(primitive));
    }
    match registry.get(token) {
        Some(ty) => Ok(Schema::entity(ty)),
        None => Err(SchemaParseError::UnknownToken(token.to_string())),
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrate::hydrate_root;
    use crate::schema::SchemaKind;
    use serde_json::json;

    #[test]
    fn test_shorthand_token_parses_primitive() {
        let registry = EntityRegistry::new();
        let schema = parse_schema(&json!("number"), &registry).unwrap();
        assert!(matches!(
            schema.kind,
            SchemaKind::Primitive(Primitive::Number)
        ));
        assert!(schema.required);
    }

    #[test]
    fn test_unknown_token_is_rejected() {
        let registry = EntityRegistry::new();
        let err = parse_schema(&json!("float"), &registry).unwrap_err();
        assert_eq!(err, SchemaParseError::UnknownToken("float".to_string()));
    }

    #[test]
    fn test_optional_with_default() {
        let registry = EntityRegistry::new();
        let decl = json!({ "type": "number", "required": false, "default": 7 });
        let schema = parse_schema(&decl, &registry).unwrap();

        assert!(!schema.required);
        assert_eq!(schema.default, Some(Value::from(7)));
    }

    #[test]
    fn test_fixed_key_object_declaration() {
        let registry = EntityRegistry::new();
        let decl = json!({
            "type": "object",
            "schema": { "x": "number", "y": { "type": "string", "required": false } },
        });
        let schema = parse_schema(&decl, &registry).unwrap();

        let input = Value::from(json!({ "x": 1 }));
        let out = hydrate_root(&input, &schema).unwrap();
        let obj = out.as_object().unwrap().borrow();
        assert_eq!(obj.get("x"), Some(&Value::from(1)));
        assert_eq!(obj.get("y"), Some(&Value::Undefined));
    }

    #[test]
    fn test_dynamic_map_declaration() {
        let registry = EntityRegistry::new();
        let decl = json!({ "type": "object", "children": "string" });
        let schema = parse_schema(&decl, &registry).unwrap();
        assert!(matches!(schema.kind, SchemaKind::Map { .. }));
    }

    #[test]
    fn test_object_without_body_is_rejected() {
        let registry = EntityRegistry::new();
        let err = parse_schema(&json!({ "type": "object" }), &registry).unwrap_err();
        assert_eq!(err, SchemaParseError::MissingObjectBody);
    }

    #[test]
    fn test_array_requires_children() {
        let registry = EntityRegistry::new();
        let err = parse_schema(&json!({ "type": "array" }), &registry).unwrap_err();
        assert_eq!(err, SchemaParseError::MissingChildren);
    }

    #[test]
    fn test_entity_reference_token() {
        let mut registry = EntityRegistry::new();
        parse_entities(&json!({ "User": { "name": "string" } }), &mut registry).unwrap();

        let schema = parse_schema(&json!("User"), &registry).unwrap();
        assert!(matches!(schema.kind, SchemaKind::Entity(_)));
    }

    #[test]
    fn test_mutually_recursive_entity_declarations() {
        let mut registry = EntityRegistry::new();
        let decls = json!({
            "Author": {
                "name": "string",
                "books": { "type": "array", "children": "Book", "required": false },
            },
            "Book": {
                "title": "string",
                "author": { "type": "Author", "required": false },
            },
        });
        parse_entities(&decls, &mut registry).unwrap();

        let book = registry.get("Book").unwrap();
        let input = Value::from(json!({
            "title": "Dust",
            "author": { "name": "ada" },
        }));
        let hydrated = book.hydrate(&input).unwrap();
        let instance = hydrated.as_entity().unwrap().borrow();
        assert!(instance.get("author").unwrap().as_entity().is_some());
    }
}
