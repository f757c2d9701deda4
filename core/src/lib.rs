//! Schema-directed hydration and identity-preserving cloning.
//!
//! Given an arbitrary untyped value tree (e.g. parsed JSON) and a
//! declarative schema, this crate recursively validates and materializes a
//! typed object graph, and can later deep-copy that graph while preserving
//! reference identity for shared and cyclic substructures.
//!
//! The pieces, bottom-up:
//!
//! - [`Value`] — the dynamic value model: primitive scalars plus
//!   `Rc`-shared arrays, objects, and entity instances.
//! - [`Schema`] — the declarative grammar: primitives, arrays (with a
//!   per-element failure policy), fixed-key and dynamically-keyed objects,
//!   entity references, and lazily resolved transformers.
//! - [`resolve`] — normalizes a node (invoking transformers) before
//!   interpretation.
//! - [`hydrate_root`] / [`hydrate`] — the engine: produces a typed value
//!   or a [`HydrationError`] carrying the dotted path of the first required
//!   failure. Optional nodes absorb failures (default-or-undefined).
//! - [`Value::deep_clone`] / [`clone_graph`] — structural-clone-style deep
//!   copy threaded through a [`VisitedMap`], so `ptr_eq` pairs stay
//!   `ptr_eq` and cycles terminate.
//! - [`EntityType`] / [`Instance`] — named types binding a fixed
//!   field-to-schema shape, constructed either from raw input (validated)
//!   or from a source instance (cloned, never re-validated).
//! - [`parse_schema`] / [`parse_entities`] — the JSON wire format for
//!   schema declarations.
//!
//! # Example
//!
//! ```
//! use hydrator_core::{EntityType, Schema, Value};
//!
//! let user = EntityType::new("User", [
//!     ("name", Schema::string()),
//!     ("tags", Schema::array(Schema::string()).skip_invalid()),
//!     ("age", Schema::number().default_value(0)),
//! ]);
//!
//! let input = Value::from(serde_json::json!({
//!     "name": "ada",
//!     "tags": ["admin", 3, "ops"],
//! }));
//!
//! let hydrated = user.hydrate(&input).unwrap();
//! let copy = hydrated.deep_clone();
//! assert_eq!(copy, hydrated);
//! assert!(!copy.ptr_eq(&hydrated));
//! ```

mod clone;
mod entity;
mod error;
mod hydrate;
mod parse;
mod resolve;
mod schema;
mod value;

pub use clone::{VisitedMap, clone_graph, clone_value};
pub use entity::{EntityRegistry, EntityType, Instance};
pub use error::{FailureCause, HydrationError, HydrationResult};
pub use hydrate::{hydrate, hydrate_root};
pub use parse::{ParseResult, SchemaParseError, parse_entities, parse_schema};
pub use resolve::resolve;
pub use schema::{Primitive, Schema, SchemaKind, TransformFn};
pub use value::{Fields, Value};
