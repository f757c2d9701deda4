//! Schema grammar: declarative descriptions of how to interpret one value.
//!
//! A [`Schema`] is a tagged node ([`SchemaKind`]) plus the optionality
//! envelope every node carries (`required`, `default`). Nodes are built
//! with the constructor methods ([`Schema::number`], [`Schema::array`],
//! [`Schema::object`], ...) and chained modifiers ([`Schema::optional`],
//! [`Schema::default_value`], [`Schema::skip_invalid`]).

use std::fmt;
use std::rc::Rc;

use crate::entity::EntityType;
use crate::value::Value;

/// Primitive type tags matched by runtime type equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// Matches booleans.
    Bool,
    /// Matches strings.
    String,
    /// Matches numbers.
    Number,
    /// Matches bigints.
    BigInt,
    /// Matches symbols.
    Symbol,
    /// Matches only the absent value.
    Undefined,
    /// Matches only the literal null.
    Null,
    /// Matches nothing; always fails.
    Never,
}

impl Primitive {
    /// The wire-format token for this primitive (also its `typeof` tag).
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Bool => "boolean",
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::BigInt => "bigint",
            Primitive::Symbol => "symbol",
            Primitive::Undefined => "undefined",
            Primitive::Null => "null",
            Primitive::Never => "never",
        }
    }

    /// Parses a wire-format token into a primitive tag.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "boolean" => Some(Primitive::Bool),
            "string" => Some(Primitive::String),
            "number" => Some(Primitive::Number),
            "bigint" => Some(Primitive::BigInt),
            "symbol" => Some(Primitive::Symbol),
            "undefined" => Some(Primitive::Undefined),
            "null" => Some(Primitive::Null),
            "never" => Some(Primitive::Never),
            _ => None,
        }
    }
}

/// Signature of a transformer: a pure function from the current value and
/// its ancestor chain (innermost first) to a resolved schema node.
pub type TransformFn = dyn Fn(&Value, &[Value]) -> Schema;

/// The tagged variants of the schema grammar.
#[derive(Clone)]
pub enum SchemaKind {
    /// Primitive match by runtime type tag.
    Primitive(Primitive),
    /// Ordered sequence; every element interpreted against `children`.
    Array {
        /// Schema applied to each element.
        children: Rc<Schema>,
        /// Drop failing elements instead of propagating their failure.
        skip_invalid: bool,
    },
    /// Closed key set; declaration order is hydration order.
    Struct {
        /// Declared fields, each with its own schema.
        fields: Rc<Vec<(String, Schema)>>,
    },
    /// Open, dynamically keyed map; `children` applies to every own key.
    Map {
        /// Schema applied to every entry value.
        children: Rc<Schema>,
    },
    /// Nested typed entity, constructed from the input object.
    Entity(Rc<EntityType>),
    /// Lazily resolved, context-dependent schema.
    Transform(Rc<TransformFn>),
}

/// A fully qualified schema node.
///
/// # Examples
///
/// ```
/// use hydrator_core::{Schema, Value, hydrate_root};
///
/// let schema = Schema::object([
///     ("name", Schema::string()),
///     ("score", Schema::number().default_value(0)),
/// ]);
///
/// let input = Value::object([("name", Value::from("ada"))]);
/// let hydrated = hydrate_root(&input, &schema).unwrap();
/// let obj = hydrated.as_object().unwrap().borrow();
/// assert_eq!(obj.get("score"), Some(&Value::from(0)));
/// ```
#[derive(Clone)]
pub struct Schema {
    /// What this node matches.
    pub kind: SchemaKind,
    /// Whether a failure propagates (`true`) or is absorbed (`false`).
    pub required: bool,
    /// Value substituted when an optional node's interpretation fails.
    pub default: Option<Value>,
}

impl Schema {
    fn of(kind: SchemaKind) -> Self {
        Self {
            kind,
            required: true,
            default: None,
        }
    }

    /// A schema for the given primitive tag.
    pub fn primitive(primitive: Primitive) -> Self {
        Self::of(SchemaKind::Primitive(primitive))
    }

    /// Matches booleans.
    pub fn boolean() -> Self {
        Self::primitive(Primitive::Bool)
    }

    /// Matches strings.
    pub fn string() -> Self {
        Self::primitive(Primitive::String)
    }

    /// Matches numbers.
    pub fn number() -> Self {
        Self::primitive(Primitive::Number)
    }

    /// Matches bigints.
    pub fn bigint() -> Self {
        Self::primitive(Primitive::BigInt)
    }

    /// Matches symbols.
    pub fn symbol() -> Self {
        Self::primitive(Primitive::Symbol)
    }

    /// Matches only the absent value.
    pub fn undefined() -> Self {
        Self::primitive(Primitive::Undefined)
    }

    /// Matches only the literal null.
    pub fn null() -> Self {
        Self::primitive(Primitive::Null)
    }

    /// Matches nothing; always fails.
    pub fn never() -> Self {
        Self::primitive(Primitive::Never)
    }

    /// An ordered sequence whose elements match `children`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hydrator_core::{Schema, Value, hydrate_root};
    ///
    /// let schema = Schema::array(Schema::number()).skip_invalid();
    /// let input = Value::array([Value::from(1), Value::from("a"), Value::from(2)]);
    /// let out = hydrate_root(&input, &schema).unwrap();
    /// assert_eq!(out, Value::array([Value::from(1), Value::from(2)]));
    /// ```
    pub fn array(children: Schema) -> Self {
        Self::of(SchemaKind::Array {
            children: Rc::new(children),
            skip_invalid: false,
        })
    }

    /// A closed key set: each declared field matched by its own schema.
    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Schema)>) -> Self {
        let fields = fields.into_iter().map(|(k, s)| (k.into(), s)).collect();
        Self::of(SchemaKind::Struct {
            fields: Rc::new(fields),
        })
    }

    /// An open map: every own key of the input matched by `children`.
    pub fn map(children: Schema) -> Self {
        Self::of(SchemaKind::Map {
            children: Rc::new(children),
        })
    }

    /// A nested typed entity.
    pub fn entity(ty: &Rc<EntityType>) -> Self {
        Self::of(SchemaKind::Entity(Rc::clone(ty)))
    }

    /// A transformer, resolved lazily at the point of use.
    ///
    /// # Examples
    ///
    /// ```
    /// use hydrator_core::{Schema, Value, hydrate_root};
    ///
    /// // Discriminate on a sibling field of the enclosing object.
    /// let schema = Schema::object([
    ///     ("kind", Schema::string()),
    ///     ("payload", Schema::transform(|_, ancestors| {
    ///         let parent = ancestors[0].as_object().unwrap().borrow();
    ///         match parent.get("kind").and_then(|k| k.as_str()) {
    ///             Some("text") => Schema::string(),
    ///             _ => Schema::number(),
    ///         }
    ///     })),
    /// ]);
    ///
    /// let input = Value::object([("kind", Value::from("text")), ("payload", Value::from("hi"))]);
    /// assert!(hydrate_root(&input, &schema).is_ok());
    /// ```
    pub fn transform(f: impl Fn(&Value, &[Value]) -> Schema + 'static) -> Self {
        Self::of(SchemaKind::Transform(Rc::new(f)))
    }

    /// Marks the node optional: failures are absorbed instead of propagated.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Marks the node optional with a substitute value for failures.
    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.required = false;
        self.default = Some(default.into());
        self
    }

    /// On an array node, drop failing elements instead of propagating.
    ///
    /// Has no effect on other node kinds.
    pub fn skip_invalid(mut self) -> Self {
        if let SchemaKind::Array { skip_invalid, .. } = &mut self.kind {
            *skip_invalid = true;
        }
        self
    }
}

impl fmt::Debug for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaKind::Primitive(p) => write!(f, "Primitive({})", p.name()),
            SchemaKind::Array {
                children,
                skip_invalid,
            } => f
                .debug_struct("Array")
                .field("children", children)
                .field("skip_invalid", skip_invalid)
                .finish(),
            SchemaKind::Struct { fields } => {
                f.debug_struct("Struct").field("fields", fields).finish()
            }
            SchemaKind::Map { children } => {
                f.debug_struct("Map").field("children", children).finish()
            }
            SchemaKind::Entity(ty) => write!(f, "Entity({})", ty.name()),
            SchemaKind::Transform(_) => write!(f, "Transform(..)"),
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("default", &self.default)
            .finish()
    }
}
