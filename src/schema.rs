use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Name of the built-in string primitive.
pub const STRING: &str = "string";

/// Name of the built-in number primitive.
pub const NUMBER: &str = "number";

/// Name of the built-in boolean primitive.
pub const BOOLEAN: &str = "boolean";

static NEXT_SCHEMA_ID: AtomicU64 = AtomicU64::new(1);

/// A single allowed value of a [`SchemaNode::Literal`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Literal {
    String(String),
    Integer(i64),
    Boolean(bool),
    Null,
}

impl Literal {
    /// Converts a JSON value into a literal, if it has a literal form.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Literal::String(s.clone())),
            Value::Number(n) => n.as_i64().map(Literal::Integer),
            Value::Bool(b) => Some(Literal::Boolean(*b)),
            Value::Null => Some(Literal::Null),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Literal::String(s) => Value::String(s.clone()),
            Literal::Integer(n) => Value::from(*n),
            Literal::Boolean(b) => Value::Bool(*b),
            Literal::Null => Value::Null,
        }
    }

    /// Returns whether `value` is this literal. Integers match numerically, so
    /// `12.0` is the literal `12`.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Literal::String(a), Value::String(b)) => a == b,
            (Literal::Integer(a), Value::Number(b)) => {
                if let Some(b) = b.as_i64() {
                    *a == b
                } else if b.is_f64() {
                    b.as_f64().map_or(false, |b| integral_f64_is(b, *a))
                } else {
                    false
                }
            }
            (Literal::Boolean(a), Value::Bool(b)) => a == b,
            (Literal::Null, Value::Null) => true,
            _ => false,
        }
    }
}

/// Whether `f` is exactly the integer `n`. Floats at or past the `i64` bounds
/// never are, even where `as` would saturate onto `i64::MAX`.
fn integral_f64_is(f: f64, n: i64) -> bool {
    const BOUND: f64 = 9_223_372_036_854_775_808.0;

    f.fract() == 0.0 && (-BOUND..BOUND).contains(&f) && f as i64 == n
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_owned())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Literal::Integer(n)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Boolean(b)
    }
}

/// The shape of a value. A node describes structure only; behaviors come from
/// interpreting it against a capability implementation.
#[derive(Debug, PartialEq)]
pub enum SchemaNode {
    Primitive(String),
    Literal(Vec<Literal>),
    Struct(Vec<(String, Schema)>),
    Union(Vec<Schema>),
    Intersection(Vec<Schema>),
    Array(Schema),
}

/// Shared, immutable handle to a [`SchemaNode`].
///
/// Every constructed schema gets a process-unique id. Clones keep the id, which
/// is what interpretation caches are keyed on.
#[derive(Clone)]
pub struct Schema {
    id: u64,
    node: Arc<SchemaNode>,
}

impl Schema {
    pub fn new(node: SchemaNode) -> Self {
        Self {
            id: NEXT_SCHEMA_ID.fetch_add(1, Ordering::Relaxed),
            node: Arc::new(node),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn node(&self) -> &SchemaNode {
        &self.node
    }

    /// A handle that does not keep the node alive.
    pub(crate) fn downgrade(&self) -> Weak<SchemaNode> {
        Arc::downgrade(&self.node)
    }

    /// Every primitive name reachable from this schema.
    pub fn primitive_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_primitive_names(&mut names);
        names
    }

    fn collect_primitive_names(&self, names: &mut BTreeSet<String>) {
        match self.node() {
            SchemaNode::Primitive(name) => {
                names.insert(name.clone());
            }
            SchemaNode::Literal(_) => {}
            SchemaNode::Struct(fields) => {
                for (_, schema) in fields {
                    schema.collect_primitive_names(names);
                }
            }
            SchemaNode::Union(schemas) | SchemaNode::Intersection(schemas) => {
                for schema in schemas {
                    schema.collect_primitive_names(names);
                }
            }
            SchemaNode::Array(element) => element.collect_primitive_names(names),
        }
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node) || self.node == other.node
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.node.fmt(f)
    }
}

pub fn primitive(name: impl Into<String>) -> Schema {
    Schema::new(SchemaNode::Primitive(name.into()))
}

pub fn string() -> Schema {
    primitive(STRING)
}

pub fn number() -> Schema {
    primitive(NUMBER)
}

pub fn boolean() -> Schema {
    primitive(BOOLEAN)
}

/// A schema matching exactly one of `values`.
///
/// ```
/// use schemable::schema::literal;
///
/// let color = literal(["white", "black", "green"]);
/// ```
pub fn literal<I, L>(values: I) -> Schema
where
    I: IntoIterator<Item = L>,
    L: Into<Literal>,
{
    Schema::new(SchemaNode::Literal(
        values.into_iter().map(Into::into).collect(),
    ))
}

/// An object with the given fields, kept in the order given.
pub fn structure<I, K>(fields: I) -> Schema
where
    I: IntoIterator<Item = (K, Schema)>,
    K: Into<String>,
{
    Schema::new(SchemaNode::Struct(
        fields
            .into_iter()
            .map(|(name, schema)| (name.into(), schema))
            .collect(),
    ))
}

pub fn union(alternatives: impl IntoIterator<Item = Schema>) -> Schema {
    Schema::new(SchemaNode::Union(alternatives.into_iter().collect()))
}

pub fn intersection(parts: impl IntoIterator<Item = Schema>) -> Schema {
    Schema::new(SchemaNode::Intersection(parts.into_iter().collect()))
}

pub fn array(element: Schema) -> Schema {
    Schema::new(SchemaNode::Array(element))
}
