//! core::value
//!
//! The tagged tree used for both the default schema and the live config.
//!
//! # Types
//!
//! - [`Primitive`] - A leaf value: string, number, or boolean
//! - [`Node`] - Leaf, array, or insertion-ordered map of nodes
//! - [`Kind`] - The runtime kind of a node, used for write validation
//! - [`DefaultTree`] - A validated, immutable default tree
//!
//! # String Storage
//!
//! The backing store only holds strings. [`Primitive::to_store_string`]
//! produces the canonical form that is written, and [`Primitive::coerce`]
//! turns a stored string back into a primitive of the same kind as a
//! default leaf.
//!
//! # Example
//!
//! ```
//! use persisted_config::core::value::{DefaultTree, Node, Primitive};
//! use serde_json::json;
//!
//! let defaults = DefaultTree::from_json(json!({
//!     "ui": { "theme": "dark", "fontSize": 14 }
//! })).unwrap();
//!
//! let font = Primitive::from(14.0);
//! assert_eq!(font.to_store_string(), "14");
//! assert_eq!(Primitive::coerce("16", &font), Primitive::Number(16.0));
//! assert!(matches!(defaults.root(), Node::Map(_)));
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use super::errors::ConfigError;

/// Runtime kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    String,
    Number,
    Boolean,
    Map,
    Array,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::String => "string",
            Kind::Number => "number",
            Kind::Boolean => "boolean",
            Kind::Map => "map",
            Kind::Array => "array",
        };
        f.write_str(name)
    }
}

/// A primitive leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    String(String),
    Number(f64),
    Bool(bool),
}

impl Primitive {
    /// The kind of this primitive.
    pub fn kind(&self) -> Kind {
        match self {
            Primitive::String(_) => Kind::String,
            Primitive::Number(_) => Kind::Number,
            Primitive::Bool(_) => Kind::Boolean,
        }
    }

    /// Canonical string form written to the store.
    ///
    /// Integral numbers have no fractional part (`14`, not `14.0`),
    /// non-finite numbers are `NaN`, `Infinity`, `-Infinity`, and
    /// negative zero is written as `0`. Magnitudes from `1e21` up, or below
    /// `1e-6`, use exponent notation with a signed exponent (`1e+21`).
    pub fn to_store_string(&self) -> String {
        match self {
            Primitive::String(s) => s.clone(),
            Primitive::Number(n) => format_number(*n),
            Primitive::Bool(b) => b.to_string(),
        }
    }

    /// Coerce a stored string to the kind of `like`.
    ///
    /// - number: parsed leniently; blank is `0`, garbage is `NaN`, and
    ///   `0x`/`0o`/`0b` prefixes select a radix
    /// - boolean: exactly `"true"` is `true`, anything else is `false`
    /// - string: passed through unchanged
    pub fn coerce(raw: &str, like: &Primitive) -> Primitive {
        match like {
            Primitive::Number(_) => Primitive::Number(parse_number(raw)),
            Primitive::Bool(_) => Primitive::Bool(raw == "true"),
            Primitive::String(_) => Primitive::String(raw.to_string()),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // Exponent always signed: 1e+21, 1.5e-7
        let formatted = format!("{:e}", n);
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => formatted,
        }
    } else {
        n.to_string()
    }
}

fn parse_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if let Some(value) = parse_prefixed_integer(trimmed) {
        return value;
    }
    match trimmed {
        "" => 0.0,
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        // Rust also accepts "inf" and "nan" spellings; stored data never uses them.
        _ if trimmed
            .chars()
            .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') =>
        {
            f64::NAN
        }
        _ => trimmed.parse().unwrap_or(f64::NAN),
    }
}

/// Unsigned `0x`, `0o` and `0b` integers. `None` when there is no prefix.
fn parse_prefixed_integer(raw: &str) -> Option<f64> {
    let radix = match raw.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let digits = &raw[2..];
    if digits.is_empty() {
        return Some(f64::NAN);
    }
    let value = digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix)
            .map(|digit| acc * f64::from(radix) + f64::from(digit))
    });
    Some(value.unwrap_or(f64::NAN))
}

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Primitive::String(value.to_string())
    }
}

impl From<String> for Primitive {
    fn from(value: String) -> Self {
        Primitive::String(value)
    }
}

impl From<f64> for Primitive {
    fn from(value: f64) -> Self {
        Primitive::Number(value)
    }
}

impl From<i32> for Primitive {
    fn from(value: i32) -> Self {
        Primitive::Number(f64::from(value))
    }
}

impl From<i64> for Primitive {
    fn from(value: i64) -> Self {
        Primitive::Number(value as f64)
    }
}

impl From<u32> for Primitive {
    fn from(value: u32) -> Self {
        Primitive::Number(f64::from(value))
    }
}

impl From<bool> for Primitive {
    fn from(value: bool) -> Self {
        Primitive::Bool(value)
    }
}

impl Serialize for Primitive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Primitive::String(s) => serializer.serialize_str(s),
            Primitive::Number(n) => serializer.serialize_f64(*n),
            Primitive::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

/// A node in a config tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf(Primitive),
    Array(Vec<Node>),
    Map(IndexMap<String, Node>),
}

impl Node {
    /// An empty map node.
    pub fn empty_map() -> Self {
        Node::Map(IndexMap::new())
    }

    /// The kind of this node.
    pub fn kind(&self) -> Kind {
        match self {
            Node::Leaf(p) => p.kind(),
            Node::Array(_) => Kind::Array,
            Node::Map(_) => Kind::Map,
        }
    }

    /// Whether this node is an array or a map.
    pub fn is_container(&self) -> bool {
        !matches!(self, Node::Leaf(_))
    }

    /// An empty container shaped like this node.
    ///
    /// Arrays produce an empty array; everything else an empty map.
    pub fn empty_like(&self) -> Self {
        match self {
            Node::Array(_) => Node::Array(Vec::new()),
            _ => Node::empty_map(),
        }
    }

    pub fn as_primitive(&self) -> Option<&Primitive> {
        match self {
            Node::Leaf(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Leaf(Primitive::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Leaf(Primitive::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Leaf(Primitive::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Node::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Convert a JSON value into a node.
    ///
    /// Object key order is preserved. `null` has no primitive kind and is
    /// rejected.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ConfigError> {
        use serde_json::Value;

        match value {
            Value::Null => Err(ConfigError::InvalidDefault(
                "null has no primitive kind".into(),
            )),
            Value::Bool(b) => Ok(Node::Leaf(Primitive::Bool(b))),
            Value::Number(n) => n
                .as_f64()
                .map(|n| Node::Leaf(Primitive::Number(n)))
                .ok_or_else(|| ConfigError::InvalidDefault(format!("unrepresentable number {n}"))),
            Value::String(s) => Ok(Node::Leaf(Primitive::String(s))),
            Value::Array(items) => items
                .into_iter()
                .map(Node::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Node::Array),
            Value::Object(entries) => entries
                .into_iter()
                .map(|(k, v)| Node::from_json(v).map(|node| (k, node)))
                .collect::<Result<IndexMap<_, _>, _>>()
                .map(Node::Map),
        }
    }

    /// Convert this node into a JSON value.
    ///
    /// Non-finite numbers have no JSON form and become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            Node::Leaf(Primitive::String(s)) => Value::String(s.clone()),
            Node::Leaf(Primitive::Number(n)) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Node::Leaf(Primitive::Bool(b)) => Value::Bool(*b),
            Node::Array(items) => Value::Array(items.iter().map(Node::to_json).collect()),
            Node::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

macro_rules! leaf_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Node {
                fn from(value: $ty) -> Self {
                    Node::Leaf(Primitive::from(value))
                }
            }
        )*
    };
}

leaf_from!(&str, String, f64, i32, i64, u32, bool);

impl From<Primitive> for Node {
    fn from(value: Primitive) -> Self {
        Node::Leaf(value)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::Array(items)
    }
}

impl From<IndexMap<String, Node>> for Node {
    fn from(entries: IndexMap<String, Node>) -> Self {
        Node::Map(entries)
    }
}

impl TryFrom<serde_json::Value> for Node {
    type Error = ConfigError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        Node::from_json(value)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Leaf(p) => p.serialize(serializer),
            Node::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

/// A validated default tree.
///
/// The root is a container and every map key is a non-empty string without
/// a `.`, so each leaf has exactly one dot path.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultTree(Node);

impl DefaultTree {
    /// Validate `root` as a default tree.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidDefault` if the root is a leaf or a map
    /// key is empty or contains `.`.
    pub fn new(root: Node) -> Result<Self, ConfigError> {
        if !root.is_container() {
            return Err(ConfigError::InvalidDefault(
                "root must be a map or an array".into(),
            ));
        }
        validate_keys(&root, "")?;
        Ok(Self(root))
    }

    /// Build a default tree from JSON.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ConfigError> {
        Self::new(Node::from_json(value)?)
    }

    pub fn root(&self) -> &Node {
        &self.0
    }
}

fn validate_keys(node: &Node, prefix: &str) -> Result<(), ConfigError> {
    match node {
        Node::Leaf(_) => Ok(()),
        Node::Array(items) => items.iter().enumerate().try_for_each(|(i, item)| {
            validate_keys(item, &super::path::join(prefix, &i.to_string()))
        }),
        Node::Map(entries) => entries.iter().try_for_each(|(key, child)| {
            if key.is_empty() || key.contains('.') {
                return Err(ConfigError::InvalidDefault(format!(
                    "key '{}' under '{}' cannot be addressed by a dot path",
                    key, prefix
                )));
            }
            validate_keys(child, &super::path::join(prefix, key))
        }),
    }
}
