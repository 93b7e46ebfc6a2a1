//! `Value`: the data model shared by records, patterns and host variables
//!
//! Records arrive as parsed YAML: scalars, null, lists and nested mappings.
//! `Value` is the tagged form of that data. Mappings keep insertion order so
//! that inventory variables and group declarations come out in the order
//! they were written.
//!
//! # Scalars as text
//!
//! Matching is textual: a string, bool or number is compared through its
//! canonical text (see [`Value::scalar_text`]). Lists and mappings have no
//! text and never equal a string pattern.

use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::borrow::Cow;
use std::fmt;

/// Ordered mapping from string keys to values.
pub type Map = IndexMap<String, Value>;

/// A node of record data.
///
/// # Example
///
/// ```
/// use yamlist::Value;
///
/// let host: Value = serde_yaml::from_str("name: web01\nport: 22").unwrap();
/// assert_eq!(host.get("name").and_then(Value::as_str), Some("web01"));
/// assert_eq!(host.get("port").and_then(Value::scalar_text).as_deref(), Some("22"));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Explicit null (`~`, `null` or an empty YAML value).
    #[default]
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// Floating point scalar.
    Float(f64),
    /// String scalar.
    String(String),
    /// Ordered list.
    List(Vec<Value>),
    /// Ordered mapping.
    Map(Map),
}

impl Value {
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_map_mut(&mut self) -> Option<&mut Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a direct key of a mapping. Returns `None` for non-mappings.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Normalize to a slice of values: a list yields its items, anything
    /// else yields itself as a one-element slice.
    ///
    /// ```
    /// use yamlist::Value;
    ///
    /// let one = Value::from("a");
    /// assert_eq!(one.as_values().len(), 1);
    ///
    /// let many = Value::List(vec!["a".into(), "b".into()]);
    /// assert_eq!(many.as_values().len(), 2);
    /// ```
    #[must_use]
    pub fn as_values(&self) -> &[Value] {
        match self {
            Self::List(items) => items.as_slice(),
            other => std::slice::from_ref(other),
        }
    }

    /// Canonical text of a scalar, `None` for null, lists and mappings.
    ///
    /// ```
    /// use yamlist::Value;
    ///
    /// assert_eq!(Value::from(true).scalar_text().as_deref(), Some("true"));
    /// assert_eq!(Value::from(42_i64).scalar_text().as_deref(), Some("42"));
    /// assert_eq!(Value::Float(6.0).scalar_text().as_deref(), Some("6.0"));
    /// assert_eq!(Value::Null.scalar_text(), None);
    /// ```
    #[must_use]
    pub fn scalar_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::String(s) => Some(Cow::Borrowed(s.as_str())),
            Self::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            Self::Int(i) => Some(Cow::Owned(i.to_string())),
            // `Debug` keeps the `.0` of whole floats, as YAML and JSON write them.
            Self::Float(x) => Some(Cow::Owned(format!("{x:?}"))),
            Self::Null | Self::List(_) | Self::Map(_) => None,
        }
    }

    /// Returns `true` for bool `true` and for the YAML 1.1 truthy strings
    /// (`yes`, `y`, `true`, `on`, case-insensitive).
    ///
    /// Data files written for YAML 1.1 loaders spell booleans as `yes`;
    /// a YAML 1.2 parser reads those as strings.
    #[must_use]
    pub fn is_truthy_flag(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::String(s) => {
                matches!(s.to_ascii_lowercase().as_str(), "yes" | "y" | "true" | "on")
            }
            _ => false,
        }
    }

    /// Short name of the variant, used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "mapping",
        }
    }

    /// Convert into a `serde_json::Value` (non-finite floats become null).
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Float(x) => serde_json::Number::from_f64(*x)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Self::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

/// Parse a boolean flag the way the data-file tooling accepts it on the
/// command line: `true/1/yes/y` and `false/0/no/n`, case-insensitive.
#[must_use]
pub fn parse_bool_flag(input: &str) -> Option<bool> {
    match input.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::List(_) | Self::Map(_) => write!(f, "{}", self.to_json()),
            scalar => match scalar.scalar_text() {
                Some(text) => f.write_str(&text),
                None => Ok(()),
            },
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Self::Map(map)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Serde
// ═══════════════════════════════════════════════════════════════════════════════

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::String(s) => serializer.serialize_str(s),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a YAML or JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<Value, E> {
        Ok(Value::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, i: i64) -> Result<Value, E> {
        Ok(Value::Int(i))
    }

    fn visit_u64<E: de::Error>(self, u: u64) -> Result<Value, E> {
        // Values beyond i64 keep their magnitude as a float.
        Ok(i64::try_from(u).map_or(Value::Float(u as f64), Value::Int))
    }

    fn visit_f64<E: de::Error>(self, x: f64) -> Result<Value, E> {
        Ok(Value::Float(x))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Value, E> {
        Ok(Value::String(s.to_string()))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<Value, E> {
        Ok(Value::String(s))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let mut map = Map::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(key) = access.next_key::<Value>()? {
            let key = match key.scalar_text() {
                Some(text) => text.into_owned(),
                None if key.is_null() => "null".to_string(),
                None => {
                    return Err(de::Error::custom(format!(
                        "mapping keys must be scalars, found a {}",
                        key.type_name()
                    )))
                }
            };
            let value = access.next_value()?;
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }
}
