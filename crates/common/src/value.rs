//! The payload shape set traversed by the interceptor.
//!
//! Request and response payloads are modeled as a closed tagged union,
//! [`Value`]. The three map-shaped variants are deliberately distinct: how a
//! map was *constructed* decides whether the dispatcher may decompose it.
//! [`Value::MultiParam`] and [`Value::KeyedCollection`] are produced by
//! framework parameter binding and are traversed; [`Value::Map`] is an
//! arbitrary caller-built map and is never decomposed, even if crypto-eligible
//! records sit inside it.

use std::collections::BTreeMap;

use crate::decl::CryptField;

/// A request or response payload value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value. Crypto-opaque.
    Null,
    /// Boolean scalar. Crypto-opaque.
    Bool(bool),
    /// Integer scalar. Crypto-opaque.
    Int(i64),
    /// Floating-point scalar. Crypto-opaque.
    Float(f64),
    /// The only encryptable leaf.
    String(String),
    /// Ordered sequence of mixed shapes.
    List(Vec<Value>),
    /// Map produced by list/array parameter binding. Keys encode role
    /// metadata (`"list"`, `"collection"` substrings) rather than user names.
    KeyedCollection(BTreeMap<String, Value>),
    /// Map from declared parameter name to argument value, produced by
    /// multi-parameter binding. Also carries framework-injected alias keys
    /// containing `"param"`.
    MultiParam(BTreeMap<String, Value>),
    /// Any other map. Never decomposed.
    Map(BTreeMap<String, Value>),
    /// A record whose fields may carry [`CryptField`] declarations.
    Record(Record),
}

impl Value {
    /// Whether this value is crypto-opaque: absent, numeric, or boolean.
    ///
    /// Opaque values are never encrypted or decrypted and act as the global
    /// early exit of both dispatcher passes.
    pub fn is_opaque(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_)
        )
    }

    /// Build a multi-parameter binding map from `(name, value)` pairs.
    pub fn multi_param<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::MultiParam(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a list/array binding wrapper from `(role-key, value)` pairs.
    pub fn keyed_collection<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::KeyedCollection(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// The contained string, if this is a string leaf.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to a `serde_json::Value`, discarding provenance and field
    /// declarations. Intended for logging and export.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Value::from(*f),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::KeyedCollection(map) | Value::MultiParam(map) | Value::Map(map) => {
                serde_json::Value::Object(
                    map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
                )
            }
            Value::Record(rec) => serde_json::Value::Object(
                rec.fields()
                    .iter()
                    .map(|f| (f.name.clone(), f.value.to_json()))
                    .collect(),
            ),
        }
    }

    /// Convert from a `serde_json::Value`.
    ///
    /// JSON objects become [`Value::Map`]: a deserialized map is a
    /// caller-constructed map, not framework parameter binding, so it keeps
    /// the never-decomposed provenance.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Record> for Value {
    fn from(rec: Record) -> Self {
        Value::Record(rec)
    }
}

/// A named record field, optionally carrying a crypto declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Crypto declaration; `None` means the field is never touched.
    pub decl: Option<CryptField>,
    /// Current field value.
    pub value: Value,
}

/// A bean-like record: ordered named fields with optional declarations.
///
/// The dispatcher mutates declared string and list fields in place and leaves
/// everything else alone, so a record with no declarations is inert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<Field>,
}

impl Record {
    /// A new record with no fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an undeclared field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            decl: None,
            value: value.into(),
        });
        self
    }

    /// Append a field carrying a crypto declaration.
    pub fn crypt_field(
        mut self,
        name: impl Into<String>,
        decl: CryptField,
        value: impl Into<Value>,
    ) -> Self {
        self.fields.push(Field {
            name: name.into(),
            decl: Some(decl),
            value: value.into(),
        });
        self
    }

    /// The value of the first field with the given name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    /// All fields, in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Mutable access to all fields.
    pub fn fields_mut(&mut self) -> &mut [Field] {
        &mut self.fields
    }
}
