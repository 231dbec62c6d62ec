//! Boundary representation of field-type hash values.
//!
//! Domain field types describe their values and settings as a nested
//! structure of scalars, lists and maps, with the occasional rich object
//! that only a registered normalizer knows how to flatten. `FieldValue` is
//! the closed sum of those shapes; the hash generators pattern-match over
//! it instead of inspecting runtime types.

use std::any::Any;
use std::fmt;

use serde_json::Value;

/// A value the hash generator cannot destructure itself; carries the
/// concrete type name for diagnostics and dispatch to the normalizer chain.
pub struct OpaqueValue {
    value: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl OpaqueValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        OpaqueValue {
            value: Box::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn as_any(&self) -> &dyn Any {
        self.value.as_ref()
    }
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpaqueValue({})", self.type_name)
    }
}

#[derive(Debug)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<FieldValue>),
    Map(Vec<(String, FieldValue)>),
    Opaque(OpaqueValue),
}

impl FieldValue {
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        FieldValue::Opaque(OpaqueValue::new(value))
    }

    /// Classifies a JSON value into the closed hash shape.
    ///
    /// A JSON object counts as a list when every key parses as a
    /// non-negative integer, even when the indices are sparse or do not
    /// start at zero (`{"0": "a", "2": "b"}` is a list). The indices are
    /// discarded; insertion order is kept. Any non-numeric key makes the
    /// object a map. The empty object has no keys and is therefore a list.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(value) => FieldValue::Bool(value),
            Value::Number(number) => match number.as_i64() {
                Some(value) => FieldValue::Int(value),
                // u64 territory and fractions both land here.
                None => FieldValue::Float(number.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(value) => FieldValue::String(value),
            Value::Array(items) => {
                FieldValue::List(items.into_iter().map(FieldValue::from_json).collect())
            }
            Value::Object(entries) => {
                if entries.keys().all(|key| key.parse::<u64>().is_ok()) {
                    FieldValue::List(
                        entries
                            .into_iter()
                            .map(|(_, value)| FieldValue::from_json(value))
                            .collect(),
                    )
                } else {
                    FieldValue::Map(
                        entries
                            .into_iter()
                            .map(|(key, value)| (key, FieldValue::from_json(value)))
                            .collect(),
                    )
                }
            }
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(i64::from(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(items: Vec<FieldValue>) -> Self {
        FieldValue::List(items)
    }
}

impl From<Vec<(String, FieldValue)>> for FieldValue {
    fn from(entries: Vec<(String, FieldValue)>) -> Self {
        FieldValue::Map(entries)
    }
}
