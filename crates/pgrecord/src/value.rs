//! Kind-tagged scalar values.
//!
//! [`Value`] is the closed set of values that flows through every layer: it is what a
//! [`FieldMap`](crate::FieldMap) holds, what a [`Statement`](crate::Statement) binds,
//! and what a decoded [`Row`](crate::Row) cell contains. [`Kind`] is its type-level
//! mirror used by [`RecordShape`](crate::RecordShape) descriptors.

use crate::field_map::FieldMap;
use crate::shape::RecordShape;
use bytes::BytesMut;
use std::error::Error;
use std::sync::Arc;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

/// A single field or column value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// SQL NULL / not provided.
    #[default]
    Null,
    Bool(bool),
    /// Every integer width is widened to `i64`.
    Int(i64),
    /// Every float width is widened to `f64`.
    Float(f64),
    Text(String),
    /// A nested record, kept as its own map rather than merged into the parent.
    Record(FieldMap),
}

impl Value {
    /// Human-readable kind name, used in mapping errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Record(_) => "record",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value reads as "not provided" under the zero-is-absent policy:
    /// null, the empty string, numeric zero, or the `"-"` placeholder.
    ///
    /// Booleans and nested records are never absent.
    pub fn is_absent(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Int(v) => *v == 0,
            Value::Float(v) => *v == 0.0,
            Value::Text(s) => s.is_empty() || s == "-",
            Value::Bool(_) | Value::Record(_) => false,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a JSON value.
    ///
    /// Arrays have no counterpart and yield `None`; inside objects they are dropped.
    /// Unsigned numbers beyond `i64::MAX` become floats.
    pub fn from_json(json: serde_json::Value) -> Option<Value> {
        match json {
            serde_json::Value::Null => Some(Value::Null),
            serde_json::Value::Bool(b) => Some(Value::Bool(b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Value::Int(i)),
                None => n.as_f64().map(Value::Float),
            },
            serde_json::Value::String(s) => Some(Value::Text(s)),
            serde_json::Value::Array(_) => None,
            serde_json::Value::Object(obj) => {
                let mut map = FieldMap::with_capacity(obj.len());
                for (name, value) in obj {
                    if let Some(value) = Value::from_json(value) {
                        map.insert(name, value);
                    }
                }
                Some(Value::Record(map))
            }
        }
    }

    /// Render as JSON (used to bind nested records as `json`/`jsonb`).
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Record(map) => map.to_json(),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int(v.into())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<FieldMap> for Value {
    fn from(v: FieldMap) -> Self {
        Value::Record(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Binds each kind to the matching Postgres types.
///
/// `Int` and `Float` also bind to `numeric` when the `rust_decimal` feature is on.
/// `Text` binds only to the text family (`text`, `varchar`, `bpchar`, `name`). It is
/// not coerced into `uuid`, `date`, `timestamp` or similar parameters; binding one
/// fails with a type error.
impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql_checked(ty, out),
            Value::Int(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql_checked(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql_checked(ty, out),
                #[cfg(feature = "rust_decimal")]
                Type::NUMERIC => rust_decimal::Decimal::from(*v).to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            Value::Float(v) => match *ty {
                Type::FLOAT4 => (*v as f32).to_sql_checked(ty, out),
                #[cfg(feature = "rust_decimal")]
                Type::NUMERIC => rust_decimal::Decimal::try_from(*v)?.to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            Value::Text(s) => s.as_str().to_sql_checked(ty, out),
            Value::Record(map) => map.to_json().to_sql_checked(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        #[cfg(feature = "rust_decimal")]
        if <rust_decimal::Decimal as ToSql>::accepts(ty) {
            return true;
        }
        <bool as ToSql>::accepts(ty)
            || <i16 as ToSql>::accepts(ty)
            || <i32 as ToSql>::accepts(ty)
            || <i64 as ToSql>::accepts(ty)
            || <f32 as ToSql>::accepts(ty)
            || <f64 as ToSql>::accepts(ty)
            || <&str as ToSql>::accepts(ty)
            || <serde_json::Value as ToSql>::accepts(ty)
    }

    to_sql_checked!();
}

/// The expected kind of a record field.
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    Bool,
    Int,
    Float,
    Text,
    /// A nested record with its own shape.
    Record(Arc<RecordShape>),
}

impl Kind {
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Bool => "boolean",
            Kind::Int => "integer",
            Kind::Float => "float",
            Kind::Text => "text",
            Kind::Record(_) => "record",
        }
    }

    /// Whether a value of this kind may be stored in a field of this kind.
    ///
    /// NULL is admitted everywhere; nullability is enforced by the field type.
    pub fn admits(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (Kind::Bool, Value::Bool(_))
                | (Kind::Int, Value::Int(_))
                | (Kind::Float, Value::Float(_))
                | (Kind::Text, Value::Text(_))
                | (Kind::Record(_), Value::Record(_))
        )
    }

    /// The zero value of this kind.
    pub fn zero_value(&self) -> Value {
        match self {
            Kind::Bool => Value::Bool(false),
            Kind::Int => Value::Int(0),
            Kind::Float => Value::Float(0.0),
            Kind::Text => Value::Text(String::new()),
            Kind::Record(_) => Value::Record(FieldMap::new()),
        }
    }
}
