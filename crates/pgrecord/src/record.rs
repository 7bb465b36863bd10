//! Record traits.
//!
//! [`Record`] ties a Rust type to its [`RecordShape`] and to the two conversions the
//! crate needs: flattening into a [`FieldMap`] and rebuilding from one. It is usually
//! derived with `#[derive(Record)]`, but a hand-written impl is just as valid.

use crate::error::OrmResult;
use crate::field_map::FieldMap;
use crate::shape::RecordShape;
use crate::value::{Kind, Value};

/// A caller-defined record type.
///
/// # Example
///
/// ```ignore
/// use pgrecord::Record;
///
/// #[derive(Record)]
/// struct User {
///     id: i64,
///     name: String,
///     #[record(column = "years")]
///     age: i32,
///     #[record(nested)]
///     address: Address,
/// }
/// ```
pub trait Record: Sized {
    /// Field name → kind descriptor used by the result mapper.
    fn shape() -> RecordShape;

    /// Flatten into a field map, nested records becoming nested maps.
    fn to_field_map(&self) -> FieldMap;

    /// Rebuild from a field map produced by the result mapper (or by hand).
    fn from_field_map(map: FieldMap) -> OrmResult<Self>;
}

/// A scalar type that can live in a record field.
pub trait FieldType: Sized {
    /// The kind this field expects from a column.
    fn kind() -> Kind;

    /// Convert a mapped value; the error is a message, the caller adds the column.
    fn from_value(value: Value) -> Result<Self, String>;

    fn to_value(&self) -> Value;

    /// Value used when the row has no column for this field.
    fn absent() -> Self;
}

fn mismatch(expected: &str, got: &Value) -> String {
    match got {
        Value::Null => format!("unexpected NULL for non-optional {expected} field"),
        other => format!("expected {expected}, got {}", other.kind_name()),
    }
}

impl FieldType for bool {
    fn kind() -> Kind {
        Kind::Bool
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Bool(v) => Ok(v),
            other => Err(mismatch("boolean", &other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn absent() -> Self {
        false
    }
}

impl FieldType for i64 {
    fn kind() -> Kind {
        Kind::Int
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Int(v) => Ok(v),
            other => Err(mismatch("integer", &other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Int(*self)
    }

    fn absent() -> Self {
        0
    }
}

macro_rules! narrow_int_field {
    ($($ty:ty),*) => {$(
        impl FieldType for $ty {
            fn kind() -> Kind {
                Kind::Int
            }

            fn from_value(value: Value) -> Result<Self, String> {
                match value {
                    Value::Int(v) => <$ty>::try_from(v)
                        .map_err(|_| format!("value {v} out of range for {}", stringify!($ty))),
                    other => Err(mismatch("integer", &other)),
                }
            }

            fn to_value(&self) -> Value {
                Value::Int(i64::from(*self))
            }

            fn absent() -> Self {
                0
            }
        }
    )*};
}

narrow_int_field!(i16, i32);

impl FieldType for f64 {
    fn kind() -> Kind {
        Kind::Float
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Float(v) => Ok(v),
            other => Err(mismatch("float", &other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn absent() -> Self {
        0.0
    }
}

impl FieldType for f32 {
    fn kind() -> Kind {
        Kind::Float
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Float(v) => Ok(v as f32),
            other => Err(mismatch("float", &other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn absent() -> Self {
        0.0
    }
}

impl FieldType for String {
    fn kind() -> Kind {
        Kind::Text
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Text(v) => Ok(v),
            other => Err(mismatch("text", &other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn absent() -> Self {
        String::new()
    }
}

impl<T: FieldType> FieldType for Option<T> {
    fn kind() -> Kind {
        T::kind()
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, |v| v.to_value())
    }

    fn absent() -> Self {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_ints_check_range() {
        assert_eq!(i32::from_value(Value::Int(12)), Ok(12));
        assert!(i16::from_value(Value::Int(40_000)).is_err());
    }

    #[test]
    fn null_into_required_field_is_rejected() {
        let err = i64::from_value(Value::Null).unwrap_err();
        assert!(err.contains("NULL"));
        assert_eq!(Option::<i64>::from_value(Value::Null), Ok(None));
    }

    #[test]
    fn no_silent_coercion_between_kinds() {
        assert!(i64::from_value(Value::Text("12".into())).is_err());
        assert!(f64::from_value(Value::Int(12)).is_err());
        assert!(String::from_value(Value::Int(12)).is_err());
    }

    #[test]
    fn option_kind_follows_inner_type() {
        assert_eq!(Option::<String>::kind(), Kind::Text);
        assert_eq!(Some(5i32).to_value(), Value::Int(5));
        assert_eq!(None::<i32>.to_value(), Value::Null);
    }
}
