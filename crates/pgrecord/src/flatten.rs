//! Flattening arbitrary serializable values into a [`FieldMap`].
//!
//! Types that derive [`Record`](crate::Record) flatten with
//! [`Record::to_field_map`](crate::Record::to_field_map). Everything else that
//! implements `Serialize` goes through `serde_json`: `#[serde(rename)]` supplies
//! column names, nested structs become nested records, and fields without a
//! [`Value`] counterpart (sequences, tuples) are left out.

use crate::error::{OrmError, OrmResult};
use crate::field_map::FieldMap;
use crate::value::Value;
use serde::Serialize;

/// Flatten a struct or string-keyed map into a [`FieldMap`], in declaration order.
///
/// Anything else (scalars, sequences, unit) is [`OrmError::UnsupportedShape`].
///
/// ```ignore
/// #[derive(Serialize)]
/// struct NewUser<'a> {
///     name: &'a str,
///     #[serde(rename = "years")]
///     age: i32,
/// }
///
/// let map = pgrecord::flatten(&NewUser { name: "alice", age: 30 })?;
/// assert_eq!(map.names().collect::<Vec<_>>(), ["name", "years"]);
/// ```
pub fn flatten<T: Serialize + ?Sized>(value: &T) -> OrmResult<FieldMap> {
    let json = serde_json::to_value(value)
        .map_err(|e| OrmError::unsupported_shape(e.to_string()))?;
    match json {
        serde_json::Value::Object(_) => match Value::from_json(json) {
            Some(Value::Record(map)) => Ok(map),
            _ => Err(OrmError::unsupported_shape("expected a record")),
        },
        other => Err(OrmError::unsupported_shape(format!(
            "expected a struct or map, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "sequence",
        serde_json::Value::Object(_) => "map",
    }
}
