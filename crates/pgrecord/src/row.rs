//! Result rows as kind-tagged cells.
//!
//! A [`Row`] is what the result mapper consumes: shared column names plus one decoded
//! cell per column. Rows are built from `tokio_postgres::Row` by [`Row::from_pg`] or
//! directly with [`Row::new`] (for other providers and for tests).

use crate::error::{OrmError, OrmResult};
use crate::value::Value;
use std::sync::Arc;
use tokio_postgres::types::{FromSql, Type};

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Value(Value),
    /// Postgres type outside the supported kinds; only an error if a field maps to it.
    Undecodable(String),
}

/// One result row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    cells: Vec<Cell>,
}

impl Row {
    /// Build a row from column names and values.
    ///
    /// Missing trailing values read as NULL; extra values are ignored.
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        let mut cells: Vec<Cell> = values.into_iter().map(Cell::Value).collect();
        cells.resize(columns.len(), Cell::Value(Value::Null));
        Self { columns, cells }
    }

    /// Decode a tokio-postgres row.
    ///
    /// Integer and float widths are widened, `json`/`jsonb` objects become nested
    /// records, and unsupported column types are kept as undecodable cells.
    pub fn from_pg(row: &tokio_postgres::Row, columns: &Arc<[String]>) -> OrmResult<Self> {
        let mut cells = Vec::with_capacity(row.len());
        for (idx, column) in row.columns().iter().enumerate() {
            cells.push(decode_cell(row, idx, column.name(), column.type_())?);
        }
        Ok(Self {
            columns: Arc::clone(columns),
            cells,
        })
    }

    /// Column names shared by every row of a result.
    pub fn column_names(row: &tokio_postgres::Row) -> Arc<[String]> {
        row.columns().iter().map(|c| c.name().to_string()).collect()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Value of column `idx`.
    pub fn get(&self, idx: usize) -> OrmResult<&Value> {
        let column = self.columns.get(idx).map(String::as_str).unwrap_or("?");
        match self.cells.get(idx) {
            Some(Cell::Value(v)) => Ok(v),
            Some(Cell::Undecodable(ty)) => Err(OrmError::mapping(
                column,
                format!("unsupported column type {ty}"),
            )),
            None => Err(OrmError::mapping(column, "column index out of range")),
        }
    }

    /// Value of the first column named `name`.
    pub fn get_by_name(&self, name: &str) -> OrmResult<&Value> {
        let idx = self
            .columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| OrmError::mapping(name, "no such column"))?;
        self.get(idx)
    }

    /// Iterate `(column, value)` pairs, all columns in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, OrmResult<&Value>)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), self.get(idx)))
    }
}

fn decode_cell(row: &tokio_postgres::Row, idx: usize, name: &str, ty: &Type) -> OrmResult<Cell> {
    fn get<'a, T: FromSql<'a>>(
        row: &'a tokio_postgres::Row,
        idx: usize,
        name: &str,
    ) -> OrmResult<Option<T>> {
        row.try_get::<_, Option<T>>(idx)
            .map_err(|e| OrmError::mapping(name, e.to_string()))
    }

    let value = match *ty {
        Type::BOOL => get::<bool>(row, idx, name)?.map(Value::from),
        Type::INT2 => get::<i16>(row, idx, name)?.map(Value::from),
        Type::INT4 => get::<i32>(row, idx, name)?.map(Value::from),
        Type::INT8 => get::<i64>(row, idx, name)?.map(Value::from),
        Type::OID => get::<u32>(row, idx, name)?.map(Value::from),
        Type::FLOAT4 => get::<f32>(row, idx, name)?.map(Value::from),
        Type::FLOAT8 => get::<f64>(row, idx, name)?.map(Value::from),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            get::<String>(row, idx, name)?.map(Value::from)
        }
        #[cfg(feature = "rust_decimal")]
        Type::NUMERIC => match get::<rust_decimal::Decimal>(row, idx, name)? {
            Some(d) => match numeric_value(d) {
                Some(v) => Some(v),
                None => return Ok(Cell::Undecodable(ty.name().to_string())),
            },
            None => None,
        },
        Type::JSON | Type::JSONB => match get::<serde_json::Value>(row, idx, name)? {
            Some(json) => match Value::from_json(json) {
                Some(v) => Some(v),
                None => return Ok(Cell::Undecodable(ty.name().to_string())),
            },
            None => None,
        },
        _ => return Ok(Cell::Undecodable(ty.name().to_string())),
    };
    Ok(Cell::Value(value.unwrap_or(Value::Null)))
}

/// `numeric` columns read as floats.
#[cfg(feature = "rust_decimal")]
fn numeric_value(d: rust_decimal::Decimal) -> Option<Value> {
    use rust_decimal::prelude::ToPrimitive;
    d.to_f64().map(Value::Float)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Arc<[String]> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn short_rows_are_padded_with_null() {
        let row = Row::new(cols(&["id", "name"]), vec![Value::Int(1)]);
        assert_eq!(row.len(), 2);
        assert_eq!(row.get(1).unwrap(), &Value::Null);
    }

    #[test]
    fn lookup_by_name() {
        let row = Row::new(cols(&["id", "name"]), vec![Value::Int(1), "x".into()]);
        assert_eq!(row.get_by_name("name").unwrap(), &Value::from("x"));
        assert!(row.get_by_name("missing").unwrap_err().is_mapping());
    }

    #[test]
    fn undecodable_cell_errors_only_when_read() {
        let mut row = Row::new(cols(&["id", "blob"]), vec![Value::Int(1)]);
        row.cells[1] = Cell::Undecodable("bytea".into());
        assert_eq!(row.get(0).unwrap(), &Value::Int(1));
        let err = row.get(1).unwrap_err();
        assert!(err.to_string().contains("bytea"));
    }

    #[cfg(feature = "rust_decimal")]
    #[test]
    fn numeric_cells_read_as_float() {
        use rust_decimal::Decimal;
        assert_eq!(numeric_value(Decimal::new(25, 1)), Some(Value::Float(2.5)));
        assert_eq!(numeric_value(Decimal::from(7)), Some(Value::Float(7.0)));
    }
}
