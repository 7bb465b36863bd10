//! Shape-driven result mapping.
//!
//! Rows are matched to a [`RecordShape`] by exact column name. Columns without a
//! field are skipped, fields without a column keep their absent value, and a value of
//! the wrong kind is a [`OrmError::Mapping`] rather than a silent coercion. Rows are
//! pulled from the [`RowStream`] one at a time.

use crate::client::RowStream;
use crate::error::{OrmError, OrmResult};
use crate::field_map::FieldMap;
use crate::record::Record;
use crate::row::Row;
use crate::shape::RecordShape;
use crate::value::{Kind, Value};
use futures_core::Stream;
use futures_util::StreamExt;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Map one row onto `shape`, producing the field map a [`Record`] is built from.
///
/// Every column of the row is visited, mapped or not.
pub fn map_row(row: &Row, shape: &RecordShape) -> OrmResult<FieldMap> {
    let mut map = FieldMap::with_capacity(shape.len());
    for (column, value) in row.iter() {
        let Some(field) = shape.get(column) else {
            continue;
        };
        if map.contains(column) {
            continue;
        }
        let value = check_kind(column, &field.kind, value?)?;
        map.insert(column, value);
    }
    Ok(map)
}

fn check_kind(column: &str, kind: &Kind, value: &Value) -> OrmResult<Value> {
    if !kind.admits(value) {
        return Err(OrmError::mapping(
            column,
            format!("expected {}, got {}", kind.name(), value.kind_name()),
        ));
    }
    match (kind, value) {
        (Kind::Record(shape), Value::Record(nested)) => {
            let mut out = FieldMap::with_capacity(shape.len());
            for (name, inner) in nested.iter() {
                if let Some(field) = shape.get(name) {
                    let path = format!("{column}.{name}");
                    out.insert(name, check_kind(&path, &field.kind, inner)?);
                }
            }
            Ok(Value::Record(out))
        }
        _ => Ok(value.clone()),
    }
}

/// Map the first row to a record; zero rows is [`OrmError::NotFound`].
///
/// The stream is dropped after the first row.
pub async fn map_one<T: Record>(rows: RowStream) -> OrmResult<T> {
    map_opt(rows)
        .await?
        .ok_or_else(|| OrmError::not_found("Expected one row, got none"))
}

/// Map the first row to a record, if any.
pub async fn map_opt<T: Record>(mut rows: RowStream) -> OrmResult<Option<T>> {
    match rows.next().await {
        Some(row) => {
            let shape = T::shape();
            T::from_field_map(map_row(&row?, &shape)?).map(Some)
        }
        None => Ok(None),
    }
}

/// Map every row, preserving order; zero rows is an empty `Vec`.
pub async fn map_many<T: Record>(mut rows: RowStream) -> OrmResult<Vec<T>> {
    let shape = T::shape();
    let mut out = Vec::new();
    while let Some(row) = rows.next().await {
        out.push(T::from_field_map(map_row(&row?, &shape)?)?);
    }
    Ok(out)
}

/// Lazily map a row stream into records.
#[must_use]
pub struct RecordStream<T> {
    inner: RowStream,
    shape: RecordShape,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> RecordStream<T> {
    pub fn new(inner: RowStream) -> Self {
        Self {
            inner,
            shape: T::shape(),
            _marker: PhantomData,
        }
    }
}

impl<T: Record> Stream for RecordStream<T> {
    type Item = OrmResult<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(row))) => Poll::Ready(Some(
                map_row(&row, &self.shape).and_then(T::from_field_map),
            )),
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(e))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}
