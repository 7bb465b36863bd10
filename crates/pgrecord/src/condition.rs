//! WHERE clause conditions.

use crate::error::OrmResult;
use crate::field_map::{AbsencePolicy, FieldMap};
use crate::ident::{Ident, IntoIdent};
use crate::value::Value;

/// Comparison operator of a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// column = value
    Eq,
}

impl Op {
    pub fn as_sql(self) -> &'static str {
        match self {
            Op::Eq => "=",
        }
    }
}

/// A single `column <op> $n` test with its bound value.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    column: Ident,
    op: Op,
    value: Value,
}

impl Condition {
    pub fn new<I: IntoIdent>(column: I, op: Op, value: impl Into<Value>) -> OrmResult<Self> {
        Ok(Self {
            column: column.into_ident()?,
            op,
            value: value.into(),
        })
    }

    /// Create an equality condition: column = value
    pub fn eq<I: IntoIdent>(column: I, value: impl Into<Value>) -> OrmResult<Self> {
        Self::new(column, Op::Eq, value)
    }

    /// One equality condition per non-absent field, in the map's order.
    pub fn all_eq(filter: &FieldMap, policy: AbsencePolicy) -> OrmResult<Vec<Self>> {
        filter
            .normalized(policy)
            .into_iter()
            .map(|(name, value)| Self::eq(Ident::column(&name)?, value))
            .collect()
    }

    pub fn column(&self) -> &Ident {
        &self.column
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Append `column op $n` to `out`, binding the value as the next argument.
    pub(crate) fn write_sql(&self, out: &mut String, args: &mut Vec<Value>) {
        args.push(self.value.clone());
        self.column.write_sql(out, false);
        out.push(' ');
        out.push_str(self.op.as_sql());
        out.push_str(" $");
        out.push_str(&args.len().to_string());
    }
}
