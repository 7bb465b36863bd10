//! Parameterized statements.

use crate::value::Value;
use std::collections::BTreeSet;
use tokio_postgres::types::ToSql;

/// SQL text with `$1..$n` placeholders plus the values bound to them, in order.
///
/// `args[i]` is bound to placeholder `$i+1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    args: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }

    /// A statement without parameters.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.args)
    }

    /// Arguments as tokio-postgres parameter references.
    pub fn params(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.args.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
    }

    /// Number of distinct `$n` placeholders in the text.
    ///
    /// Markers inside quoted identifiers and string literals are not counted.
    pub fn placeholder_count(&self) -> usize {
        placeholders(&self.sql).len()
    }
}

fn placeholders(sql: &str) -> BTreeSet<usize> {
    let mut found = BTreeSet::new();
    let mut chars = sql.chars().peekable();
    let mut in_ident = false;
    let mut in_literal = false;

    while let Some(c) = chars.next() {
        match c {
            '"' if !in_literal => in_ident = !in_ident,
            '\'' if !in_ident => in_literal = !in_literal,
            '$' if !in_ident && !in_literal => {
                let mut digits = String::new();
                while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                    digits.push(d);
                    chars.next();
                }
                if let Ok(n) = digits.parse::<usize>() {
                    found.insert(n);
                }
            }
            _ => {}
        }
    }
    found
}
