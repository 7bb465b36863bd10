//! Statement builder for the per-table operations.
//!
//! Every value, identifier arguments included, is bound as a `$n` parameter; only
//! validated identifiers are embedded in the text. Builders that would produce an
//! unrestricted statement (empty filter) or an empty column list fail with
//! [`OrmError::Build`] instead.
//!
//! ```ignore
//! let users = StatementBuilder::new("users")?;
//! let stmt = users.insert(&FieldMap::new().with("name", "alice").with("age", 30))?;
//! assert_eq!(stmt.sql(), r#"INSERT INTO "users" ("name","age") VALUES ($1,$2)"#);
//! ```

use crate::condition::Condition;
use crate::error::{OrmError, OrmResult};
use crate::field_map::{AbsencePolicy, FieldMap};
use crate::ident::Ident;
use crate::statement::Statement;
use crate::value::Value;

#[cfg(test)]
mod tests;

/// Builds statements against one table.
#[derive(Debug, Clone)]
pub struct StatementBuilder {
    table: String,
    id_column: Ident,
    policy: AbsencePolicy,
}

impl StatementBuilder {
    /// Builder for `table` (plain or schema-qualified), identifier column `id`.
    pub fn new(table: &str) -> OrmResult<Self> {
        Ok(Self {
            table: Ident::parse(table)?.to_quoted_sql(),
            id_column: Ident::column("id")?,
            policy: AbsencePolicy::default(),
        })
    }

    /// Use a different identifier column.
    pub fn id_column(mut self, column: &str) -> OrmResult<Self> {
        self.id_column = Ident::column(column)?;
        Ok(self)
    }

    /// Use a different absence policy for inserts, updates and filters.
    pub fn absence_policy(mut self, policy: AbsencePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The quoted table name as embedded in statements.
    pub fn table_sql(&self) -> &str {
        &self.table
    }

    pub fn policy(&self) -> AbsencePolicy {
        self.policy
    }

    /// `INSERT INTO "t" ("a","b") VALUES ($1,$2)`
    pub fn insert(&self, data: &FieldMap) -> OrmResult<Statement> {
        let (sql, args) = self.insert_parts(data)?;
        Ok(finish(sql, args))
    }

    /// Like [`StatementBuilder::insert`], returning the new row's identifier.
    pub fn insert_returning_id(&self, data: &FieldMap) -> OrmResult<Statement> {
        let (mut sql, args) = self.insert_parts(data)?;
        sql.push_str(" RETURNING ");
        self.id_column.write_sql(&mut sql, false);
        Ok(finish(sql, args))
    }

    fn insert_parts(&self, data: &FieldMap) -> OrmResult<(String, Vec<Value>)> {
        let pairs = data.normalized(self.policy);
        if pairs.is_empty() {
            return Err(OrmError::build(format!(
                "INSERT into {} has no columns to insert",
                self.table
            )));
        }

        let mut columns = Vec::with_capacity(pairs.len());
        let mut placeholders = Vec::with_capacity(pairs.len());
        let mut args = Vec::with_capacity(pairs.len());
        for (name, value) in pairs {
            columns.push(Ident::quoted(&name)?.to_quoted_sql());
            args.push(value);
            placeholders.push(format!("${}", args.len()));
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(","),
            placeholders.join(",")
        );
        Ok((sql, args))
    }

    /// `UPDATE "t" SET "a" = $1, "b" = $2 WHERE id = $3`
    pub fn update_by_id(&self, id: impl Into<Value>, data: &FieldMap) -> OrmResult<Statement> {
        let id = self.id_condition(id)?;
        let pairs = data.normalized(self.policy);
        if pairs.is_empty() {
            return Err(OrmError::build(format!(
                "UPDATE of {} has no columns to set",
                self.table
            )));
        }

        let mut sql = format!("UPDATE {} SET ", self.table);
        let mut args = Vec::with_capacity(pairs.len() + 1);
        for (i, (name, value)) in pairs.into_iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&Ident::quoted(&name)?.to_quoted_sql());
            args.push(value);
            sql.push_str(&format!(" = ${}", args.len()));
        }
        push_where(&mut sql, std::slice::from_ref(&id), &mut args)?;
        Ok(finish(sql, args))
    }

    /// `DELETE FROM "t" WHERE id = $1`
    pub fn delete_by_id(&self, id: impl Into<Value>) -> OrmResult<Statement> {
        let id = self.id_condition(id)?;
        let mut sql = format!("DELETE FROM {}", self.table);
        let mut args = Vec::with_capacity(1);
        push_where(&mut sql, &[id], &mut args)?;
        Ok(finish(sql, args))
    }

    /// `SELECT * FROM "t"`
    pub fn select_all(&self) -> Statement {
        Statement::raw(format!("SELECT * FROM {}", self.table))
    }

    /// `SELECT * FROM "t" WHERE id = $1`
    pub fn select_by_id(&self, id: impl Into<Value>) -> OrmResult<Statement> {
        let id = self.id_condition(id)?;
        self.select_where(&[id])
    }

    /// `SELECT * FROM "t" WHERE a = $1 AND b = $2`, absent filter values dropped.
    pub fn select_by_filter(&self, filter: &FieldMap) -> OrmResult<Statement> {
        let conditions = Condition::all_eq(filter, self.policy)?;
        self.select_where(&conditions)
    }

    /// `SELECT * FROM "t" WHERE ...` over explicit conditions (at least one).
    pub fn select_where(&self, conditions: &[Condition]) -> OrmResult<Statement> {
        let mut sql = format!("SELECT * FROM {}", self.table);
        let mut args = Vec::with_capacity(conditions.len());
        push_where(&mut sql, conditions, &mut args)?;
        Ok(finish(sql, args))
    }

    /// `SELECT id FROM "t" WHERE ...`
    pub fn select_id_by_filter(&self, filter: &FieldMap) -> OrmResult<Statement> {
        let conditions = Condition::all_eq(filter, self.policy)?;
        let mut sql = String::from("SELECT ");
        self.id_column.write_sql(&mut sql, false);
        sql.push_str(" FROM ");
        sql.push_str(&self.table);
        let mut args = Vec::with_capacity(conditions.len());
        push_where(&mut sql, &conditions, &mut args)?;
        Ok(finish(sql, args))
    }

    /// `SELECT EXISTS (SELECT * FROM "t" WHERE id = $1)`
    pub fn exists_by_id(&self, id: impl Into<Value>) -> OrmResult<Statement> {
        self.select_by_id(id).map(wrap_exists)
    }

    /// `SELECT EXISTS (SELECT * FROM "t" WHERE a = $1 ...)`; an empty filter is an error.
    pub fn exists_by_filter(&self, filter: &FieldMap) -> OrmResult<Statement> {
        self.select_by_filter(filter).map(wrap_exists)
    }

    fn id_condition(&self, id: impl Into<Value>) -> OrmResult<Condition> {
        let id = id.into();
        if id.is_null() {
            return Err(OrmError::build(format!(
                "identifier for {} cannot be NULL",
                self.table
            )));
        }
        Condition::eq(&self.id_column, id)
    }
}

fn push_where(sql: &mut String, conditions: &[Condition], args: &mut Vec<Value>) -> OrmResult<()> {
    if conditions.is_empty() {
        return Err(OrmError::build(
            "at least one condition is required to restrict the statement",
        ));
    }
    sql.push_str(" WHERE ");
    for (i, cond) in conditions.iter().enumerate() {
        if i > 0 {
            sql.push_str(" AND ");
        }
        cond.write_sql(sql, args);
    }
    Ok(())
}

fn wrap_exists(inner: Statement) -> Statement {
    let (sql, args) = inner.into_parts();
    Statement::new(format!("SELECT EXISTS ({sql})"), args)
}

fn finish(sql: String, args: Vec<Value>) -> Statement {
    let stmt = Statement::new(sql, args);
    debug_assert_eq!(stmt.placeholder_count(), stmt.args().len());
    stmt
}
