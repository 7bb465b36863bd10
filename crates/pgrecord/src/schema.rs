//! Database, table and column DDL.
//!
//! Every operation is a fixed template: identifiers are always quoted, names used in
//! existence checks are bound as parameters, column types are checked against a
//! conservative character set and defaults are rendered as escaped string literals.
//! Missing prerequisites are returned as errors; nothing here ends the process.

use crate::client::{Connection, ConnectionProvider};
use crate::error::{OrmError, OrmResult};
use crate::ident::{Ident, quote_ident};
use crate::logging::SqlLogger;
use crate::statement::Statement;
use crate::value::Value;


/// A column definition: name and SQL type (`text`, `varchar(64)`, `integer[]`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub ty: String,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// Schema operations against the databases of one provider.
#[derive(Debug, Clone)]
pub struct Schema<P> {
    provider: P,
    maintenance_database: String,
    logger: SqlLogger,
}

impl<P: ConnectionProvider> Schema<P> {
    /// Server-level statements go to the provider's maintenance database.
    pub fn new(provider: P) -> Self {
        Self {
            maintenance_database: provider.maintenance_database().to_string(),
            provider,
            logger: SqlLogger::default(),
        }
    }

    /// Override the database used for `pg_database` lookups and `CREATE`/`DROP DATABASE`.
    pub fn maintenance_database(mut self, database: impl Into<String>) -> Self {
        self.maintenance_database = database.into();
        self
    }

    pub fn logger(mut self, logger: SqlLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub async fn database_exists(&self, database: &str) -> OrmResult<bool> {
        let stmt = database_exists_sql(database);
        self.exists("database_exists", database, &self.maintenance_database, stmt)
            .await
    }

    /// Create `database`. Returns `false` (and logs a warning) if it already exists.
    pub async fn create_database(&self, database: &str) -> OrmResult<bool> {
        let stmt = quote_ident(database).map(|db| Statement::raw(format!("CREATE DATABASE {db}")));
        if self.database_exists(database).await? {
            self.logger
                .skipped("create_database", database, "database already exists");
            return Ok(false);
        }
        self.execute("create_database", database, &self.maintenance_database, stmt)
            .await?;
        Ok(true)
    }

    /// Drop `database`. Returns `false` (and logs a warning) if it does not exist.
    pub async fn drop_database(&self, database: &str) -> OrmResult<bool> {
        let stmt = quote_ident(database).map(|db| Statement::raw(format!("DROP DATABASE {db}")));
        if !self.database_exists(database).await? {
            self.logger
                .skipped("drop_database", database, "database does not exist");
            return Ok(false);
        }
        self.execute("drop_database", database, &self.maintenance_database, stmt)
            .await?;
        Ok(true)
    }

    pub async fn table_exists(&self, database: &str, table: &str) -> OrmResult<bool> {
        let stmt = table_exists_sql(table);
        self.exists("table_exists", table, database, stmt).await
    }

    /// Create `table` with `columns`.
    ///
    /// An empty column list is [`OrmError::Build`], a missing database is
    /// [`OrmError::NotFound`]. Returns `false` (and logs a warning) if the table
    /// already exists.
    pub async fn create_table(
        &self,
        database: &str,
        table: &str,
        columns: &[Column],
    ) -> OrmResult<bool> {
        let stmt = match create_table_sql(table, columns) {
            Ok(stmt) => stmt,
            Err(err) => return Err(self.fail("create_table", table, err)),
        };
        if !self.database_exists(database).await? {
            let err = OrmError::not_found(format!("database {database:?} does not exist"));
            return Err(self.fail("create_table", table, err));
        }
        if self.table_exists(database, table).await? {
            self.logger
                .skipped("create_table", table, "table already exists");
            return Ok(false);
        }
        self.execute("create_table", table, database, Ok(stmt)).await?;
        Ok(true)
    }

    /// Drop `table` and the constraints that depend on it.
    ///
    /// Runs `DROP TABLE IF EXISTS ... CASCADE` followed by `DROP TABLE IF EXISTS ...`
    /// on one connection.
    pub async fn drop_table(&self, database: &str, table: &str) -> OrmResult<()> {
        let result = async {
            let [cascade, plain] = drop_table_sql(table)?;
            let conn = self.provider.connect(database).await?;
            for stmt in [cascade, plain] {
                self.logger.statement("drop_table", table, &stmt);
                conn.execute(&stmt).await?;
            }
            Ok::<_, OrmError>(())
        }
        .await;
        self.observe("drop_table", table, result)
    }

    /// Add `columns` to `table` in a single `ALTER TABLE`.
    pub async fn add_columns(&self, database: &str, table: &str, columns: &[Column]) -> OrmResult<()> {
        self.execute("add_columns", table, database, add_columns_sql(table, columns))
            .await
            .map(drop)
    }

    pub async fn remove_column(&self, database: &str, table: &str, column: &str) -> OrmResult<()> {
        let stmt = alter_column(table, column, |t, c| format!("ALTER TABLE {t} DROP COLUMN {c}"));
        self.execute("remove_column", table, database, stmt)
            .await
            .map(drop)
    }

    pub async fn rename_column(
        &self,
        database: &str,
        table: &str,
        column: &str,
        new_name: &str,
    ) -> OrmResult<()> {
        let stmt = quote_ident(new_name).and_then(|to| {
            alter_column(table, column, |t, c| {
                format!("ALTER TABLE {t} RENAME COLUMN {c} TO {to}")
            })
        });
        self.execute("rename_column", table, database, stmt)
            .await
            .map(drop)
    }

    pub async fn change_column_type(
        &self,
        database: &str,
        table: &str,
        column: &str,
        ty: &str,
    ) -> OrmResult<()> {
        let stmt = check_type(ty).and_then(|ty| {
            alter_column(table, column, |t, c| {
                format!("ALTER TABLE {t} ALTER COLUMN {c} TYPE {ty}")
            })
        });
        self.execute("change_column_type", table, database, stmt)
            .await
            .map(drop)
    }

    /// Set the column default to the string literal `default`, or drop it with `None`.
    pub async fn change_column_default(
        &self,
        database: &str,
        table: &str,
        column: &str,
        default: Option<&str>,
    ) -> OrmResult<()> {
        let stmt = change_default_sql(table, column, default);
        self.execute("change_column_default", table, database, stmt)
            .await
            .map(drop)
    }

    pub async fn change_column_nullable(
        &self,
        database: &str,
        table: &str,
        column: &str,
        nullable: bool,
    ) -> OrmResult<()> {
        let action = if nullable { "DROP NOT NULL" } else { "SET NOT NULL" };
        let stmt = alter_column(table, column, |t, c| {
            format!("ALTER TABLE {t} ALTER COLUMN {c} {action}")
        });
        self.execute("change_column_nullable", table, database, stmt)
            .await
            .map(drop)
    }

    async fn execute(
        &self,
        op: &str,
        target: &str,
        database: &str,
        stmt: OrmResult<Statement>,
    ) -> OrmResult<u64> {
        let result = async {
            let stmt = stmt?;
            self.logger.statement(op, target, &stmt);
            let conn = self.provider.connect(database).await?;
            conn.execute(&stmt).await
        }
        .await;
        self.observe(op, target, result)
    }

    async fn exists(
        &self,
        op: &str,
        target: &str,
        database: &str,
        stmt: OrmResult<Statement>,
    ) -> OrmResult<bool> {
        let result = async {
            let stmt = stmt?;
            self.logger.statement(op, target, &stmt);
            let conn = self.provider.connect(database).await?;
            match conn.query_scalar(&stmt).await? {
                Value::Bool(b) => Ok(b),
                other => Err(OrmError::mapping(
                    "exists",
                    format!("expected boolean, got {}", other.kind_name()),
                )),
            }
        }
        .await;
        self.observe(op, target, result)
    }

    fn fail(&self, op: &str, target: &str, err: OrmError) -> OrmError {
        self.logger.failure(op, target, &err);
        err
    }

    fn observe<T>(&self, op: &str, target: &str, result: OrmResult<T>) -> OrmResult<T> {
        result.map_err(|err| self.fail(op, target, err))
    }
}

fn database_exists_sql(database: &str) -> OrmResult<Statement> {
    if database.is_empty() {
        return Err(OrmError::build("database name cannot be empty"));
    }
    Ok(Statement::new(
        "SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1)",
        vec![Value::from(database)],
    ))
}

fn table_exists_sql(table: &str) -> OrmResult<Statement> {
    let ident = Ident::parse(table)?;
    let name = Value::from(ident.base_name());
    Ok(match ident.qualifier() {
        Some(schema) => Statement::new(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
             WHERE table_schema::text = $1 AND table_name::text = $2)",
            vec![Value::from(schema), name],
        ),
        None => Statement::new(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
             WHERE table_schema::text = ANY (current_schemas(false)) AND table_name::text = $1)",
            vec![name],
        ),
    })
}

fn create_table_sql(table: &str, columns: &[Column]) -> OrmResult<Statement> {
    let table = Ident::parse(table)?.to_quoted_sql();
    if columns.is_empty() {
        return Err(OrmError::build(format!(
            "CREATE TABLE {table} needs at least one column"
        )));
    }
    let defs = column_defs(columns)?;
    Ok(Statement::raw(format!(
        "CREATE TABLE {table} ({})",
        defs.join(", ")
    )))
}

fn drop_table_sql(table: &str) -> OrmResult<[Statement; 2]> {
    let table = Ident::parse(table)?.to_quoted_sql();
    Ok([
        Statement::raw(format!("DROP TABLE IF EXISTS {table} CASCADE")),
        Statement::raw(format!("DROP TABLE IF EXISTS {table}")),
    ])
}

fn add_columns_sql(table: &str, columns: &[Column]) -> OrmResult<Statement> {
    let table = Ident::parse(table)?.to_quoted_sql();
    if columns.is_empty() {
        return Err(OrmError::build(format!(
            "ALTER TABLE {table} has no columns to add"
        )));
    }
    let adds: Vec<String> = column_defs(columns)?
        .into_iter()
        .map(|def| format!("ADD COLUMN {def}"))
        .collect();
    Ok(Statement::raw(format!(
        "ALTER TABLE {table} {}",
        adds.join(", ")
    )))
}

fn change_default_sql(table: &str, column: &str, default: Option<&str>) -> OrmResult<Statement> {
    match default {
        Some(value) => {
            let literal = quote_literal(value)?;
            alter_column(table, column, |t, c| {
                format!("ALTER TABLE {t} ALTER COLUMN {c} SET DEFAULT {literal}")
            })
        }
        None => alter_column(table, column, |t, c| {
            format!("ALTER TABLE {t} ALTER COLUMN {c} DROP DEFAULT")
        }),
    }
}

fn alter_column(
    table: &str,
    column: &str,
    render: impl FnOnce(&str, &str) -> String,
) -> OrmResult<Statement> {
    let table = Ident::parse(table)?.to_quoted_sql();
    let column = quote_ident(column)?;
    Ok(Statement::raw(render(&table, &column)))
}

fn column_defs(columns: &[Column]) -> OrmResult<Vec<String>> {
    columns
        .iter()
        .map(|col| Ok(format!("{} {}", quote_ident(&col.name)?, check_type(&col.ty)?)))
        .collect()
}

/// Accept type names such as `text`, `varchar(64)`, `numeric(10, 2)`,
/// `timestamp with time zone`, `integer[]` or `public.my_enum`.
fn check_type(ty: &str) -> OrmResult<&str> {
    let ty = ty.trim();
    let starts_ok = ty.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let chars_ok = ty
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ' ' | '(' | ')' | ',' | '[' | ']' | '.'));
    let balanced = ty.matches('(').count() == ty.matches(')').count()
        && ty.matches('[').count() == ty.matches(']').count();
    if starts_ok && chars_ok && balanced {
        Ok(ty)
    } else {
        Err(OrmError::build(format!("invalid column type {ty:?}")))
    }
}

/// Render `s` as a SQL string literal (`'` doubled).
fn quote_literal(s: &str) -> OrmResult<String> {
    if s.contains('\0') {
        return Err(OrmError::build("string literal cannot contain NUL"));
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push('\'');
        }
        out.push(ch);
    }
    out.push('\'');
    Ok(out)
}
