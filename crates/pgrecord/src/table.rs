//! Per-table CRUD operations.
//!
//! A [`Table`] binds a [`ConnectionProvider`], a database name and a table name.
//! Every operation builds its statement first (so build errors never touch the
//! network), then acquires a connection, runs exactly one statement, maps the
//! result and drops the connection before returning.

use crate::builder::StatementBuilder;
use crate::client::{Connection, ConnectionProvider};
use crate::error::{OrmError, OrmResult};
use crate::field_map::{AbsencePolicy, FieldMap};
use crate::logging::SqlLogger;
use crate::mapper;
use crate::record::Record;
use crate::statement::Statement;
use crate::value::Value;

/// CRUD access to one table.
///
/// # Example
///
/// ```ignore
/// let users = Table::new(provider, "app", "users")?;
///
/// users.insert(&FieldMap::new().with("name", "alice").with("age", 30)).await?;
/// let alice: User = users.get_by_filter(&FieldMap::new().with("name", "alice")).await?;
/// let active: Vec<User> = users
///     .get_all_by_filter(&FieldMap::new().with("status", "active"))
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct Table<P> {
    provider: P,
    database: String,
    name: String,
    builder: StatementBuilder,
    logger: SqlLogger,
}

impl<P: ConnectionProvider> Table<P> {
    /// Operations on `table` in `database`. The table name may be schema-qualified.
    pub fn new(provider: P, database: impl Into<String>, table: &str) -> OrmResult<Self> {
        Ok(Self {
            provider,
            database: database.into(),
            name: table.to_string(),
            builder: StatementBuilder::new(table)?,
            logger: SqlLogger::default(),
        })
    }

    /// Use a different identifier column (default `id`).
    pub fn id_column(mut self, column: &str) -> OrmResult<Self> {
        self.builder = self.builder.id_column(column)?;
        Ok(self)
    }

    pub fn absence_policy(mut self, policy: AbsencePolicy) -> Self {
        self.builder = self.builder.absence_policy(policy);
        self
    }

    pub fn logger(mut self, logger: SqlLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The statement builder, for inspecting the SQL an operation would run.
    pub fn statements(&self) -> &StatementBuilder {
        &self.builder
    }

    /// Insert one row from the non-absent fields of `data`.
    pub async fn insert(&self, data: &FieldMap) -> OrmResult<()> {
        self.execute("insert", self.builder.insert(data)).await.map(drop)
    }

    /// Insert one row and return its identifier.
    pub async fn insert_returning_id(&self, data: &FieldMap) -> OrmResult<Value> {
        self.scalar("insert", self.builder.insert_returning_id(data))
            .await
    }

    /// Update the non-absent fields of `data` on the row with identifier `id`.
    ///
    /// Returns the number of rows updated.
    pub async fn update_by_id(&self, id: impl Into<Value>, data: &FieldMap) -> OrmResult<u64> {
        self.execute("update_by_id", self.builder.update_by_id(id, data))
            .await
    }

    /// Delete the row with identifier `id`. Returns the number of rows deleted.
    pub async fn delete_by_id(&self, id: impl Into<Value>) -> OrmResult<u64> {
        self.execute("delete_by_id", self.builder.delete_by_id(id))
            .await
    }

    pub async fn exists_by_id(&self, id: impl Into<Value>) -> OrmResult<bool> {
        self.exists("exists_by_id", self.builder.exists_by_id(id))
            .await
    }

    /// Whether any row matches every non-absent field of `filter`.
    ///
    /// A filter with nothing left after absence filtering is [`OrmError::Build`].
    pub async fn exists_by_filter(&self, filter: &FieldMap) -> OrmResult<bool> {
        self.exists("exists_by_filter", self.builder.exists_by_filter(filter))
            .await
    }

    /// The row with identifier `id`, or [`OrmError::NotFound`].
    pub async fn get_by_id<T: Record>(&self, id: impl Into<Value>) -> OrmResult<T> {
        let id = id.into();
        let stmt = self.builder.select_by_id(id.clone());
        let found = self.fetch_opt("get_by_id", stmt).await?;
        found.ok_or_else(|| {
            self.not_found("get_by_id", format!("no row in {} with identifier {id:?}", self.name))
        })
    }

    /// Every row of the table, in the order the server returns them.
    pub async fn get_all<T: Record>(&self) -> OrmResult<Vec<T>> {
        self.fetch_all("get_all", Ok(self.builder.select_all()))
            .await
    }

    /// The first row matching `filter`, or [`OrmError::NotFound`].
    pub async fn get_by_filter<T: Record>(&self, filter: &FieldMap) -> OrmResult<T> {
        let found = self
            .fetch_opt("get_by_filter", self.builder.select_by_filter(filter))
            .await?;
        found.ok_or_else(|| {
            self.not_found("get_by_filter", format!("no row in {} matches the filter", self.name))
        })
    }

    /// Every row matching `filter`; no match is an empty `Vec`.
    pub async fn get_all_by_filter<T: Record>(&self, filter: &FieldMap) -> OrmResult<Vec<T>> {
        self.fetch_all("get_all_by_filter", self.builder.select_by_filter(filter))
            .await
    }

    /// Identifier of the first row matching `filter`, or [`OrmError::NotFound`].
    pub async fn get_id_by_filter(&self, filter: &FieldMap) -> OrmResult<Value> {
        self.scalar("get_id_by_filter", self.builder.select_id_by_filter(filter))
            .await
    }

    async fn execute(&self, op: &str, stmt: OrmResult<Statement>) -> OrmResult<u64> {
        let result = async {
            let stmt = stmt?;
            self.logger.statement(op, &self.name, &stmt);
            let conn = self.provider.connect(&self.database).await?;
            conn.execute(&stmt).await
        }
        .await;
        self.observe(op, result)
    }

    async fn scalar(&self, op: &str, stmt: OrmResult<Statement>) -> OrmResult<Value> {
        let result = async {
            let stmt = stmt?;
            self.logger.statement(op, &self.name, &stmt);
            let conn = self.provider.connect(&self.database).await?;
            conn.query_scalar(&stmt).await
        }
        .await;
        self.observe(op, result)
    }

    async fn exists(&self, op: &str, stmt: OrmResult<Statement>) -> OrmResult<bool> {
        let value = self.scalar(op, stmt).await?;
        let result = match value {
            Value::Bool(b) => Ok(b),
            other => Err(OrmError::mapping(
                "exists",
                format!("expected boolean, got {}", other.kind_name()),
            )),
        };
        self.observe(op, result)
    }

    async fn fetch_opt<T: Record>(
        &self,
        op: &str,
        stmt: OrmResult<Statement>,
    ) -> OrmResult<Option<T>> {
        let result = async {
            let stmt = stmt?;
            self.logger.statement(op, &self.name, &stmt);
            let conn = self.provider.connect(&self.database).await?;
            let rows = conn.query(&stmt).await?;
            mapper::map_opt(rows).await
        }
        .await;
        self.observe(op, result)
    }

    async fn fetch_all<T: Record>(&self, op: &str, stmt: OrmResult<Statement>) -> OrmResult<Vec<T>> {
        let result = async {
            let stmt = stmt?;
            self.logger.statement(op, &self.name, &stmt);
            let conn = self.provider.connect(&self.database).await?;
            let rows = conn.query(&stmt).await?;
            mapper::map_many(rows).await
        }
        .await;
        self.observe(op, result)
    }

    fn not_found(&self, op: &str, message: String) -> OrmError {
        let err = OrmError::not_found(message);
        self.logger.failure(op, &self.name, &err);
        err
    }

    fn observe<T>(&self, op: &str, result: OrmResult<T>) -> OrmResult<T> {
        if let Err(err) = &result {
            self.logger.failure(op, &self.name, err);
        }
        result
    }
}
