//! Connection provider seam.
//!
//! [`ConnectionProvider`] hands out a live [`Connection`] for a named database. Each
//! table or schema operation acquires one, runs its statement(s), and drops it before
//! returning, on success and error paths alike. Pooling is a provider concern only.

use crate::config::ProviderConfig;
use crate::error::{OrmError, OrmResult};
use crate::row::Row;
use crate::statement::Statement;
use crate::value::Value;
use futures_core::Stream;
use futures_util::StreamExt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio_postgres::NoTls;

/// A live handle able to run statements.
pub trait Connection: Send + Sync {
    /// Execute a statement and return the number of affected rows.
    fn execute(&self, stmt: &Statement) -> impl std::future::Future<Output = OrmResult<u64>> + Send;

    /// Execute a query and return its rows as a stream.
    fn query(
        &self,
        stmt: &Statement,
    ) -> impl std::future::Future<Output = OrmResult<RowStream>> + Send;

    /// Execute a query and return the first column of its first row.
    ///
    /// Zero rows is [`OrmError::NotFound`].
    fn query_scalar(
        &self,
        stmt: &Statement,
    ) -> impl std::future::Future<Output = OrmResult<Value>> + Send {
        async move {
            let mut rows = self.query(stmt).await?;
            match rows.next().await {
                Some(row) => Ok(row?.get(0)?.clone()),
                None => Err(OrmError::not_found("Expected one row, got none")),
            }
        }
    }
}

/// Supplies connections for named databases.
pub trait ConnectionProvider: Send + Sync {
    type Conn: Connection;

    fn connect(
        &self,
        database: &str,
    ) -> impl std::future::Future<Output = OrmResult<Self::Conn>> + Send;

    /// Database for server-level statements (`pg_database` lookups, `CREATE DATABASE`).
    fn maintenance_database(&self) -> &str {
        "postgres"
    }
}

impl<P: ConnectionProvider> ConnectionProvider for Arc<P> {
    type Conn = P::Conn;

    fn connect(
        &self,
        database: &str,
    ) -> impl std::future::Future<Output = OrmResult<Self::Conn>> + Send {
        (**self).connect(database)
    }

    fn maintenance_database(&self) -> &str {
        (**self).maintenance_database()
    }
}

/// A stream of result rows.
///
/// Rows are produced as the server sends them; dropping the stream early releases the
/// remaining result.
#[must_use]
pub struct RowStream {
    inner: Pin<Box<dyn Stream<Item = OrmResult<Row>> + Send>>,
}

impl RowStream {
    /// Create a new `RowStream` from any compatible stream.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = OrmResult<Row>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// A stream over already materialized rows.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self::new(futures_util::stream::iter(rows.into_iter().map(Ok)))
    }

    pub fn empty() -> Self {
        Self::from_rows(Vec::new())
    }
}

impl Stream for RowStream {
    type Item = OrmResult<Row>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

/// Adapts a tokio-postgres row stream, decoding each row into [`Row`].
struct PgRowStream {
    inner: Pin<Box<tokio_postgres::RowStream>>,
    columns: Option<Arc<[String]>>,
}

impl Stream for PgRowStream {
    type Item = OrmResult<Row>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(row))) => {
                let columns = self
                    .columns
                    .get_or_insert_with(|| Row::column_names(&row))
                    .clone();
                Poll::Ready(Some(Row::from_pg(&row, &columns)))
            }
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(OrmError::from_db_error(e)))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Connection for tokio_postgres::Client {
    async fn execute(&self, stmt: &Statement) -> OrmResult<u64> {
        tokio_postgres::Client::execute(self, stmt.sql(), &stmt.params())
            .await
            .map_err(OrmError::from_db_error)
    }

    async fn query(&self, stmt: &Statement) -> OrmResult<RowStream> {
        let params = stmt.params();
        let stream = tokio_postgres::Client::query_raw(self, stmt.sql(), params.iter().copied())
            .await
            .map_err(OrmError::from_db_error)?;
        Ok(RowStream::new(PgRowStream {
            inner: Box::pin(stream),
            columns: None,
        }))
    }
}

#[cfg(feature = "pool")]
impl Connection for deadpool_postgres::Client {
    async fn execute(&self, stmt: &Statement) -> OrmResult<u64> {
        let client: &tokio_postgres::Client = self;
        Connection::execute(client, stmt).await
    }

    async fn query(&self, stmt: &Statement) -> OrmResult<RowStream> {
        let client: &tokio_postgres::Client = self;
        Connection::query(client, stmt).await
    }
}

/// Opens a fresh connection per call.
#[derive(Debug, Clone)]
pub struct PgProvider {
    config: ProviderConfig,
}

impl PgProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

impl ConnectionProvider for PgProvider {
    type Conn = tokio_postgres::Client;

    async fn connect(&self, database: &str) -> OrmResult<Self::Conn> {
        let (client, connection) = self
            .config
            .pg_config(database)
            .connect(NoTls)
            .await
            .map_err(|e| OrmError::Connection(format!("{database}: {e}")))?;

        let database = database.to_string();
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(target: "pgrecord.conn", %database, error = %e, "connection closed with error");
            }
        });
        Ok(client)
    }

    fn maintenance_database(&self) -> &str {
        &self.config.maintenance_database
    }
}
