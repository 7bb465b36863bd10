//! In-memory connection provider for exercising table and schema operations.

#![allow(dead_code)]

use pgrecord::{Connection, ConnectionProvider, OrmError, OrmResult, Row, RowStream, Statement, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Canned reply for the next statement.
pub enum Reply {
    Rows(Vec<Row>),
    Affected(u64),
    Fail(String),
}

#[derive(Default)]
pub struct State {
    /// `(database, statement)` in execution order.
    pub log: Vec<(String, Statement)>,
    pub replies: VecDeque<Reply>,
    pub connects: usize,
    pub releases: usize,
    pub refuse_connections: bool,
}

#[derive(Clone, Default)]
pub struct MockProvider {
    state: Arc<Mutex<State>>,
    maintenance: Option<String>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_maintenance_database(mut self, database: &str) -> Self {
        self.maintenance = Some(database.to_string());
        self
    }

    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn reply(&self, reply: Reply) -> &Self {
        self.state().replies.push_back(reply);
        self
    }

    pub fn reply_rows(&self, columns: &[&str], rows: Vec<Vec<Value>>) -> &Self {
        self.reply(Reply::Rows(rows_of(columns, rows)))
    }

    pub fn reply_bool(&self, value: bool) -> &Self {
        self.reply_rows(&["exists"], vec![vec![Value::Bool(value)]])
    }

    /// SQL text of every statement run so far.
    pub fn sql(&self) -> Vec<String> {
        self.state()
            .log
            .iter()
            .map(|(_, stmt)| stmt.sql().to_string())
            .collect()
    }

    pub fn last(&self) -> Statement {
        self.state().log.last().map(|(_, s)| s.clone()).unwrap()
    }

    pub fn databases(&self) -> Vec<String> {
        self.state().log.iter().map(|(db, _)| db.clone()).collect()
    }

    /// Every acquired connection has been dropped.
    pub fn all_released(&self) -> bool {
        let state = self.state();
        state.connects == state.releases
    }
}

pub fn rows_of(columns: &[&str], rows: Vec<Vec<Value>>) -> Vec<Row> {
    let columns: Arc<[String]> = columns.iter().map(|c| c.to_string()).collect();
    rows.into_iter()
        .map(|values| Row::new(Arc::clone(&columns), values))
        .collect()
}

pub struct MockConn {
    database: String,
    state: Arc<Mutex<State>>,
}

impl MockConn {
    fn next_reply(&self, stmt: &Statement) -> Option<Reply> {
        let mut state = self.state.lock().unwrap();
        state.log.push((self.database.clone(), stmt.clone()));
        state.replies.pop_front()
    }
}

impl Drop for MockConn {
    fn drop(&mut self) {
        self.state.lock().unwrap().releases += 1;
    }
}

impl Connection for MockConn {
    async fn execute(&self, stmt: &Statement) -> OrmResult<u64> {
        match self.next_reply(stmt) {
            Some(Reply::Affected(n)) => Ok(n),
            Some(Reply::Rows(rows)) => Ok(rows.len() as u64),
            Some(Reply::Fail(message)) => Err(OrmError::Other(message)),
            None => Ok(0),
        }
    }

    async fn query(&self, stmt: &Statement) -> OrmResult<RowStream> {
        match self.next_reply(stmt) {
            Some(Reply::Rows(rows)) => Ok(RowStream::from_rows(rows)),
            Some(Reply::Affected(_)) | None => Ok(RowStream::empty()),
            Some(Reply::Fail(message)) => Err(OrmError::Other(message)),
        }
    }
}

impl ConnectionProvider for MockProvider {
    type Conn = MockConn;

    async fn connect(&self, database: &str) -> OrmResult<MockConn> {
        let mut state = self.state();
        if state.refuse_connections {
            return Err(OrmError::Connection(format!("{database}: refused")));
        }
        state.connects += 1;
        Ok(MockConn {
            database: database.to_string(),
            state: Arc::clone(&self.state),
        })
    }

    fn maintenance_database(&self) -> &str {
        self.maintenance.as_deref().unwrap_or("postgres")
    }
}
