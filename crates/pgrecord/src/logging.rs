//! Per-instance SQL logging via `tracing`.
//!
//! There is no process-wide log level: each [`Table`](crate::Table) and
//! [`Schema`](crate::Schema) carries its own [`SqlLogger`], and the subscriber
//! installed by the application decides what is recorded.

use crate::error::OrmError;
use crate::statement::Statement;
use tracing::Level;

/// Emits the SQL about to run and any failure, under the `pgrecord.sql` target.
#[derive(Debug, Clone)]
pub struct SqlLogger {
    /// Level of statement events. Failures are always emitted at `WARN`.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
    /// Whether statement events are emitted at all.
    pub enabled: bool,
}

impl Default for SqlLogger {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
            enabled: true,
        }
    }
}

impl SqlLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A logger that stays silent for statements (failures are still reported).
    pub fn quiet() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub(crate) fn truncate_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_bytes(sql, max)).into(),
            _ => sql.into(),
        }
    }

    /// Record a statement before it is executed. Argument values are not logged.
    pub fn statement(&self, op: &str, target: &str, stmt: &Statement) {
        if !self.enabled {
            return;
        }

        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let sql = self.truncate_sql(stmt.sql());
        emit_at_level!(
            self.level,
            target: "pgrecord.sql",
            op,
            target_name = target,
            param_count = stmt.args().len(),
            sql = %sql,
            "statement"
        );
    }

    /// Record a failed operation with its cause.
    pub fn failure(&self, op: &str, target: &str, err: &OrmError) {
        tracing::warn!(
            target: "pgrecord.sql",
            op,
            target_name = target,
            error = %err,
            "operation failed"
        );
    }

    /// Record a skipped no-op (e.g. creating a database that already exists).
    pub fn skipped(&self, op: &str, target: &str, reason: &str) {
        tracing::warn!(target: "pgrecord.sql", op, target_name = target, reason, "skipped");
    }
}

fn truncate_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
