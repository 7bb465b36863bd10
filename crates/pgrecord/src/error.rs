//! Error types for pgrecord

use thiserror::Error;

/// Result type alias for pgrecord operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for statement building, execution and row mapping.
///
/// Every failure is returned to the caller; no component retries or aborts.
#[derive(Debug, Error)]
pub enum OrmError {
    /// A connection for the named database could not be obtained
    #[error("Connection error: {0}")]
    Connection(String),

    /// Invalid combination of inputs to the statement builder
    #[error("Build error: {0}")]
    Build(String),

    /// The store rejected the statement, or communication failed mid-statement
    #[error("Execution error: {source}")]
    Execution {
        #[source]
        source: tokio_postgres::Error,
    },

    /// Row content could not be coerced into the target shape
    #[error("Mapping error on column '{column}': {message}")]
    Mapping { column: String, message: String },

    /// Zero rows where exactly one was required
    #[error("Not found: {0}")]
    NotFound(String),

    /// The value handed to the flattener is neither a record nor a map
    #[error("Unsupported shape: {0}")]
    UnsupportedShape(String),

    /// A pooled connection could not be checked out
    #[cfg(feature = "pool")]
    #[error("Pool error: {source}")]
    Pool {
        #[source]
        source: deadpool_postgres::PoolError,
    },

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl OrmError {
    /// Create a build error
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build(message.into())
    }

    /// Create a mapping error for a specific column
    pub fn mapping(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Mapping {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create an unsupported shape error
    pub fn unsupported_shape(message: impl Into<String>) -> Self {
        Self::UnsupportedShape(message.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a build error
    pub fn is_build(&self) -> bool {
        matches!(self, Self::Build(_))
    }

    /// Check if this is a mapping error
    pub fn is_mapping(&self) -> bool {
        matches!(self, Self::Mapping { .. })
    }

    /// SQLSTATE code reported by the server, if the failure came from one.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::Execution { source } => source.as_db_error().map(|e| e.code().code()),
            _ => None,
        }
    }

    /// Wrap a tokio_postgres error.
    ///
    /// Connection loss and server-side rejections end up in the same variant; the
    /// original error stays attached as the source for diagnostics.
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        Self::Execution { source: err }
    }
}

impl From<tokio_postgres::Error> for OrmError {
    fn from(err: tokio_postgres::Error) -> Self {
        Self::from_db_error(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for OrmError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool { source: err }
    }
}
