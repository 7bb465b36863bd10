//! Convenient imports for typical `pgrecord` usage.
//!
//! ```ignore
//! use pgrecord::prelude::*;
//! ```

pub use crate::{
    AbsencePolicy, Column, Connection, ConnectionProvider, FieldMap, FieldType, Kind, OrmError,
    OrmResult, PgProvider, ProviderConfig, Record, RecordShape, Schema, SqlLogger, Table, Value,
    flatten,
};

#[cfg(feature = "pool")]
pub use crate::PoolProvider;
