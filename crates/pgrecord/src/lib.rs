//! # pgrecord
//!
//! Dynamic CRUD statements and shape-driven row mapping for PostgreSQL.
//!
//! ## Overview
//!
//! - **FieldMap** - ordered name → [`Value`] pairs; null, `""`, `0` and `"-"` count as
//!   "not provided" and are dropped before a statement is built ([`AbsencePolicy`])
//! - **StatementBuilder** - `INSERT`/`UPDATE`/`DELETE`/`SELECT`/`EXISTS` text with every
//!   value bound as `$n` and every identifier quoted
//! - **Result mapping** - rows are matched to a [`RecordShape`] by exact column name and
//!   streamed into records ([`map_one`], [`map_many`])
//! - **Flattening** - records (or any `Serialize` struct) become a [`FieldMap`]
//! - **Table / Schema** - one statement per operation over a [`ConnectionProvider`]
//!
//! ```ignore
//! use pgrecord::prelude::*;
//!
//! #[derive(Record, Debug)]
//! struct User {
//!     id: i64,
//!     name: String,
//!     age: i32,
//! }
//!
//! let provider = PoolProvider::new(ProviderConfig::from_env()?);
//! let users = Table::new(provider, "app", "users")?;
//!
//! users.insert(&FieldMap::new().with("name", "alice").with("age", 30)).await?;
//! let active: Vec<User> = users
//!     .get_all_by_filter(&FieldMap::new().with("status", "active").with("age", 0))
//!     .await?; // SELECT * FROM "users" WHERE status = $1
//! ```

pub mod builder;
pub mod client;
pub mod condition;
pub mod config;
pub mod error;
pub mod field_map;
pub mod flatten;
pub mod ident;
pub mod logging;
pub mod mapper;
pub mod prelude;
pub mod record;
pub mod row;
pub mod schema;
pub mod shape;
pub mod statement;
pub mod table;
pub mod value;

#[cfg(feature = "pool")]
pub mod pool;

pub use builder::StatementBuilder;
pub use client::{Connection, ConnectionProvider, PgProvider, RowStream};
pub use condition::{Condition, Op};
pub use config::ProviderConfig;
pub use error::{OrmError, OrmResult};
pub use field_map::{AbsencePolicy, FieldMap};
pub use flatten::flatten;
pub use ident::{Ident, IdentPart, IntoIdent, quote_ident};
pub use logging::SqlLogger;
pub use mapper::{RecordStream, map_many, map_one, map_opt, map_row};
pub use record::{FieldType, Record};
pub use row::Row;
pub use schema::{Column, Schema};
pub use shape::{FieldShape, RecordShape};
pub use statement::Statement;
pub use table::Table;
pub use value::{Kind, Value};

#[cfg(feature = "pool")]
pub use pool::PoolProvider;

#[cfg(feature = "derive")]
pub use pgrecord_derive::Record;
