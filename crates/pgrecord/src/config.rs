//! Connection provider configuration.

use crate::error::{OrmError, OrmResult};
use std::time::Duration;

/// Server location, credentials and pool sizing shared by every database a provider
/// connects to. The database name itself is chosen per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    /// Maximum connections per database pool (pooled providers only).
    pub pool_size: usize,
    /// Connect timeout. `None` means wait for the OS.
    pub connect_timeout: Option<Duration>,
    pub application_name: Option<String>,
    /// Database used for server-level statements (`CREATE DATABASE`, `pg_database` lookups).
    pub maintenance_database: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: None,
            pool_size: 16,
            connect_timeout: None,
            application_name: None,
            maintenance_database: "postgres".to_string(),
        }
    }
}

impl ProviderConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from `PGRECORD_*` environment variables.
    ///
    /// Recognized: `PGRECORD_HOST`, `PGRECORD_PORT`, `PGRECORD_USER`,
    /// `PGRECORD_PASSWORD`, `PGRECORD_POOL_SIZE`, `PGRECORD_CONNECT_TIMEOUT_SECS`,
    /// `PGRECORD_APPLICATION_NAME`, `PGRECORD_MAINTENANCE_DB`. Unset variables keep
    /// their defaults; unparsable numbers are an error.
    pub fn from_env() -> OrmResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> OrmResult<Self> {
        let mut config = Self::default();
        if let Some(host) = lookup("PGRECORD_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PGRECORD_PORT") {
            config.port = parse_var("PGRECORD_PORT", &port)?;
        }
        if let Some(user) = lookup("PGRECORD_USER") {
            config.user = user;
        }
        config.password = lookup("PGRECORD_PASSWORD").or(config.password);
        if let Some(size) = lookup("PGRECORD_POOL_SIZE") {
            config.pool_size = parse_var("PGRECORD_POOL_SIZE", &size)?;
        }
        if let Some(secs) = lookup("PGRECORD_CONNECT_TIMEOUT_SECS") {
            config.connect_timeout = Some(Duration::from_secs(parse_var(
                "PGRECORD_CONNECT_TIMEOUT_SECS",
                &secs,
            )?));
        }
        config.application_name = lookup("PGRECORD_APPLICATION_NAME").or(config.application_name);
        if let Some(db) = lookup("PGRECORD_MAINTENANCE_DB") {
            config.maintenance_database = db;
        }
        Ok(config)
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    pub fn maintenance_database(mut self, name: impl Into<String>) -> Self {
        self.maintenance_database = name.into();
        self
    }

    /// tokio-postgres configuration for `database`.
    pub fn pg_config(&self, database: &str) -> tokio_postgres::Config {
        let mut pg = tokio_postgres::Config::new();
        pg.host(&self.host)
            .port(self.port)
            .user(&self.user)
            .dbname(database);
        if let Some(password) = &self.password {
            pg.password(password);
        }
        if let Some(timeout) = self.connect_timeout {
            pg.connect_timeout(timeout);
        }
        if let Some(name) = &self.application_name {
            pg.application_name(name);
        }
        pg
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> OrmResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| OrmError::Other(format!("invalid {key}={raw:?}: {e}")))
}
