//! Pooled connection provider (deadpool-postgres).

use crate::client::ConnectionProvider;
use crate::config::ProviderConfig;
use crate::error::{OrmError, OrmResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tokio_postgres::NoTls;

/// Keeps one pool per database name, created on first use.
///
/// Connections are returned to their pool when the operation drops them.
pub struct PoolProvider {
    config: ProviderConfig,
    pools: Mutex<HashMap<String, Pool>>,
}

impl PoolProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            pools: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// The pool for `database`, building it if needed.
    pub fn pool(&self, database: &str) -> OrmResult<Pool> {
        let mut pools = self.pools.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pool) = pools.get(database) {
            return Ok(pool.clone());
        }
        let pool = build_pool(&self.config, database)?;
        pools.insert(database.to_string(), pool.clone());
        Ok(pool)
    }

    /// Number of databases with an open pool.
    pub fn pool_count(&self) -> usize {
        self.pools
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Close and forget every pool.
    pub fn close(&self) {
        let pools = std::mem::take(&mut *self.pools.lock().unwrap_or_else(PoisonError::into_inner));
        for pool in pools.values() {
            pool.close();
        }
    }
}

impl std::fmt::Debug for PoolProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolProvider")
            .field("config", &self.config)
            .field("pools", &self.pool_count())
            .finish()
    }
}

impl ConnectionProvider for PoolProvider {
    type Conn = deadpool_postgres::Client;

    async fn connect(&self, database: &str) -> OrmResult<Self::Conn> {
        let pool = self.pool(database)?;
        Ok(pool.get().await?)
    }

    fn maintenance_database(&self) -> &str {
        &self.config.maintenance_database
    }
}

fn build_pool(config: &ProviderConfig, database: &str) -> OrmResult<Pool> {
    let manager_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };
    let mgr = Manager::from_config(config.pg_config(database), NoTls, manager_config);
    Pool::builder(mgr)
        .max_size(config.pool_size)
        .build()
        .map_err(|e| OrmError::Connection(format!("{database}: {e}")))
}
