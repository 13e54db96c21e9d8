//! Database connection handling

use std::time::Duration;

use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;

use crate::config::{ConnectMeta, DatabaseSettings};
use crate::error::{Error, Result};

/// Open a connection pool for one database
pub async fn connect(meta: &ConnectMeta, settings: &DatabaseSettings) -> Result<MySqlPool> {
    let pool_size = settings.pool_size.unwrap_or(10);
    let timeout_seconds = settings.timeout_seconds.unwrap_or(30);

    MySqlPoolOptions::new()
        .max_connections(pool_size)
        .acquire_timeout(Duration::from_secs(timeout_seconds))
        .connect(&meta.url())
        .await
        .map_err(|e| Error::Connection {
            database: meta.database.clone(),
            message: e.to_string(),
        })
}
