//! mysql-schema-sync: structural schema synchronization for MySQL
//!
//! Compares the schema of a source database (live connection or static SQL
//! script) against one or more target databases, computes the minimal
//! ordered set of DDL statements that makes each target structurally match
//! the source, and previews or applies it per target as transactional
//! batches.

pub mod config;
pub mod db;
pub mod dispatcher;
pub mod error;
pub mod output;
pub mod pool;
pub mod schema;
pub mod source;
pub mod utils;

#[cfg(test)]
mod test;

// Re-export main types for easier access
pub use config::{ConnectMeta, SchemaSource, SyncConfig};
pub use dispatcher::{Dispatcher, SyncReport, TargetReport};
pub use error::{Error, Result, StatementOutcome};
pub use pool::{PoolConfig, WorkerPool};
pub use schema::analyzer::SchemaAnalyzer;
pub use schema::diff::{table_diff, DiffPlan};
pub use schema::types::{Column, Schema, Table};

/// Run a full sync from a loaded configuration
pub async fn run(config: SyncConfig) -> Result<SyncReport> {
    Dispatcher::new(config).run().await
}
