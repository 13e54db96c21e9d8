//! Error types for mysql-schema-sync

use thiserror::Error;

/// Result type for schema sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of a single statement inside a failed batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementOutcome {
    /// The statement ran before the batch failed; its effect was rolled back
    Executed(String),
    /// The statement that made the batch fail, with the driver message
    Failed(String, String),
    /// The statement was never reached
    NotAttempted(String),
}

impl StatementOutcome {
    /// The statement text this outcome refers to
    pub fn statement(&self) -> &str {
        match self {
            StatementOutcome::Executed(sql)
            | StatementOutcome::Failed(sql, _)
            | StatementOutcome::NotAttempted(sql) => sql,
        }
    }
}

/// Error types for mysql-schema-sync
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection error for `{database}`: {message}")]
    Connection { database: String, message: String },

    #[error("Parse error in `{source_name}`: {message}")]
    Parse { source_name: String, message: String },

    #[error("Batch apply failed on `{database}`: {failed} of {total} statements rolled back")]
    BatchApply {
        database: String,
        failed: usize,
        total: usize,
        outcomes: Vec<StatementOutcome>,
    },

    #[error("Worker pool is saturated, task rejected")]
    PoolSaturated,

    #[error("Worker task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

impl Error {
    /// Build a `BatchApply` error from per-statement outcomes
    pub fn batch_apply(database: &str, outcomes: Vec<StatementOutcome>) -> Self {
        let failed = outcomes
            .iter()
            .filter(|o| matches!(o, StatementOutcome::Failed(..)))
            .count();
        Error::BatchApply {
            database: database.to_string(),
            failed,
            total: outcomes.len(),
            outcomes,
        }
    }
}

/// Convert TOML deserialization errors to config errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::Config(error.to_string())
    }
}
