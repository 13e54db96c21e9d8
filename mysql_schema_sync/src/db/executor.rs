//! Transactional batch execution
//!
//! Applies a generated statement batch against one target as a single
//! transaction: foreign-key checks disabled, the batch in order, checks
//! re-enabled, commit. A failing statement rolls the whole batch back and
//! every statement's individual outcome is reported for diagnosis; nothing
//! from a failed batch is left partially applied. There is no automatic
//! retry.

use sqlx::MySqlPool;
use tracing::error;

use crate::error::{Error, Result, StatementOutcome};

/// Executes statement batches against one target database
pub struct BatchExecutor<'a> {
    pool: &'a MySqlPool,
    database: &'a str,
}

impl<'a> BatchExecutor<'a> {
    pub fn new(pool: &'a MySqlPool, database: &'a str) -> Self {
        Self { pool, database }
    }

    /// Apply one batch as one transaction
    pub async fn apply_batch(&self, statements: &[String]) -> Result<()> {
        if statements.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("SET FOREIGN_KEY_CHECKS = 0")
            .execute(&mut *tx)
            .await?;

        for (i, statement) in statements.iter().enumerate() {
            if let Err(e) = sqlx::query(statement).execute(&mut *tx).await {
                let outcomes = classify_outcomes(statements, i, &e);
                if let Err(rollback_err) = tx.rollback().await {
                    error!(
                        database = self.database,
                        error = %rollback_err,
                        "Rollback failed"
                    );
                }
                self.log_outcomes(&outcomes);
                return Err(Error::batch_apply(self.database, outcomes));
            }
        }

        sqlx::query("SET FOREIGN_KEY_CHECKS = 1")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    fn log_outcomes(&self, outcomes: &[StatementOutcome]) {
        for outcome in outcomes {
            match outcome {
                StatementOutcome::Executed(sql) => {
                    error!(database = self.database, sql = %sql, "Execute succeeded, rolled back");
                }
                StatementOutcome::Failed(sql, message) => {
                    error!(database = self.database, sql = %sql, message = %message, "Execute failed");
                }
                StatementOutcome::NotAttempted(sql) => {
                    error!(database = self.database, sql = %sql, "Not attempted, rolled back");
                }
            }
        }
    }
}

/// Classify every statement of a failed batch relative to the failure point
pub fn classify_outcomes(
    statements: &[String],
    failed_at: usize,
    error: &sqlx::Error,
) -> Vec<StatementOutcome> {
    statements
        .iter()
        .enumerate()
        .map(|(i, sql)| {
            if i < failed_at {
                StatementOutcome::Executed(sql.clone())
            } else if i == failed_at {
                StatementOutcome::Failed(sql.clone(), error.to_string())
            } else {
                StatementOutcome::NotAttempted(sql.clone())
            }
        })
        .collect()
}
