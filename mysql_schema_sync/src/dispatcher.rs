//! Sync orchestration
//!
//! Drives one source and N targets through two barrier-separated phases on
//! a shared bounded worker pool. Phase A parses every schema concurrently;
//! a source failure aborts the run, a target failure degrades that target
//! to an empty schema. Phase B diffs and previews/applies each target
//! concurrently; targets never share mutable state, so the only shared
//! resource is the pool itself.

use std::sync::Arc;

use futures::future::join_all;
use sqlx::MySqlPool;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::{DatabaseSettings, SyncConfig, TargetConfig};
use crate::db::{self, BatchExecutor};
use crate::error::{Error, Result};
use crate::output;
use crate::pool::{PoolConfig, WorkerPool};
use crate::schema::analyzer::SchemaAnalyzer;
use crate::schema::diff::DiffPlan;
use crate::schema::types::Schema;
use crate::source;

/// Orchestrates a full sync run
pub struct Dispatcher {
    config: SyncConfig,
}

/// Result of a whole run, one entry per target
#[derive(Debug)]
pub struct SyncReport {
    pub targets: Vec<TargetReport>,
}

impl SyncReport {
    pub fn all_succeeded(&self) -> bool {
        self.targets.iter().all(|t| t.error.is_none())
    }
}

/// Summary of one target's sync
#[derive(Debug)]
pub struct TargetReport {
    pub database: String,
    pub tables_created: usize,
    pub tables_dropped: usize,
    pub tables_modified: usize,
    pub statements: usize,
    pub error: Option<String>,
}

/// Everything one target owns for the duration of its tasks
struct TargetContext {
    config: TargetConfig,
    pool: Option<MySqlPool>,
    schema: Schema,
}

impl Dispatcher {
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    /// Run both phases and report per-target outcomes
    pub async fn run(&self) -> Result<SyncReport> {
        self.config.validate()?;

        // The queue must at least fit one submission per database, source
        // included, or Phase A would reject its own tasks.
        let pool_config = PoolConfig {
            workers: self.config.pool.workers,
            queue_capacity: self
                .config
                .pool
                .queue_capacity
                .max(self.config.targets.len() + 1),
        };
        let pool = WorkerPool::new(&pool_config);

        let contexts = self.init_phase(&pool).await?;
        let reports = self.sync_phase(&pool, contexts).await?;

        for report in &reports {
            match &report.error {
                None => info!(
                    database = %report.database,
                    statements = report.statements,
                    "Target sync finished"
                ),
                Some(message) => error!(
                    database = %report.database,
                    error = %message,
                    "Target sync failed"
                ),
            }
        }

        Ok(SyncReport { targets: reports })
    }

    /// Phase A: schedule the source parse and every target parse, then wait
    /// for all of them.
    async fn init_phase(&self, pool: &WorkerPool) -> Result<(Arc<Schema>, Vec<TargetContext>)> {
        let provider = source::provider_for(&self.config.source, &self.config.database);
        let source_handle = pool.submit(async move { provider.load().await })?;

        let mut target_handles: Vec<JoinHandle<TargetContext>> = Vec::new();
        for target in self.config.targets.clone() {
            let settings = self.config.database.clone();
            target_handles.push(pool.submit(async move {
                let database = target.connect.database.clone();
                match load_target(&target, &settings).await {
                    Ok((pool, schema)) => TargetContext {
                        config: target,
                        pool: Some(pool),
                        schema,
                    },
                    Err(e) => {
                        // The target still takes part in the diff phase: an
                        // empty schema surfaces as "create everything"
                        // instead of a silently skipped target.
                        warn!(
                            database = %database,
                            error = %e,
                            "Target init failed, proceeding with empty schema"
                        );
                        TargetContext {
                            config: target,
                            pool: None,
                            schema: Schema::new(&database),
                        }
                    }
                }
            })?);
        }

        let source_schema = source_handle
            .await
            .map_err(|e| Error::Task(e.to_string()))??;
        info!(
            source = %source_schema.name,
            tables = source_schema.tables.len(),
            "Source schema loaded"
        );

        let mut contexts = Vec::with_capacity(target_handles.len());
        for handle in join_all(target_handles).await {
            contexts.push(handle.map_err(|e| Error::Task(e.to_string()))?);
        }

        Ok((Arc::new(source_schema), contexts))
    }

    /// Phase B: one concurrent task per target: partition, plan, preview or
    /// apply, artifact, release.
    async fn sync_phase(
        &self,
        pool: &WorkerPool,
        (source_schema, contexts): (Arc<Schema>, Vec<TargetContext>),
    ) -> Result<Vec<TargetReport>> {
        let preview = self.config.preview;

        let mut handles = Vec::with_capacity(contexts.len());
        for context in contexts {
            let source_schema = Arc::clone(&source_schema);
            handles.push(pool.submit(async move {
                sync_target(&source_schema, context, preview).await
            })?);
        }

        let mut reports = Vec::with_capacity(handles.len());
        for handle in join_all(handles).await {
            reports.push(handle.map_err(|e| Error::Task(e.to_string()))?);
        }
        Ok(reports)
    }
}

async fn load_target(
    target: &TargetConfig,
    settings: &DatabaseSettings,
) -> Result<(MySqlPool, Schema)> {
    let pool = db::connect(&target.connect, settings).await?;
    let schema = SchemaAnalyzer::new(&pool, &target.connect.database)
        .analyze()
        .await?;
    Ok((pool, schema))
}

async fn sync_target(source: &Schema, context: TargetContext, preview: bool) -> TargetReport {
    let database = context.config.connect.database.clone();
    let plan = DiffPlan::build(source, &context.schema);
    info!(
        database = %database,
        creates = plan.create_tables.len(),
        drops = plan.drop_tables.len(),
        modifies = plan.modify_tables.len(),
        "Plan computed"
    );

    let mut failure: Option<Error> = None;

    if preview {
        info!(target: "preview", "=== `{}` DDL Preview Start ===", database);
        for statement in plan.all_statements() {
            info!(target: "preview", "{}", statement);
        }
        info!(target: "preview", "=== `{}` DDL Preview End ===", database);
    } else if !plan.is_empty() {
        match &context.pool {
            Some(pool) => {
                let executor = BatchExecutor::new(pool, &database);
                failure = apply_plan(&executor, &plan).await.err();
            }
            None => {
                failure = Some(Error::Connection {
                    database: database.clone(),
                    message: "target unavailable, plan not applied".to_string(),
                });
            }
        }
    }

    if let Some(path) = &context.config.output {
        if let Err(e) = output::write_ddl_file(path, &database, &plan) {
            error!(
                database = %database,
                path = %path.display(),
                error = %e,
                "Failed to write DDL artifact"
            );
        }
    }

    if let Some(pool) = context.pool {
        pool.close().await;
    }

    TargetReport {
        database,
        tables_created: plan.create_tables.len(),
        tables_dropped: plan.drop_tables.len(),
        tables_modified: plan.modify_tables.len(),
        statements: plan.statement_count(),
        error: failure.map(|e| e.to_string()),
    }
}

/// One transaction for the create/drop batch, then one per modified table.
/// A failed batch marks the target failed but later tables are still
/// attempted; every batch is all-or-nothing on its own.
async fn apply_plan(executor: &BatchExecutor<'_>, plan: &DiffPlan) -> Result<()> {
    let mut first_failure: Option<Error> = None;

    if let Err(e) = executor.apply_batch(&plan.table_batch()).await {
        first_failure.get_or_insert(e);
    }

    for statements in plan.modify_tables.values() {
        if let Err(e) = executor.apply_batch(statements).await {
            first_failure.get_or_insert(e);
        }
    }

    match first_failure {
        None => Ok(()),
        Some(e) => Err(e),
    }
}
