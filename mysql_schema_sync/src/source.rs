//! Schema source providers
//!
//! The seam between the orchestrator and wherever the source schema lives:
//! a live database reached through introspection, or a static SQL script.
//! The variant is resolved once at configuration time; downstream code
//! only sees the trait.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::config::{ConnectMeta, DatabaseSettings, SchemaSource};
use crate::db;
use crate::error::Result;
use crate::schema::analyzer::SchemaAnalyzer;
use crate::schema::parser;
use crate::schema::types::Schema;

/// Supplies the source schema for a run
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    async fn load(&self) -> Result<Schema>;
}

/// Build the provider matching a resolved schema source
pub fn provider_for(
    source: &SchemaSource,
    settings: &DatabaseSettings,
) -> Box<dyn SchemaProvider> {
    match source {
        SchemaSource::Connection(meta) => Box::new(LiveSchemaProvider {
            meta: meta.clone(),
            settings: settings.clone(),
        }),
        SchemaSource::File(path) => Box::new(ScriptSchemaProvider { path: path.clone() }),
    }
}

/// Loads the schema by introspecting a live database
struct LiveSchemaProvider {
    meta: ConnectMeta,
    settings: DatabaseSettings,
}

#[async_trait]
impl SchemaProvider for LiveSchemaProvider {
    async fn load(&self) -> Result<Schema> {
        let pool = db::connect(&self.meta, &self.settings).await?;
        let schema = SchemaAnalyzer::new(&pool, &self.meta.database)
            .analyze()
            .await?;
        pool.close().await;
        Ok(schema)
    }
}

/// Loads the schema by scanning a static SQL script
struct ScriptSchemaProvider {
    path: PathBuf,
}

#[async_trait]
impl SchemaProvider for ScriptSchemaProvider {
    async fn load(&self) -> Result<Schema> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string());
        Ok(parser::parse_script(&name, &text))
    }
}
