//! Command-line entry point

use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;

use mysql_schema_sync::config::{self, SchemaSource, SyncConfig, TargetConfig};
use mysql_schema_sync::utils::logging;
use mysql_schema_sync::Dispatcher;

#[derive(Parser, Debug)]
#[command(name = "mysql-schema-sync", version, about = "Synchronize MySQL schemas from a source database or SQL script")]
struct Args {
    /// Source: 'mysql#username:password@host:port/database' or a SQL script path
    #[arg(short, long)]
    source: Option<String>,

    /// Target database URI; repeat for multiple targets
    #[arg(short, long)]
    target: Vec<String>,

    /// Compute and display the DDL plan without executing anything
    #[arg(short, long)]
    preview: bool,

    /// Per-target DDL output file; repeat, paired with targets by position
    #[arg(short, long)]
    output: Vec<PathBuf>,

    /// TOML configuration file; flags other than --preview are ignored
    #[arg(short, long)]
    config: Option<String>,
}

impl Args {
    fn into_config(self) -> anyhow::Result<SyncConfig> {
        if let Some(path) = &self.config {
            let mut config = config::load_from_file(path)?;
            config.preview = config.preview || self.preview;
            return Ok(config);
        }

        let Some(source) = &self.source else {
            bail!("Either --config or --source with --target is required");
        };
        let source = SchemaSource::resolve(source)?;

        let targets = self
            .target
            .iter()
            .enumerate()
            .map(|(i, uri)| {
                Ok(TargetConfig {
                    connect: config::ConnectMeta::parse_uri(uri)?,
                    output: self.output.get(i).cloned(),
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let config = SyncConfig {
            source,
            targets,
            preview: self.preview,
            database: Default::default(),
            pool: Default::default(),
            logging: None,
        };
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = args.into_config()?;

    logging::init_logging(&config.logging)?;

    let preview = config.preview;
    let report = Dispatcher::new(config).run().await?;

    let failed = report.targets.iter().filter(|t| t.error.is_some()).count();
    if failed > 0 && !preview {
        bail!("{} of {} target(s) failed to sync", failed, report.targets.len());
    }

    Ok(())
}
