//! Configuration handling for mysql-schema-sync

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::pool::PoolConfig;

/// Load configuration from a TOML file
pub fn load_from_file(path: &str) -> Result<SyncConfig> {
    let config_str = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

    let raw: FileConfig = toml::from_str(&config_str)?;
    raw.resolve()
}

/// The complete run configuration, with the schema source already resolved
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub source: SchemaSource,
    pub targets: Vec<TargetConfig>,
    pub preview: bool,
    pub database: DatabaseSettings,
    pub pool: PoolConfig,
    pub logging: Option<LoggingConfig>,
}

impl SyncConfig {
    /// Reject configurations the run cannot start from
    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(Error::Config("At least one target is required".to_string()));
        }
        Ok(())
    }
}

/// One sync target: a connection plus an optional DDL artifact path
#[derive(Debug, Clone)]
pub struct TargetConfig {
    pub connect: ConnectMeta,
    pub output: Option<PathBuf>,
}

/// Where the source schema comes from, resolved once at configuration time
#[derive(Debug, Clone)]
pub enum SchemaSource {
    Connection(ConnectMeta),
    File(PathBuf),
}

impl SchemaSource {
    /// Resolve a command-line source argument: a `mysql#...` URI becomes a
    /// connection, anything else is taken as a script path.
    pub fn resolve(arg: &str) -> Result<Self> {
        if arg.trim_start_matches(|c| c == '\'' || c == '"').starts_with("mysql#") {
            Ok(SchemaSource::Connection(ConnectMeta::parse_uri(arg)?))
        } else {
            Ok(SchemaSource::File(PathBuf::from(arg)))
        }
    }

    /// Display name of the source: the database name or the file name
    pub fn name(&self) -> String {
        match self {
            SchemaSource::Connection(meta) => meta.database.clone(),
            SchemaSource::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }
}

/// Connection descriptor for one MySQL database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectMeta {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
}

impl ConnectMeta {
    /// Parse the compact URI form `mysql#username:password@host:port/database`
    pub fn parse_uri(uri: &str) -> Result<Self> {
        let cleaned: String = uri.chars().filter(|c| *c != '\'' && *c != '"').collect();
        let pattern = Regex::new(r"^mysql#([^:@#]+):([^@]*)@([^:/@]+):(\d+)/(.+)$")
            .map_err(|e| Error::Config(e.to_string()))?;
        let captures = pattern.captures(&cleaned).ok_or_else(|| {
            Error::Config(format!(
                "Connection URI `{}` does not match mysql#username:password@host:port/database",
                uri
            ))
        })?;

        let port: u16 = captures[4]
            .parse()
            .map_err(|_| Error::Config(format!("Invalid port in URI `{}`", uri)))?;

        Ok(Self {
            username: captures[1].to_string(),
            password: captures[2].to_string(),
            host: captures[3].to_string(),
            port,
            database: captures[5].to_string(),
        })
    }

    /// The sqlx connection URL for this descriptor
    pub fn url(&self) -> String {
        format!(
            "mysql://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }
}

/// Connection pool settings shared by every database in the run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub pool_size: Option<u32>,
    pub timeout_seconds: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub stdout: bool,
    pub file: Option<String>,
}

/// On-disk TOML shape, resolved into [`SyncConfig`] after parsing
#[derive(Debug, Deserialize)]
struct FileConfig {
    source: FileSource,
    targets: Vec<FileTarget>,
    #[serde(default)]
    preview: bool,
    #[serde(default)]
    database: DatabaseSettings,
    #[serde(default)]
    pool: PoolConfig,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize)]
struct FileSource {
    uri: Option<String>,
    file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct FileTarget {
    uri: String,
    output: Option<PathBuf>,
}

impl FileConfig {
    fn resolve(self) -> Result<SyncConfig> {
        let source = match (self.source.uri, self.source.file) {
            (Some(uri), None) => SchemaSource::Connection(ConnectMeta::parse_uri(&uri)?),
            (None, Some(path)) => SchemaSource::File(path),
            _ => {
                return Err(Error::Config(
                    "Source must set exactly one of `uri` or `file`".to_string(),
                ))
            }
        };

        let targets = self
            .targets
            .into_iter()
            .map(|t| {
                Ok(TargetConfig {
                    connect: ConnectMeta::parse_uri(&t.uri)?,
                    output: t.output,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let config = SyncConfig {
            source,
            targets,
            preview: self.preview,
            database: self.database,
            pool: self.pool,
            logging: self.logging,
        };
        config.validate()?;
        Ok(config)
    }
}
