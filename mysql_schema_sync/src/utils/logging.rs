//! Logging setup
//!
//! Operator-visible output all goes through `tracing`; the preview surface
//! is the `preview` event target, kept apart from the `common` diagnostics
//! the way the rest of the crate logs them.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Initialize the global subscriber from optional configuration.
///
/// Without a `[logging]` section the tool still talks: text format at
/// `info` to stdout, overridable through `RUST_LOG`.
pub fn init_logging(config: &Option<LoggingConfig>) -> Result<()> {
    let default = LoggingConfig {
        level: "info".to_string(),
        format: "text".to_string(),
        stdout: true,
        file: None,
    };
    let config = config.as_ref().unwrap_or(&default);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_lowercase()));
    let json = config.format.to_lowercase() == "json";

    if let Some(file_path) = &config.file {
        if let Some(parent) = Path::new(file_path).parent() {
            fs::create_dir_all(parent)?;
        }
        let file = Arc::new(File::create(file_path)?);

        if json {
            let subscriber = fmt::Subscriber::builder()
                .json()
                .with_env_filter(env_filter)
                .with_writer(file)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| Error::Config(e.to_string()))?;
        } else {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .with_writer(file)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| Error::Config(e.to_string()))?;
        }
    } else if config.stdout {
        if json {
            let subscriber = fmt::Subscriber::builder()
                .json()
                .with_env_filter(env_filter)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| Error::Config(e.to_string()))?;
        } else {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| Error::Config(e.to_string()))?;
        }
    }

    Ok(())
}
