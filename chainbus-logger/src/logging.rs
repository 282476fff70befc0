use std::fs::File;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Plain,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    File,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct LogConfig {
    /// Level or filter directive, e.g. "info" or "chainbus_router=debug".
    /// Overridden by `RUST_LOG` when that is set.
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Required when `output` is "file".
    pub file_path: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Plain,
            output: LogOutput::Stdout,
            file_path: None,
        }
    }
}

/// Installs the global tracing subscriber described by `config`.
///
/// Fails if a subscriber is already installed, so callers that may race
/// (integration tests, embedded services) can ignore the error.
pub fn init(config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));
    let registry = tracing_subscriber::registry().with(filter);

    match config.output {
        LogOutput::File => {
            let file_path = config.file_path.as_deref().ok_or_else(|| {
                anyhow!("Log output is 'file' but 'file-path' is not specified")
            })?;
            let log_file = Arc::new(File::create(file_path)?);

            match config.format {
                LogFormat::Json => registry
                    .with(fmt::layer().with_writer(log_file).json())
                    .try_init(),
                LogFormat::Plain => registry
                    .with(fmt::layer().with_writer(log_file).with_ansi(false))
                    .try_init(),
            }
        }
        LogOutput::Stdout => match config.format {
            LogFormat::Json => registry
                .with(fmt::layer().with_writer(std::io::stdout).json())
                .try_init(),
            LogFormat::Plain => registry
                .with(fmt::layer().with_writer(std::io::stdout).pretty())
                .try_init(),
        },
    }
    .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;

    tracing::debug!(format = ?config.format, output = ?config.output, "logging initialized");
    Ok(())
}
