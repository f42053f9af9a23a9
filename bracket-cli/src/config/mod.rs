//! Configuration module for bracket-cli.
//!
//! Handles loading configuration from the TOML file, command line arguments
//! and environment variables.

pub mod file;

use bracket_core::config::{BracketConfig, RelayConfig, RuntimeConfig, UpstreamConfig};
use file::FileConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Used when `--config` is not given. A missing file at this path is fine.
pub const DEFAULT_CONFIG_PATH: &str = "./bracket-config.toml";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Values from the command line that win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub tournament_service_url: Option<Url>,
    pub seed: Option<u64>,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    overrides: Overrides,
}

impl ConfigLoader {
    /// `config_path` is an explicitly requested file and must exist; `None`
    /// falls back to [`DEFAULT_CONFIG_PATH`] if present.
    pub fn new(config_path: Option<&Path>, overrides: Overrides) -> Self {
        Self {
            config_path: config_path.map(Path::to_path_buf),
            overrides,
        }
    }

    /// Read the file, apply overrides, validate and build the runtime config.
    pub fn load(&self) -> Result<RuntimeConfig, ConfigError> {
        let mut file_config = self.read_file()?;

        if let Some(url) = self.overrides.tournament_service_url.clone() {
            file_config.upstream.tournament_service_url = Some(url);
        }
        if let Some(seed) = self.overrides.seed {
            file_config.bracket.seed = Some(seed);
        }

        self.build(file_config)
    }

    fn read_file(&self) -> Result<FileConfig, ConfigError> {
        let (path, required) = match &self.config_path {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => {
                tracing::debug!("Configuration loaded from {:?}", path);
                Ok(toml::from_str(&content)?)
            }
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
                Ok(FileConfig::default())
            }
            Err(source) => Err(ConfigError::IoError { path, source }),
        }
    }

    fn build(&self, config: FileConfig) -> Result<RuntimeConfig, ConfigError> {
        let tournament_service_url = config.upstream.tournament_service_url.ok_or_else(|| {
            ConfigError::ValidationError(
                "tournament service url is not set (upstream.tournament_service_url, \
                 --tournament-service-url or TOURNAMENT_SERVICE_URL)"
                    .to_string(),
            )
        })?;
        require_http("tournament service url", &tournament_service_url)?;

        if config.upstream.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "upstream.request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if let Some(relay_url) = &config.events.relay_url {
            require_http("events.relay_url", relay_url)?;
        }
        if config.events.exchange.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "events.exchange must not be empty".to_string(),
            ));
        }

        Ok(RuntimeConfig {
            upstream: UpstreamConfig {
                tournament_service_url,
                request_timeout: Duration::from_secs(config.upstream.request_timeout_secs),
            },
            relay: RelayConfig {
                relay_url: config.events.relay_url,
                exchange: config.events.exchange,
                max_retries: config.events.max_retries,
            },
            bracket: BracketConfig {
                bye_policy: config.bracket.bye_policy,
                seed: config.bracket.seed,
            },
        })
    }
}

fn require_http(name: &str, url: &Url) -> Result<(), ConfigError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::ValidationError(format!(
            "{name} must be http or https, got {other}"
        ))),
    }
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}
