use crate::cli::Cli;
use jiff::SignedDuration;
use portal_core::shortcode::MAX_LENGTH;
use portal_storage::{StorageConfig, StorageKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file is missing: {}", .0.display())]
    Missing(PathBuf),
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Resolved process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Fallback host used to build short URLs.
    pub host_name: String,
    /// TTL applied to every shortened URL.
    pub ttl: SignedDuration,
    pub storage: StorageConfig,
}

/// The TOML file layout. Every key is optional and overrides the flag.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    host: Option<String>,
    port: Option<u16>,
    /// Seconds.
    expiring_time: Option<i64>,
    host_name: Option<String>,
    uri_length: Option<usize>,
    url_storage: Option<StorageKind>,
    max_attempts: Option<usize>,
    #[serde(rename = "redb-storage", alias = "bolt-storage", default)]
    redb: RedbSection,
}

#[derive(Debug, Default, Deserialize)]
struct RedbSection {
    database: Option<PathBuf>,
}

impl Config {
    /// Builds the configuration from flags, then applies the `--config` file.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let config = Self::from_cli(cli);

        let config = match &cli.config {
            Some(path) => config.merge_file(path)?,
            None => config,
        };

        config.validate()?;
        Ok(config)
    }

    fn from_cli(cli: &Cli) -> Self {
        Self {
            host: cli.host.clone(),
            port: cli.port,
            host_name: cli.hostname.clone(),
            ttl: SignedDuration::from_secs(cli.ttl),
            storage: StorageConfig::builder()
                .kind(cli.url_storage.into())
                .database(cli.redb_db.clone())
                .uri_length(cli.uri_length)
                .max_attempts(cli.max_attempts)
                .build(),
        }
    }

    fn merge_file(self, path: &Path) -> Result<Self, ConfigError> {
        info!(path = %path.display(), "reading config");

        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        self.merge_str(&contents)
    }

    fn merge_str(mut self, contents: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(contents)?;

        if let Some(host) = file.host {
            self.host = host;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(seconds) = file.expiring_time {
            self.ttl = SignedDuration::from_secs(seconds);
        }
        if let Some(host_name) = file.host_name {
            self.host_name = host_name;
        }
        if let Some(uri_length) = file.uri_length {
            self.storage.uri_length = uri_length;
        }
        if let Some(kind) = file.url_storage {
            self.storage.kind = kind;
        }
        if let Some(max_attempts) = file.max_attempts {
            self.storage.max_attempts = max_attempts;
        }
        if let Some(database) = file.redb.database {
            self.storage.database = database;
        }

        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_LENGTH).contains(&self.storage.uri_length) {
            return Err(ConfigError::Invalid(format!(
                "uri_length must be between 1 and {MAX_LENGTH}, got {}",
                self.storage.uri_length
            )));
        }
        if self.storage.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
