use clap::{Parser, ValueEnum};
use portal_storage::backend::DEFAULT_DATABASE;
use portal_storage::{StorageKind, DEFAULT_MAX_ATTEMPTS};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const CONFIG_ENV: &str = "PORTAL_CONFIG";
pub const URL_STORAGE_ENV: &str = "PORTAL_URL_STORAGE";
pub const URI_LENGTH_ENV: &str = "PORTAL_URI_LENGTH";
pub const TTL_ENV: &str = "PORTAL_TTL";
pub const HOST_ENV: &str = "PORTAL_HOST";
pub const PORT_ENV: &str = "PORTAL_PORT";
pub const HOSTNAME_ENV: &str = "PORTAL_HOSTNAME";
pub const REDB_DATABASE_ENV: &str = "PORTAL_REDB_DB";
pub const MAX_ATTEMPTS_ENV: &str = "PORTAL_MAX_ATTEMPTS";
pub const LOG_FORMAT_ENV: &str = "PORTAL_LOG_FORMAT";

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_URI_LENGTH: usize = 8;
pub const DEFAULT_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "map")]
    Map,
    #[value(name = "redb", alias = "bolt")]
    Redb,
}

impl From<StorageBackendArg> for StorageKind {
    fn from(value: StorageBackendArg) -> Self {
        match value {
            StorageBackendArg::Map => StorageKind::Map,
            StorageBackendArg::Redb => StorageKind::Redb,
        }
    }
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", StorageKind::from(*self))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Command line flags. Values found in the `--config` TOML file win.
#[derive(Debug, Parser)]
#[command(name = "portal", about = "Simple URL shortener")]
pub struct Cli {
    /// Path to a TOML config file.
    #[arg(long, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// How to store URLs.
    #[arg(
        long,
        env = URL_STORAGE_ENV,
        value_enum,
        default_value_t = StorageBackendArg::Map
    )]
    pub url_storage: StorageBackendArg,

    /// Length of randomly generated codes.
    #[arg(long, env = URI_LENGTH_ENV, default_value_t = DEFAULT_URI_LENGTH)]
    pub uri_length: usize,

    /// Time to live of a short URL in seconds; zero or less keeps it forever.
    #[arg(
        long,
        env = TTL_ENV,
        default_value_t = DEFAULT_TTL_SECS,
        allow_negative_numbers = true
    )]
    pub ttl: i64,

    /// Address to listen on.
    #[arg(long, env = HOST_ENV, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = PORT_ENV, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Host name used to build short URLs when the request carries none.
    #[arg(long, env = HOSTNAME_ENV, default_value = "")]
    pub hostname: String,

    /// Path to the redb database file.
    #[arg(long, env = REDB_DATABASE_ENV, default_value = DEFAULT_DATABASE)]
    pub redb_db: PathBuf,

    /// Colliding codes tolerated per shorten request before giving up.
    #[arg(long, env = MAX_ATTEMPTS_ENV, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: usize,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}
