use crate::memory::InMemoryStorage;
use crate::redb::RedbStorage;
use crate::slot::DEFAULT_MAX_ATTEMPTS;
use portal_core::error::Result;
use portal_core::{StorageError, UrlStorage};
use portal_generator::random::DEFAULT_LENGTH;
use portal_generator::RandomGenerator;
use serde::Deserialize;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use typed_builder::TypedBuilder;

pub const DEFAULT_DATABASE: &str = "url-storage.redb";

/// Which backend holds the process-wide store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// In-process map, lost on shutdown.
    Map,
    /// redb database file.
    #[serde(alias = "bolt")]
    Redb,
}

impl Display for StorageKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageKind::Map => write!(f, "map"),
            StorageKind::Redb => write!(f, "redb"),
        }
    }
}

/// Everything needed to construct the store at startup.
#[derive(Debug, Clone, TypedBuilder)]
pub struct StorageConfig {
    #[builder(default = StorageKind::Map)]
    pub kind: StorageKind,
    /// Database file, only used by [`StorageKind::Redb`].
    #[builder(default = PathBuf::from(DEFAULT_DATABASE))]
    pub database: PathBuf,
    #[builder(default = DEFAULT_LENGTH)]
    pub uri_length: usize,
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: usize,
}

/// Builds the single store a process serves from.
pub fn open_storage(config: &StorageConfig) -> Result<Arc<dyn UrlStorage>> {
    let generator = RandomGenerator::with_length(config.uri_length)
        .map_err(|e| StorageError::Configuration(e.to_string()))?;

    info!(
        storage = %config.kind,
        uri_length = config.uri_length,
        max_attempts = config.max_attempts,
        "opening url storage"
    );

    match config.kind {
        StorageKind::Map => Ok(Arc::new(
            InMemoryStorage::new(generator).with_max_attempts(config.max_attempts),
        )),
        StorageKind::Redb => Ok(Arc::new(
            RedbStorage::open(&config.database, generator)?
                .with_max_attempts(config.max_attempts),
        )),
    }
}
