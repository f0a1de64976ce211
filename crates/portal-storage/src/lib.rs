//! Storage backends for the Portal URL shortener.
//!
//! Two interchangeable implementations of [`UrlStorage`]:
//!
//! - [`InMemoryStorage`]: a lock-guarded map, lost on shutdown.
//! - [`RedbStorage`]: an embedded, transactional on-disk store.
//!
//! Both generate codes with a [`Generator`](portal_generator::Generator),
//! claim the first unused one within a bounded number of attempts, and expire
//! records lazily on read.
//!
//! ```rust,no_run
//! use jiff::SignedDuration;
//! use portal_storage::{open_storage, StorageConfig, StorageKind};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StorageConfig::builder()
//!     .kind(StorageKind::Redb)
//!     .database("urls.redb".into())
//!     .build();
//! let storage = open_storage(&config)?;
//!
//! let code = storage.put("https://example.com", SignedDuration::from_hours(1)).await?;
//! assert!(storage.get(&code).await?.is_found());
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod memory;
pub mod redb;
mod slot;

pub use backend::{open_storage, StorageConfig, StorageKind};
pub use memory::InMemoryStorage;
pub use portal_core::{Lookup, StorageError, UrlRecord, UrlStorage};
pub use crate::redb::RedbStorage;
pub use slot::DEFAULT_MAX_ATTEMPTS;
