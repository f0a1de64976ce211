use crate::slot::{claim_code, DEFAULT_MAX_ATTEMPTS};
use ::redb::{Database, DatabaseError, ReadableTable, TableDefinition};
use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use portal_core::error::{Result, StorageError};
use portal_core::{ExpirationPolicy, Lookup, ShortCode, UrlRecord, UrlStorage};
use portal_generator::{Generator, RandomGenerator};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// The single table holding `short code -> serialized record`.
const URLS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("urls");

/// How long `open` waits for another handle to release the database file.
pub const DEFAULT_OPEN_TIMEOUT: Duration = Duration::from_secs(1);

const OPEN_RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// redb implementation of [`UrlStorage`].
///
/// `put` claims a code and inserts the record inside one write transaction.
/// `get` reads in a read transaction and, when the record turns out to be
/// expired, deletes it in a separate write transaction. Two readers racing on
/// the same expired code may both try to delete it; the delete re-checks
/// expiry and is idempotent.
///
/// redb calls block on disk I/O, so they run on tokio's blocking pool.
pub struct RedbStorage<G = RandomGenerator> {
    db: Arc<Database>,
    generator: Arc<G>,
    max_attempts: usize,
}

impl<G: Generator> RedbStorage<G> {
    /// Opens (or creates) the database at `path` and ensures the `urls`
    /// table exists.
    pub fn open(path: impl AsRef<Path>, generator: G) -> Result<Self> {
        Self::open_with_timeout(path, generator, DEFAULT_OPEN_TIMEOUT)
    }

    /// Like [`open`](Self::open), waiting at most `timeout` for exclusive
    /// access to the file.
    ///
    /// Waiting sleeps the calling thread; from async code, call this through
    /// `tokio::task::spawn_blocking`.
    pub fn open_with_timeout(
        path: impl AsRef<Path>,
        generator: G,
        timeout: Duration,
    ) -> Result<Self> {
        let path = path.as_ref();
        let db = create_database(path, timeout)?;

        let txn = db.begin_write().map_err(map_redb_error)?;
        txn.open_table(URLS).map_err(map_redb_error)?;
        txn.commit().map_err(map_redb_error)?;

        info!(path = %path.display(), "opened redb url storage");

        Ok(Self {
            db: Arc::new(db),
            generator: Arc::new(generator),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        })
    }

    /// Sets how many colliding candidates `put` tolerates before failing.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }
}

impl<G> std::fmt::Debug for RedbStorage<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStorage")
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<G: Generator> UrlStorage for RedbStorage<G> {
    async fn put(&self, url: &str, ttl: SignedDuration) -> Result<ShortCode> {
        let record = UrlRecord {
            original_url: url.to_owned(),
            expire_at: ExpirationPolicy::from_ttl(ttl).expire_at(Timestamp::now()),
        };
        let value = encode_record(&record)?;

        let db = Arc::clone(&self.db);
        let generator = Arc::clone(&self.generator);
        let max_attempts = self.max_attempts;

        let code =
            run_blocking(move || insert_record(&db, generator.as_ref(), max_attempts, &value))
                .await?;

        debug!(code = %code, "stored url in redb");
        Ok(code)
    }

    async fn get(&self, code: &ShortCode) -> Result<Lookup> {
        let db = Arc::clone(&self.db);
        let code = code.clone();

        run_blocking(move || lookup_record(&db, &code)).await
    }

    async fn contains(&self, code: &ShortCode) -> Result<bool> {
        let db = Arc::clone(&self.db);
        let code = code.clone();

        run_blocking(move || Ok(read_record(&db, &code)?.is_some())).await
    }
}

fn create_database(path: &Path, timeout: Duration) -> Result<Database> {
    let deadline = Instant::now() + timeout;

    loop {
        match Database::create(path) {
            Ok(db) => return Ok(db),
            Err(DatabaseError::DatabaseAlreadyOpen) if Instant::now() < deadline => {
                trace!(path = %path.display(), "database file is locked, waiting");
                std::thread::sleep(OPEN_RETRY_INTERVAL);
            }
            Err(DatabaseError::DatabaseAlreadyOpen) => {
                return Err(StorageError::Timeout(format!(
                    "database '{}' still locked after {:?}",
                    path.display(),
                    timeout
                )));
            }
            Err(err) => return Err(map_redb_error(err)),
        }
    }
}

fn insert_record<G: Generator>(
    db: &Database,
    generator: &G,
    max_attempts: usize,
    value: &[u8],
) -> Result<ShortCode> {
    let txn = db.begin_write().map_err(map_redb_error)?;
    let code = {
        let mut table = txn.open_table(URLS).map_err(map_redb_error)?;
        let code = claim_code(generator, max_attempts, |candidate| {
            let taken = table
                .get(candidate.as_bytes())
                .map_err(map_redb_error)?
                .is_some();
            Ok(!taken)
        })?;
        table
            .insert(code.as_bytes(), value)
            .map_err(map_redb_error)?;
        code
    };
    txn.commit().map_err(map_redb_error)?;

    Ok(code)
}

fn read_record(db: &Database, code: &ShortCode) -> Result<Option<UrlRecord>> {
    let txn = db.begin_read().map_err(map_redb_error)?;
    let table = txn.open_table(URLS).map_err(map_redb_error)?;

    let record = match table.get(code.as_bytes()).map_err(map_redb_error)? {
        Some(value) => Some(decode_record(value.value())?),
        None => None,
    };
    Ok(record)
}

fn lookup_record(db: &Database, code: &ShortCode) -> Result<Lookup> {
    let Some(record) = read_record(db, code)? else {
        trace!(code = %code, "short code not found");
        return Ok(Lookup::Missing);
    };

    if !record.is_expired() {
        return Ok(Lookup::Found(record.original_url));
    }

    match evict_expired(db, code) {
        Ok(true) => debug!(code = %code, "evicted expired record"),
        Ok(false) => trace!(code = %code, "expired record already gone"),
        Err(e) => warn!(code = %code, error = %e, "failed to evict expired record"),
    }

    Ok(Lookup::Expired(record.original_url))
}

/// Deletes the record under `code` if it is (still) expired.
fn evict_expired(db: &Database, code: &ShortCode) -> Result<bool> {
    let txn = db.begin_write().map_err(map_redb_error)?;
    let evicted = {
        let mut table = txn.open_table(URLS).map_err(map_redb_error)?;
        let expired = match table.get(code.as_bytes()).map_err(map_redb_error)? {
            Some(value) => decode_record(value.value())?.is_expired(),
            None => false,
        };
        if expired {
            table.remove(code.as_bytes()).map_err(map_redb_error)?;
        }
        expired
    };
    txn.commit().map_err(map_redb_error)?;

    Ok(evicted)
}

async fn run_blocking<T, F>(task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| StorageError::Operation(format!("redb task failed: {e}")))?
}

fn encode_record(record: &UrlRecord) -> Result<Vec<u8>> {
    serde_json::to_vec(record)
        .map_err(|e| StorageError::InvalidData(format!("failed to serialize record: {e}")))
}

fn decode_record(bytes: &[u8]) -> Result<UrlRecord> {
    serde_json::from_slice(bytes)
        .map_err(|e| StorageError::InvalidData(format!("failed to deserialize record: {e}")))
}

fn map_redb_error(err: impl Into<::redb::Error>) -> StorageError {
    let err: ::redb::Error = err.into();
    let message = err.to_string();

    match err {
        ::redb::Error::DatabaseAlreadyOpen | ::redb::Error::Io(_) => {
            StorageError::Unavailable(message)
        }
        ::redb::Error::TableDoesNotExist(_) => StorageError::Query(message),
        ::redb::Error::Corrupted(_) => StorageError::InvalidData(message),
        _ => StorageError::Operation(message),
    }
}
