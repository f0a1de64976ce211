use crate::slot::{claim_code, DEFAULT_MAX_ATTEMPTS};
use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use parking_lot::Mutex;
use portal_core::error::Result;
use portal_core::{ExpirationPolicy, Lookup, ShortCode, UrlRecord, UrlStorage};
use portal_generator::{Generator, RandomGenerator};
use std::collections::HashMap;
use tracing::{debug, trace};

/// In-memory implementation of [`UrlStorage`].
///
/// Every operation runs under one mutex, including the whole
/// generate-and-check loop of `put`, so no two callers can claim the same
/// code. Nothing survives a restart.
#[derive(Debug)]
pub struct InMemoryStorage<G = RandomGenerator> {
    records: Mutex<HashMap<ShortCode, UrlRecord>>,
    generator: G,
    max_attempts: usize,
}

impl<G: Generator> InMemoryStorage<G> {
    /// Creates an empty store drawing codes from `generator`.
    pub fn new(generator: G) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            generator,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets how many colliding candidates `put` tolerates before failing.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Number of stored records, expired-but-unread ones included.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl<G: Generator> UrlStorage for InMemoryStorage<G> {
    async fn put(&self, url: &str, ttl: SignedDuration) -> Result<ShortCode> {
        let record = UrlRecord {
            original_url: url.to_owned(),
            expire_at: ExpirationPolicy::from_ttl(ttl).expire_at(Timestamp::now()),
        };

        let mut records = self.records.lock();
        let code = claim_code(&self.generator, self.max_attempts, |candidate| {
            Ok(!records.contains_key(candidate))
        })?;
        records.insert(code.clone(), record);

        debug!(code = %code, "stored url in memory");
        Ok(code)
    }

    async fn get(&self, code: &ShortCode) -> Result<Lookup> {
        let mut records = self.records.lock();

        match records.get(code) {
            None => {
                trace!(code = %code, "short code not found");
                return Ok(Lookup::Missing);
            }
            Some(record) if !record.is_expired() => {
                return Ok(Lookup::Found(record.original_url.clone()));
            }
            Some(_) => {}
        }

        debug!(code = %code, "evicting expired record");
        Ok(records
            .remove(code)
            .map_or(Lookup::Missing, |record| Lookup::Expired(record.original_url)))
    }

    async fn contains(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.records.lock().contains_key(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::StorageError;
    use portal_generator::SeqGenerator;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    fn storage() -> InMemoryStorage {
        InMemoryStorage::new(RandomGenerator::with_length(8).unwrap())
    }

    #[tokio::test]
    async fn put_and_get() {
        let storage = storage();

        let code = storage
            .put("https://example.com", SignedDuration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(code.as_str().len(), 9);
        assert!(code.as_str().starts_with('/'));
        assert_eq!(
            storage.get(&code).await.unwrap(),
            Lookup::Found("https://example.com".to_string())
        );
    }

    #[tokio::test]
    async fn get_nonexistent() {
        let storage = storage();

        let result = storage.get(&ShortCode::new_unchecked("/nope")).await.unwrap();
        assert_eq!(result, Lookup::Missing);
    }

    #[tokio::test]
    async fn expired_entry_is_evicted_on_read() {
        let storage = storage();

        let code = storage
            .put("https://example.com", SignedDuration::from_millis(50))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert!(storage.contains(&code).await.unwrap());
        assert_eq!(
            storage.get(&code).await.unwrap(),
            Lookup::Expired("https://example.com".to_string())
        );
        assert!(!storage.contains(&code).await.unwrap());
    }

    #[tokio::test]
    async fn repeated_get_on_expired_code_stays_not_found() {
        let storage = storage();

        let code = storage
            .put("https://example.com", SignedDuration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!storage.get(&code).await.unwrap().is_found());
        assert!(!storage.get(&code).await.unwrap().is_found());
        assert!(!storage.get(&code).await.unwrap().is_found());
    }

    #[tokio::test]
    async fn expired_but_unread_record_stays_stored() {
        let storage = storage();

        storage
            .put("https://example.com", SignedDuration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        // No sweep: only a read removes it.
        assert_eq!(storage.len(), 1);
    }

    #[tokio::test]
    async fn non_positive_ttl_stores_forever() {
        let storage = storage();

        let zero = storage.put("https://zero.com", SignedDuration::ZERO).await.unwrap();
        let negative = storage
            .put("https://negative.com", SignedDuration::from_secs(-1))
            .await
            .unwrap();

        {
            let records = storage.records.lock();
            assert_eq!(records[&zero].expire_at, None);
            assert_eq!(records[&negative].expire_at, None);
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(storage.get(&zero).await.unwrap().is_found());
        assert!(storage.get(&negative).await.unwrap().is_found());
    }

    #[tokio::test]
    async fn collision_draws_a_new_code() {
        let generator = Arc::new(SeqGenerator::with_prefix("pt"));
        let storage = InMemoryStorage::new(Arc::clone(&generator));

        let first = storage.put("https://one.com", SignedDuration::ZERO).await.unwrap();
        generator.reset_to(0);
        let second = storage.put("https://two.com", SignedDuration::ZERO).await.unwrap();

        assert_eq!(first.as_str(), "/pt000000");
        assert_eq!(second.as_str(), "/pt000001");
        assert_eq!(
            storage.get(&first).await.unwrap(),
            Lookup::Found("https://one.com".to_string())
        );
    }

    #[tokio::test]
    async fn same_url_at_colliding_code_is_not_overwritten() {
        let generator = Arc::new(SeqGenerator::with_prefix("pt"));
        let storage = InMemoryStorage::new(Arc::clone(&generator));

        let first = storage.put("https://same.com", SignedDuration::ZERO).await.unwrap();
        generator.reset_to(0);
        let second = storage.put("https://same.com", SignedDuration::ZERO).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(storage.len(), 2);
    }

    #[tokio::test]
    async fn exhausted_keyspace_fails() {
        let generator = Arc::new(SeqGenerator::with_prefix("pt"));
        let storage = InMemoryStorage::new(Arc::clone(&generator)).with_max_attempts(3);

        for _ in 0..3 {
            storage.put("https://example.com", SignedDuration::ZERO).await.unwrap();
        }
        generator.reset_to(0);

        let err = storage
            .put("https://example.com", SignedDuration::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Exhausted { attempts: 3 }));
        assert_eq!(storage.len(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_puts_yield_distinct_retrievable_codes() {
        let storage = Arc::new(storage());
        let mut handles = vec![];

        for i in 0..64u64 {
            let storage = Arc::clone(&storage);
            handles.push(tokio::spawn(async move {
                let url = format!("https://example{}.com", i);
                let code = storage.put(&url, SignedDuration::ZERO).await.unwrap();
                (code, url)
            }));
        }

        let mut results = vec![];
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        let codes: HashSet<_> = results.iter().map(|(code, _)| code.clone()).collect();
        assert_eq!(codes.len(), 64);

        for (code, url) in results {
            assert_eq!(storage.get(&code).await.unwrap(), Lookup::Found(url));
        }
    }
}
