use crate::error::Result;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

/// A stored URL record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlRecord {
    /// The original URL that was shortened.
    pub original_url: String,
    /// When the record expires, if ever.
    pub expire_at: Option<Timestamp>,
}

impl UrlRecord {
    /// Returns `true` once `now` has reached the record's expiry.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expire_at.is_some_and(|expire_at| now >= expire_at)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Timestamp::now())
    }
}

/// Outcome of resolving a short code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The code maps to a live record.
    Found(String),
    /// The code mapped to a record that had expired; it has been evicted.
    ///
    /// The stale URL is kept for diagnostics only and must not be served.
    Expired(String),
    /// The code is unknown.
    Missing,
}

impl Lookup {
    /// The authoritative "found" flag.
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// Returns the URL only if it may be served.
    pub fn into_url(self) -> Option<String> {
        match self {
            Lookup::Found(url) => Some(url),
            Lookup::Expired(_) | Lookup::Missing => None,
        }
    }

    /// Splits into a `(url, found)` pair. `Missing` yields an empty URL.
    pub fn into_parts(self) -> (String, bool) {
        match self {
            Lookup::Found(url) => (url, true),
            Lookup::Expired(url) => (url, false),
            Lookup::Missing => (String::new(), false),
        }
    }
}

/// Storage for short code to URL associations.
///
/// Implementations generate collision-free codes on [`put`](UrlStorage::put)
/// and expire records lazily: an expired record is removed only when a
/// [`get`](UrlStorage::get) observes it.
#[async_trait]
pub trait UrlStorage: Send + Sync + 'static {
    /// Stores `url` under a freshly generated, unused short code.
    ///
    /// A zero or negative `ttl` stores the record forever. Fails with
    /// [`StorageError::Exhausted`](crate::StorageError::Exhausted) if no free
    /// code was found within the backend's attempt budget.
    async fn put(&self, url: &str, ttl: SignedDuration) -> Result<ShortCode>;

    /// Resolves a short code, evicting the record if it has expired.
    async fn get(&self, code: &ShortCode) -> Result<Lookup>;

    /// Reports whether the key is present, without evaluating expiration.
    async fn contains(&self, code: &ShortCode) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(expire_at: Option<Timestamp>) -> UrlRecord {
        UrlRecord {
            original_url: "https://example.com".to_string(),
            expire_at,
        }
    }

    #[test]
    fn record_without_expiry_never_expires() {
        let far_future = Timestamp::from_second(253_402_207_200).unwrap();
        assert!(!record(None).is_expired_at(far_future));
    }

    #[test]
    fn record_expires_at_boundary() {
        let expire_at = Timestamp::from_second(1_000).unwrap();
        let r = record(Some(expire_at));

        assert!(!r.is_expired_at(Timestamp::from_second(999).unwrap()));
        assert!(r.is_expired_at(expire_at));
        assert!(r.is_expired_at(Timestamp::from_second(1_001).unwrap()));
    }

    #[test]
    fn record_round_trips_through_json() {
        let r = record(Some(Timestamp::from_second(1_700_000_000).unwrap()));
        let json = serde_json::to_vec(&r).unwrap();
        let back: UrlRecord = serde_json::from_slice(&json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn lookup_parts() {
        let url = "https://example.com".to_string();

        assert_eq!(Lookup::Found(url.clone()).into_parts(), (url.clone(), true));
        assert_eq!(
            Lookup::Expired(url.clone()).into_parts(),
            (url.clone(), false)
        );
        assert_eq!(Lookup::Missing.into_parts(), (String::new(), false));
    }

    #[test]
    fn only_found_is_served() {
        assert!(Lookup::Found("a".into()).is_found());
        assert!(!Lookup::Expired("a".into()).is_found());
        assert_eq!(Lookup::Expired("a".into()).into_url(), None);
        assert_eq!(Lookup::Missing.into_url(), None);
    }
}
