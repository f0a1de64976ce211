use jiff::{SignedDuration, Timestamp};

/// Expiration policy for a shortened URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationPolicy {
    /// The shortened URL never expires.
    Never,
    /// The shortened URL expires after a certain duration from now.
    AfterDuration(SignedDuration),
}

impl ExpirationPolicy {
    /// Interprets a configured time-to-live.
    ///
    /// A zero or negative TTL means "store forever".
    pub fn from_ttl(ttl: SignedDuration) -> Self {
        if ttl.is_positive() {
            Self::AfterDuration(ttl)
        } else {
            Self::Never
        }
    }

    /// Resolves the policy into an absolute expiry relative to `now`.
    ///
    /// A duration that would overflow the timestamp range is treated as
    /// never expiring.
    pub fn expire_at(&self, now: Timestamp) -> Option<Timestamp> {
        match self {
            ExpirationPolicy::Never => None,
            ExpirationPolicy::AfterDuration(ttl) => now.checked_add(*ttl).ok(),
        }
    }
}
