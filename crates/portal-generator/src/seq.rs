use crate::Generator;
use portal_core::shortcode::SEPARATOR;
use portal_core::ShortCode;
use std::sync::atomic::{AtomicU64, Ordering};

/// A deterministic generator producing `/pt000000`, `/pt000001`, ...
///
/// Useful wherever predictable codes are needed, e.g. to provoke and observe
/// collisions in storage backends. The prefix must be alphanumeric for the
/// codes to round-trip through [`ShortCode::parse`].
#[derive(Debug)]
pub struct SeqGenerator {
    counter: AtomicU64,
    prefix: String,
}

impl SeqGenerator {
    /// Creates a sequential generator starting at zero.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::with_offset(prefix, 0)
    }

    /// Creates a sequential generator starting from a specific counter value.
    pub fn with_offset(prefix: impl Into<String>, offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
            prefix: prefix.into(),
        }
    }

    /// Rewinds the counter so the next code is generated from `value`.
    pub fn reset_to(&self, value: u64) {
        self.counter.store(value, Ordering::SeqCst);
    }
}

impl Generator for SeqGenerator {
    type Output = ShortCode;

    fn generate(&self) -> ShortCode {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        ShortCode::new_unchecked(format!("{}{}{:06}", SEPARATOR, self.prefix, count))
    }
}
