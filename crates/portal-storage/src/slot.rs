use portal_core::error::Result;
use portal_core::{ShortCode, StorageError};
use portal_generator::Generator;
use tracing::{trace, warn};

/// How many candidates `put` draws before giving up.
///
/// With 62^8 codes a single collision is already rare; 32 in a row means the
/// keyspace is effectively full.
pub const DEFAULT_MAX_ATTEMPTS: usize = 32;

/// Draws candidates until `is_free` accepts one, at most `max_attempts` times.
pub(crate) fn claim_code<G, F>(
    generator: &G,
    max_attempts: usize,
    mut is_free: F,
) -> Result<ShortCode>
where
    G: Generator,
    F: FnMut(&ShortCode) -> Result<bool>,
{
    for attempt in 1..=max_attempts {
        let candidate: ShortCode = generator.generate().into();
        if is_free(&candidate)? {
            return Ok(candidate);
        }
        trace!(code = %candidate, attempt, "short code collision, drawing again");
    }

    warn!(attempts = max_attempts, "no free short code found");
    Err(StorageError::Exhausted {
        attempts: max_attempts,
    })
}
