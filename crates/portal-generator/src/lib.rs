pub mod error;
pub mod random;
pub mod seq;

pub use error::GeneratorError;
pub use random::{RandomGenerator, RandomGeneratorSettings};
pub use seq::SeqGenerator;

use portal_core::ShortCode;
use std::sync::Arc;

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with storage;
/// uniqueness is enforced by the storage backend when a code is claimed.
///
/// Implementations can vary from simple random generators to
/// deterministic sequences used in tests.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortCode>;
    /// Generates a candidate short code.
    fn generate(&self) -> Self::Output;
}

impl<G: Generator> Generator for Arc<G> {
    type Output = G::Output;

    fn generate(&self) -> Self::Output {
        (**self).generate()
    }
}
