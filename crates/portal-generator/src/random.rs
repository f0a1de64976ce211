use crate::error::GeneratorError;
use crate::Generator;
use jiff::Timestamp;
use parking_lot::Mutex;
use portal_core::shortcode::{MAX_LENGTH, SEPARATOR};
use portal_core::ShortCode;
use typed_builder::TypedBuilder;

const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Number of random characters in a code when nothing else is configured.
pub const DEFAULT_LENGTH: usize = 8;

/// Configures a [`RandomGenerator`].
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct RandomGeneratorSettings {
    /// Number of random characters after the separator, at most
    /// [`MAX_LENGTH`].
    #[builder(default = DEFAULT_LENGTH)]
    pub length: usize,
    /// Fixed seed for reproducible sequences. Seeded from the clock when unset.
    #[builder(default, setter(strip_option))]
    pub seed: Option<u64>,
}

/// Draws codes uniformly, with replacement, from `[a-zA-Z0-9]`.
///
/// The randomness state is seeded once at construction. Codes are
/// hard-to-guess tokens, not credentials: no cryptographic guarantees.
#[derive(Debug)]
pub struct RandomGenerator {
    length: usize,
    rng: Mutex<fastrand::Rng>,
}

impl RandomGenerator {
    pub fn new(settings: RandomGeneratorSettings) -> Result<Self, GeneratorError> {
        if !(1..=MAX_LENGTH).contains(&settings.length) {
            return Err(GeneratorError::InvalidLength {
                length: settings.length,
            });
        }

        let seed = settings.seed.unwrap_or_else(clock_seed);

        Ok(Self {
            length: settings.length,
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
        })
    }

    /// Creates a clock-seeded generator producing codes of `length` characters.
    pub fn with_length(length: usize) -> Result<Self, GeneratorError> {
        Self::new(RandomGeneratorSettings::builder().length(length).build())
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn next_code(&self) -> ShortCode {
        let mut code = String::with_capacity(self.length + 1);
        code.push(SEPARATOR);

        let mut rng = self.rng.lock();
        for _ in 0..self.length {
            code.push(char::from(ALPHABET[rng.usize(..ALPHABET.len())]));
        }

        ShortCode::new_unchecked(code)
    }
}

impl Generator for RandomGenerator {
    type Output = ShortCode;

    fn generate(&self) -> Self::Output {
        self.next_code()
    }
}

// Truncation is fine here: only the low bits vary between process starts.
fn clock_seed() -> u64 {
    Timestamp::now().as_nanosecond() as u64
}
