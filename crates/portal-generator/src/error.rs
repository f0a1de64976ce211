use thiserror::Error;

/// Errors returned while configuring a generator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("invalid code length {length}; expected 1 to {max}", max = portal_core::shortcode::MAX_LENGTH)]
    InvalidLength { length: usize },
}
