use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The separator every short code starts with.
///
/// Codes double as request paths, so the separator is part of the code
/// itself and of the persisted key.
pub const SEPARATOR: char = '/';

/// Longest code body (characters after the separator) a request path may carry.
pub const MAX_LENGTH: usize = 64;

/// An identifier for a shortened URL, e.g. `/aB3dK9pQ`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortCode(String);

impl ShortCode {
    /// Parses a short code out of a request path.
    ///
    /// Valid codes are `/` followed by 1-64 ASCII alphanumeric characters.
    pub fn parse(path: impl Into<String>) -> Result<Self, CoreError> {
        let path = path.into();
        Self::validate(&path)?;
        Ok(Self(path))
    }

    /// Creates a `ShortCode` without validation.
    ///
    /// Use this only for codes produced by trusted internal sources
    /// (e.g. generators that are guaranteed to produce valid output).
    pub fn new_unchecked(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Generates the full shortened URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches(SEPARATOR), self.0)
    }

    /// Returns the short code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the raw bytes used as the storage key.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    fn validate(path: &str) -> Result<(), CoreError> {
        let Some(body) = path.strip_prefix(SEPARATOR) else {
            return Err(CoreError::InvalidShortCode(format!(
                "must start with '{}': '{}'",
                SEPARATOR, path
            )));
        };

        if body.is_empty() || body.len() > MAX_LENGTH {
            return Err(CoreError::InvalidShortCode(format!(
                "length must be between 1 and {}, got {}",
                MAX_LENGTH,
                body.len()
            )));
        }

        if !body.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CoreError::InvalidShortCode(format!(
                "must contain only alphanumeric characters: '{}'",
                path
            )));
        }

        Ok(())
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
