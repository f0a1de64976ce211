//! Core types and traits for the Portal URL shortener.
//!
//! This crate provides the shared vocabulary used by the code generators,
//! the storage backends and the HTTP server: short codes, URL records,
//! expiration policies and the [`UrlStorage`] contract.

pub mod error;
pub mod expiration;
pub mod repository;
pub mod shortcode;

pub use error::{CoreError, StorageError};
pub use expiration::ExpirationPolicy;
pub use repository::{Lookup, UrlRecord, UrlStorage};
pub use shortcode::ShortCode;
