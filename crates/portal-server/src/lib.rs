//! HTTP front end of the Portal URL shortener.
//!
//! `POST|GET /shorten/?url=...` stores a URL and answers with its short URL;
//! any other path is treated as a short code and redirected.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;
pub mod telemetry;

pub use app::App;
pub use config::{Config, ConfigError};
pub use state::AppState;
