use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use portal_core::StorageError;
use thiserror::Error;
use tracing::warn;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("No url to shorten.")]
    MissingUrl,
    #[error("Url cannot be used as a redirect target.")]
    InvalidUrl,
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::MissingUrl | AppError::InvalidUrl => {
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            AppError::Storage(e) => {
                warn!(error = %e, "storage request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
