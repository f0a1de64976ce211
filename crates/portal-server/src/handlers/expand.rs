use crate::state::AppState;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use portal_core::{Lookup, ShortCode};
use tracing::{debug, warn};

const INDEX_PAGE: &str = include_str!("../../assets/index.html");

/// Redirects a short code to its URL. Serves the index page on `/`.
pub async fn expand_handler(State(state): State<AppState>, uri: Uri) -> Response {
    let path = uri.path();

    if let Ok(code) = ShortCode::parse(path) {
        match state.storage().get(&code).await {
            Ok(Lookup::Found(url)) => match HeaderValue::from_str(&url) {
                Ok(location) => {
                    debug!(code = %code, url = %url, "expanding short code");
                    return (StatusCode::FOUND, [(header::LOCATION, location)]).into_response();
                }
                Err(_) => warn!(code = %code, url = ?url, "stored url is not a valid location"),
            },
            Ok(Lookup::Expired(_)) => debug!(code = %code, "short code expired"),
            Ok(Lookup::Missing) => {}
            Err(e) => warn!(code = %code, error = %e, "failed to look up short code"),
        }
    }

    if path == "/" {
        return Html(INDEX_PAGE).into_response();
    }

    StatusCode::NOT_FOUND.into_response()
}
