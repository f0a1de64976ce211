use crate::error::{AppError, Result};
use crate::model::ShortenForm;
use crate::state::AppState;
use axum::extract::rejection::FormRejection;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Form;
use tracing::{debug, info};

const FORWARDED_PROTO: &str = "x-forwarded-proto";
const FORWARDED_HOST: &str = "x-forwarded-host";

/// Stores `url` and answers with the short URL: in `Location` for POST, in the
/// body for GET.
///
/// `url` is read from the query string and, when the request carries one,
/// from a url-encoded form body. A body that is not a form is ignored.
pub async fn shorten_handler(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    Query(query): Query<ShortenForm>,
    body: std::result::Result<Form<ShortenForm>, FormRejection>,
) -> Result<Response> {
    let body = match body {
        Ok(Form(body)) => Some(body),
        Err(rejection) => {
            debug!(error = %rejection, "ignoring request body");
            None
        }
    };
    let form = query.merge(body);
    let url = form.url().ok_or(AppError::MissingUrl)?;

    // Stored URLs are replayed verbatim as a `Location` header.
    if HeaderValue::from_str(url).is_err() {
        return Err(AppError::InvalidUrl);
    }

    let code = state.storage().put(url, state.ttl()).await?;
    let location = code.to_url(&base_url(&headers, state.host_name()));
    info!(code = %code, url, "shortened url");

    if method == Method::POST {
        Ok((StatusCode::CREATED, [(header::LOCATION, location)]).into_response())
    } else {
        Ok((StatusCode::CREATED, location).into_response())
    }
}

/// `<scheme>://<host>` as the client sees this server.
fn base_url(headers: &HeaderMap, fallback_host: &str) -> String {
    let scheme = header_str(headers, FORWARDED_PROTO).unwrap_or("http");
    let host = header_str(headers, FORWARDED_HOST)
        .or_else(|| header_str(headers, header::HOST.as_str()))
        .unwrap_or(fallback_host);

    format!("{scheme}://{host}")
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}
