use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{expand_handler, shorten_handler};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/shorten/", get(shorten_handler).post(shorten_handler))
            .fallback(expand_handler)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::Response;
    use jiff::SignedDuration;
    use portal_core::error::Result as StorageResult;
    use portal_core::{Lookup, ShortCode, StorageError, UrlStorage};
    use portal_generator::SeqGenerator;
    use portal_storage::InMemoryStorage;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    const FORM: &str = "application/x-www-form-urlencoded";

    fn storage() -> Arc<InMemoryStorage<SeqGenerator>> {
        Arc::new(InMemoryStorage::new(SeqGenerator::with_prefix("pt")))
    }

    fn router(storage: Arc<dyn UrlStorage>) -> Router {
        App::router(AppState::new(storage, SignedDuration::from_hours(1), "po.rt"))
    }

    async fn send(router: Router, request: Request<Body>) -> Response {
        router.oneshot(request).await.unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_form(body: &'static str) -> Request<Body> {
        Request::post("/shorten/")
            .header(header::CONTENT_TYPE, FORM)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn post_shorten_returns_location() {
        let storage = storage();
        let request = post_form("url=https%3A%2F%2Fexample.com");
        let response = send(router(storage.clone()), request).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(location(&response), "http://po.rt/pt000000");
        assert_eq!(
            storage.get(&ShortCode::new_unchecked("/pt000000")).await.unwrap(),
            Lookup::Found("https://example.com".to_string())
        );
    }

    #[tokio::test]
    async fn get_shorten_returns_location_in_body() {
        let request = Request::get("/shorten/?url=https://example.com")
            .header(header::HOST, "localhost:8080")
            .body(Body::empty())
            .unwrap();
        let response = send(router(storage()), request).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_string(response).await, "http://localhost:8080/pt000000");
    }

    #[tokio::test]
    async fn forwarded_headers_shape_the_location() {
        let request = Request::post("/shorten/")
            .header(header::CONTENT_TYPE, FORM)
            .header("x-forwarded-proto", "https")
            .header("x-forwarded-host", "short.example")
            .body(Body::from("url=https%3A%2F%2Fexample.com"))
            .unwrap();
        let response = send(router(storage()), request).await;

        assert_eq!(location(&response), "https://short.example/pt000000");
    }

    #[tokio::test]
    async fn post_with_url_in_query_only() {
        let request = Request::post("/shorten/?url=https://example.com")
            .body(Body::empty())
            .unwrap();
        let response = send(router(storage()), request).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(location(&response), "http://po.rt/pt000000");
    }

    #[tokio::test]
    async fn form_body_wins_over_query() {
        let storage = storage();
        let request = Request::post("/shorten/?url=https://query.com")
            .header(header::CONTENT_TYPE, FORM)
            .body(Body::from("url=https%3A%2F%2Fbody.com"))
            .unwrap();
        let response = send(router(storage.clone()), request).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            storage.get(&ShortCode::new_unchecked("/pt000000")).await.unwrap(),
            Lookup::Found("https://body.com".to_string())
        );
    }

    #[tokio::test]
    async fn url_unusable_as_location_is_a_bad_request() {
        let storage = storage();
        let response = send(
            router(storage.clone()),
            post_form("url=https%3A%2F%2Fx.com%2F%0ASet-Cookie%3A%20a%3Db"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn stored_url_unusable_as_location_is_not_found() {
        let storage = storage();
        let code = storage
            .put("https://x.com/\nSet-Cookie: a=b", SignedDuration::ZERO)
            .await
            .unwrap();

        let response = send(router(storage), get(code.as_str())).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::LOCATION).is_none());
    }

    #[tokio::test]
    async fn missing_url_is_a_bad_request() {
        let response = send(router(storage()), get("/shorten/")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(response).await, "No url to shorten.");

        let response = send(router(storage()), post_form("url=")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn other_methods_are_not_allowed() {
        let request = Request::builder()
            .method(Method::PUT)
            .uri("/shorten/")
            .body(Body::empty())
            .unwrap();
        let response = send(router(storage()), request).await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn shorten_without_trailing_slash_is_not_routed() {
        let response = send(router(storage()), get("/shorten?url=https://example.com")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn known_code_redirects() {
        let storage = storage();
        let code = storage
            .put("https://example.com/page", SignedDuration::ZERO)
            .await
            .unwrap();

        let response = send(router(storage), get(code.as_str())).await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "https://example.com/page");
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let response = send(router(storage()), get("/nothere1")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(router(storage()), get("/not/a/code")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn expired_code_is_not_found() {
        let storage = storage();
        let code = storage
            .put("https://example.com", SignedDuration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let response = send(router(storage.clone()), get(code.as_str())).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn root_serves_index_page() {
        let response = send(router(storage()), get("/")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("/shorten/"));
    }

    struct BrokenStorage;

    #[async_trait]
    impl UrlStorage for BrokenStorage {
        async fn put(&self, _url: &str, _ttl: SignedDuration) -> StorageResult<ShortCode> {
            Err(StorageError::Unavailable("disk gone".to_string()))
        }

        async fn get(&self, _code: &ShortCode) -> StorageResult<Lookup> {
            Err(StorageError::Unavailable("disk gone".to_string()))
        }

        async fn contains(&self, _code: &ShortCode) -> StorageResult<bool> {
            Err(StorageError::Unavailable("disk gone".to_string()))
        }
    }

    #[tokio::test]
    async fn failed_put_is_a_server_error() {
        let response = send(
            router(Arc::new(BrokenStorage)),
            post_form("url=https%3A%2F%2Fexample.com"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn failed_get_is_not_found() {
        let response = send(router(Arc::new(BrokenStorage)), get("/abcdefgh")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
