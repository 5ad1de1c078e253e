use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use taskboard_server::auth::{AuthState, encode_jwt};
use taskboard_server::task::repository::{InMemoryTaskRepository, TaskRepository};
use taskboard_server::web::create_app;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "some_secret";

/// Builds the application around an empty in-memory repository.
pub fn setup() -> Router {
    setup_with_repository(Arc::new(InMemoryTaskRepository::new()))
}

pub fn setup_with_repository(repository: Arc<dyn TaskRepository>) -> Router {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let auth_state = Arc::new(AuthState {
        jwt_secret: JWT_SECRET.to_string(),
    });
    create_app(auth_state, repository)
}

pub fn bearer_token(user_id: u64) -> String {
    let token = encode_jwt(user_id, JWT_SECRET).expect("Failed to encode test token");
    format!("Bearer {}", token)
}

/// Response captured from a single request against the router.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Response body is not the expected JSON")
    }

    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.body).expect("Response body is not UTF-8")
    }
}

/// Sends a request as `user_id`; `None` sends it without credentials.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user_id: Option<u64>,
    body: Option<&str>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user_id {
        builder = builder.header(header::AUTHORIZATION, bearer_token(user_id));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    TestResponse {
        status,
        headers,
        body,
    }
}
