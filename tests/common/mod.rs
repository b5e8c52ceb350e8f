#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;
use tower_sessions_sqlx_store::SqliteStore;
use unpacked::{
    config::SessionConfig,
    routes::build_router,
    services::{ImageStore, LocalImageStore, RandomSlugGenerator, SlugGenerator},
    test_utils::test_helpers,
    AppState,
};

pub const BASE_URL: &str = "http://localhost:8080";

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
    pub cookie: Option<String>,
    pub content_type: Option<String>,
    pub headers: HeaderMap,
}

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub uploads: TempDir,
}

impl TestApp {
    /// App with local image storage in a temporary directory.
    pub async fn new() -> Self {
        Self::build(true, Arc::new(RandomSlugGenerator)).await
    }

    /// App whose upload backend is missing its configuration.
    pub async fn without_uploads() -> Self {
        Self::build(false, Arc::new(RandomSlugGenerator)).await
    }

    pub async fn with_slugs(slugs: Arc<dyn SlugGenerator>) -> Self {
        Self::build(true, slugs).await
    }

    async fn build(local_uploads: bool, slugs: Arc<dyn SlugGenerator>) -> Self {
        let pool = test_helpers::create_test_db().await.unwrap();
        let uploads = TempDir::new().unwrap();

        let store: Option<Arc<dyn ImageStore>> = if local_uploads {
            Some(Arc::new(LocalImageStore::new(uploads.path())))
        } else {
            None
        };

        let state = AppState::with_slug_generator(pool.clone(), BASE_URL, store, slugs);

        let session_store = SqliteStore::new(pool.clone())
            .with_table_name("sessions")
            .unwrap();
        session_store.migrate().await.unwrap();
        let session_layer = SessionConfig::from_env().create_layer(session_store);

        let router = build_router(state, session_layer, Some(uploads.path()));

        TestApp {
            router,
            pool,
            uploads,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&bytes).to_string();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            body,
            text,
            cookie,
            content_type,
            headers,
        }
    }

    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.json(Method::GET, uri, cookie, None).await
    }

    pub async fn post(&self, uri: &str, cookie: Option<&str>, body: Value) -> TestResponse {
        self.json(Method::POST, uri, cookie, Some(body)).await
    }

    /// Register a user through the API and return a logged-in session cookie.
    pub async fn login_as(&self, email: &str) -> String {
        let registered = self
            .post(
                "/api/register",
                None,
                json!({ "name": "Test User", "email": email, "password": "password123" }),
            )
            .await;
        assert_eq!(registered.status, StatusCode::CREATED, "{}", registered.text);

        let login = self
            .post(
                "/api/login",
                None,
                json!({ "email": email, "password": "password123" }),
            )
            .await;
        assert_eq!(login.status, StatusCode::OK, "{}", login.text);

        login.cookie.expect("login should issue a session cookie")
    }

    pub async fn create_outfit(&self, cookie: &str, body: Value) -> i64 {
        let response = self.post("/api/outfits", Some(cookie), body).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
        response.body["id"].as_i64().unwrap()
    }
}
