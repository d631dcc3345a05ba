#![allow(dead_code)]

use axum::{
    Form, Json, Router,
    body::Body,
    extract::{Query, State},
    http::{HeaderMap, Method, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tower::ServiceExt;

use tsundoku_backend::db::store::MemoryStore;
use tsundoku_backend::server::config::ServerConfig;
use tsundoku_backend::services::LineClient;
use tsundoku_backend::web::create_axum_router;

pub const CHANNEL_ID: &str = "1234567890";
pub const CHANNEL_SECRET: &str = "channel-secret";

/// Known tokens and the LINE accounts behind them.
fn account_for(token: &str) -> Option<(&'static str, &'static str)> {
    match token {
        "token-alice" => Some(("U-alice", "Alice")),
        "token-bob" => Some(("U-bob", "Bob")),
        "token-broken-profile" => Some(("U-broken", "Broken")),
        _ => None,
    }
}

#[derive(Clone, Default)]
pub struct Calls {
    pub verify: Arc<AtomicUsize>,
    pub profile: Arc<AtomicUsize>,
    pub revoke: Arc<AtomicUsize>,
}

impl Calls {
    pub fn verify_count(&self) -> usize {
        self.verify.load(Ordering::SeqCst)
    }
    pub fn profile_count(&self) -> usize {
        self.profile.load(Ordering::SeqCst)
    }
    pub fn revoke_count(&self) -> usize {
        self.revoke.load(Ordering::SeqCst)
    }
}

pub struct MockLine {
    pub base_url: String,
    pub calls: Calls,
}

async fn verify(State(calls): State<Calls>, Query(params): Query<HashMap<String, String>>) -> Response {
    calls.verify.fetch_add(1, Ordering::SeqCst);
    let token = params.get("access_token").map(String::as_str).unwrap_or_default();
    match token {
        "token-slow" => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({ "scope": "profile", "client_id": CHANNEL_ID, "expires_in": 100 })).into_response()
        }
        "token-flaky" => (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
        "token-other-channel" => {
            Json(json!({ "scope": "profile", "client_id": "9999", "expires_in": 100 })).into_response()
        }
        "token-expired" => {
            Json(json!({ "scope": "profile", "client_id": CHANNEL_ID, "expires_in": 0 })).into_response()
        }
        "token-garbage-verify" => (StatusCode::OK, "not json").into_response(),
        t if account_for(t).is_some() => {
            Json(json!({ "scope": "profile", "client_id": CHANNEL_ID, "expires_in": 2591659 })).into_response()
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_request", "error_description": "access token expired" })),
        )
            .into_response(),
    }
}

async fn profile(State(calls): State<Calls>, headers: HeaderMap) -> Response {
    calls.profile.fetch_add(1, Ordering::SeqCst);
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default();
    if token == "token-broken-profile" {
        return (StatusCode::OK, "<html>oops</html>").into_response();
    }
    match account_for(token) {
        Some((user_id, name)) => Json(json!({
            "userId": user_id,
            "displayName": name,
            "pictureUrl": format!("https://profile.example/{user_id}.png"),
            "statusMessage": "reading"
        }))
        .into_response(),
        None => (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Authentication failed" }))).into_response(),
    }
}

async fn revoke(State(calls): State<Calls>, Form(params): Form<HashMap<String, String>>) -> Response {
    calls.revoke.fetch_add(1, Ordering::SeqCst);
    let credentials_ok = params.get("client_id").map(String::as_str) == Some(CHANNEL_ID)
        && params.get("client_secret").map(String::as_str) == Some(CHANNEL_SECRET);
    let token_known = params
        .get("access_token")
        .is_some_and(|t| account_for(t).is_some());
    if credentials_ok && token_known {
        StatusCode::OK.into_response()
    } else {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_request" }))).into_response()
    }
}

/// A stand-in for the LINE Platform on an ephemeral local port.
pub async fn spawn_mock_line() -> MockLine {
    let calls = Calls::default();
    let app = Router::new()
        .route("/oauth2/v2.1/verify", get(verify))
        .route("/v2/profile", get(profile))
        .route("/oauth2/v2.1/revoke", post(revoke))
        .with_state(calls.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockLine {
        base_url: format!("http://{addr}"),
        calls,
    }
}

pub fn test_config(line_api_base_url: &str) -> ServerConfig {
    ServerConfig {
        database_url: None,
        listen_addr: "127.0.0.1:0".to_string(),
        line_channel_id: CHANNEL_ID.to_string(),
        line_channel_secret: CHANNEL_SECRET.to_string(),
        line_api_base_url: line_api_base_url.to_string(),
        line_timeout_secs: 5,
        log_dir: "logs".to_string(),
        cors_allowed_origins: Vec::new(),
    }
}

pub fn line_client(base_url: &str, timeout: Duration) -> LineClient {
    LineClient::new(base_url, CHANNEL_ID, CHANNEL_SECRET, timeout).unwrap()
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub line: MockLine,
}

pub async fn spawn_app() -> TestApp {
    let line = spawn_mock_line().await;
    let config = Arc::new(test_config(&line.base_url));
    let store = Arc::new(MemoryStore::new());
    let client = Arc::new(LineClient::from_config(&config).unwrap());
    let router = create_axum_router(store.clone(), client, config);
    TestApp { router, store, line }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).unwrap()
    }

    pub fn error_kind(&self) -> String {
        self.json()["kind"].as_str().unwrap().to_string()
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        self.send(request).await
    }

    /// Sends `raw` verbatim as a JSON body, valid or not.
    pub async fn post_raw(&self, uri: &str, token: &str, raw: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn login(&self, token: &str) -> Value {
        let response = self.request(Method::POST, "/api/line_login", Some(token), None).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text());
        response.json()
    }
}
