//! Shared helpers for proxy integration tests: a fake upstream model and
//! request plumbing for the router.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use server::config::Config;
use server::{build_app, AppState};

pub const TEST_API_KEY: &str = "sk-test-secret-4242";

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub path: String,
    pub api_key: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct FakeState {
    status: StatusCode,
    reply: Value,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

pub struct FakeUpstream {
    pub base_url: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl FakeUpstream {
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

async fn record_call(
    State(state): State<FakeState>,
    headers: HeaderMap,
    request: Request<Body>,
) -> (StatusCode, Json<Value>) {
    let path = request.uri().path().to_string();
    let bytes = request.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    let api_key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    state.calls.lock().unwrap().push(RecordedCall {
        path,
        api_key,
        body,
    });
    (state.status, Json(state.reply.clone()))
}

/// Start a fake `generateContent` endpoint that answers every call with `reply`.
pub async fn spawn_upstream(status: StatusCode, reply: Value) -> FakeUpstream {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let state = FakeState {
        status,
        reply,
        calls: calls.clone(),
    };
    let app = Router::new()
        .route("/v1beta/{*rest}", post(record_call))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind fake upstream");
    let addr = listener.local_addr().expect("no local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake upstream failed");
    });

    FakeUpstream {
        base_url: format!("http://{addr}/v1beta"),
        calls,
    }
}

/// Upstream reply carrying one candidate with the given text.
pub fn text_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" },
            "finishReason": "STOP"
        }]
    })
}

pub fn setup_app(upstream: &FakeUpstream, api_key: Option<&str>) -> Router {
    let config = Config::for_upstream(upstream.base_url.clone(), api_key.map(ToString::to_string));
    let state = Arc::new(AppState::new(config).expect("failed to build app state"));
    build_app(state)
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn json_response(app: &Router, req: Request<Body>) -> (StatusCode, Value, String) {
    let response = app.clone().oneshot(req).await.expect("request failed");
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes();
    let raw = String::from_utf8_lossy(&body).to_string();
    let value: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value, raw)
}
