//! Shared test helpers for droidwire-core integration tests.
//!
//! This module provides a mock Appium HTTP server that records every request
//! and a recording executor for tests that must observe exactly what the
//! driver dispatches.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use droidwire_core::command::CommandRequest;
use droidwire_core::executor::{CommandExecutor, TransportError};
use droidwire_core::http_client::HttpCommandExecutor;
use droidwire_core::protocol::CommandResponse;
use droidwire_core::AndroidDriver;

// ---------------------------------------------------------------------------
// Mock Appium server
// ---------------------------------------------------------------------------

/// One request as seen by the mock server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path with the `/wd/hub` prefix removed.
    pub path: String,
    /// Parsed JSON body; `Null` when empty.
    pub body: Value,
}

struct Reply {
    method: String,
    suffix: String,
    status: u16,
    body: String,
}

struct MockState {
    session_id: String,
    requests: Mutex<Vec<RecordedRequest>>,
    replies: Mutex<VecDeque<Reply>>,
    connection: Mutex<i64>,
}

/// A running mock Appium server on an ephemeral localhost port.
pub struct MockAppium {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockAppium {
    /// Start the server. Unscripted requests get the default behaviour: new
    /// session, status, delete session and a stateful network connection are
    /// served; anything else is an `unknown command` 404.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let state = Arc::new(MockState {
            session_id: uuid::Uuid::new_v4().to_string(),
            requests: Mutex::new(Vec::new()),
            replies: Mutex::new(VecDeque::new()),
            connection: Mutex::new(6),
        });

        let app = Router::new().fallback(handle).with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// Base URL to point an executor at.
    pub fn base_url(&self) -> String {
        format!("http://{}/wd/hub", self.addr)
    }

    /// The session id handed out by `POST /session`.
    pub fn session_id(&self) -> &str {
        &self.state.session_id
    }

    pub fn executor(&self) -> Arc<HttpCommandExecutor> {
        Arc::new(HttpCommandExecutor::new(self.base_url()).unwrap())
    }

    /// A driver attached to the mock's session without a new-session round
    /// trip.
    pub fn driver(&self) -> AndroidDriver {
        AndroidDriver::attach(self.executor(), self.session_id())
    }

    /// Queue a JSON reply for the next `method` request whose path ends with
    /// `suffix`.
    pub fn reply(&self, method: &str, suffix: &str, status: u16, body: Value) {
        self.reply_raw(method, suffix, status, &body.to_string());
    }

    /// Queue a raw body reply, for malformed-response tests.
    pub fn reply_raw(&self, method: &str, suffix: &str, status: u16, body: &str) {
        self.state.replies.lock().unwrap().push_back(Reply {
            method: method.to_string(),
            suffix: suffix.to_string(),
            status,
            body: body.to_string(),
        });
    }

    /// Queue a successful JSON-wire reply carrying `value`.
    pub fn reply_legacy(&self, method: &str, suffix: &str, value: Value) {
        let body = json!({"sessionId": self.session_id(), "status": 0, "value": value});
        self.reply(method, suffix, 200, body);
    }

    /// Queue a successful W3C reply carrying `value`.
    pub fn reply_w3c(&self, method: &str, suffix: &str, value: Value) {
        self.reply(method, suffix, 200, json!({ "value": value }));
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("no request recorded")
    }

    /// The path of session-scoped route `suffix` for the mock's session.
    pub fn session_path(&self, suffix: &str) -> String {
        format!("/session/{}/{}", self.session_id(), suffix)
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix("/wd/hub")
        .unwrap_or(uri.path())
        .to_string();
    let body: Value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.as_str().to_string(),
        path: path.clone(),
        body: body.clone(),
    });

    let (status, body) = state.respond(method.as_str(), &path, &body);
    (
        StatusCode::from_u16(status).unwrap(),
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

impl MockState {
    fn respond(&self, method: &str, path: &str, body: &Value) -> (u16, String) {
        {
            let mut replies = self.replies.lock().unwrap();
            if let Some(index) = replies
                .iter()
                .position(|r| r.method == method && path.ends_with(&r.suffix))
            {
                let reply = replies.remove(index).unwrap();
                return (reply.status, reply.body);
            }
        }

        let session = format!("/session/{}", self.session_id);
        let reply = match (method, path) {
            ("GET", "/status") => json!({"value": {"ready": true, "message": "mock appium"}}),
            ("POST", "/session") => json!({
                "value": {
                    "sessionId": self.session_id,
                    "capabilities": body["capabilities"]["alwaysMatch"].clone(),
                }
            }),
            ("DELETE", p) if p == session => json!({ "value": null }),
            ("GET", p) if p == format!("{session}/network_connection") => {
                let bits = *self.connection.lock().unwrap();
                json!({"sessionId": self.session_id, "status": 0, "value": bits})
            }
            ("POST", p) if p == format!("{session}/network_connection") => {
                let bits = body["parameters"]["type"].as_i64().unwrap_or(-1);
                *self.connection.lock().unwrap() = bits;
                json!({"sessionId": self.session_id, "status": 0, "value": bits})
            }
            _ => {
                let body = json!({
                    "value": {
                        "error": "unknown command",
                        "message": format!("no route for {method} {path}"),
                    }
                });
                return (404, body.to_string());
            }
        };
        (200, reply.to_string())
    }
}

// ---------------------------------------------------------------------------
// Recording executor
// ---------------------------------------------------------------------------

/// A spy executor that records requests and replays queued responses.
///
/// Without queued responses every request succeeds with a `null` value.
#[derive(Default)]
pub struct RecordingExecutor {
    requests: Mutex<Vec<CommandRequest>>,
    responses: Mutex<VecDeque<CommandResponse>>,
}

impl RecordingExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_response(&self, response: CommandResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<CommandRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn execute(&self, request: CommandRequest) -> Result<CommandResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| CommandResponse::success(Value::Null)))
    }
}

/// A driver attached to session `spy-session` on `executor`.
pub fn spy_driver(executor: &Arc<RecordingExecutor>) -> AndroidDriver {
    AndroidDriver::attach(executor.clone(), "spy-session")
}
