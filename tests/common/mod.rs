//! Shared test utilities

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, Uri},
};
use messenger_bot::MessengerClient;
use messenger_bot::config::ClientConfig;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

pub const VERIFY_TOKEN: &str = "test-verify-token";
pub const APP_SECRET: &str = "test-app-secret";
pub const PAGE_TOKEN: &str = "test-page-token";

/// Webhook body with one entry per inner slice, one text message per string
#[must_use]
pub fn page_payload(entries: &[&[&str]]) -> String {
    let entries: Vec<serde_json::Value> = entries
        .iter()
        .enumerate()
        .map(|(i, texts)| {
            let messaging: Vec<serde_json::Value> = texts
                .iter()
                .map(|text| {
                    serde_json::json!({
                        "sender": { "id": "1001" },
                        "recipient": { "id": "2002" },
                        "timestamp": 1_458_692_752_478_i64,
                        "message": { "mid": format!("mid.{text}"), "seq": 1, "text": text }
                    })
                })
                .collect();
            serde_json::json!({ "id": "2002", "time": i, "messaging": messaging })
        })
        .collect();

    serde_json::json!({ "object": "page", "entry": entries }).to_string()
}

/// A request seen by the mock Graph API
#[derive(Debug, Clone)]
pub struct Captured {
    pub path: String,
    pub query: HashMap<String, String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl Captured {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("captured body is not JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

struct MockState {
    status: StatusCode,
    reply: String,
    captured: Mutex<Vec<Captured>>,
}

/// Local stand-in for the Graph API answering every request the same way
pub struct MockGraph {
    pub base: String,
    state: Arc<MockState>,
}

impl MockGraph {
    pub async fn start(status: StatusCode, reply: serde_json::Value) -> Self {
        Self::start_raw(status, reply.to_string()).await
    }

    pub async fn start_raw(status: StatusCode, reply: String) -> Self {
        let state = Arc::new(MockState {
            status,
            reply,
            captured: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .fallback(capture)
            .with_state(Arc::clone(&state));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock server");
        let addr = listener.local_addr().expect("no local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server failed");
        });

        Self {
            base: format!("http://{addr}"),
            state,
        }
    }

    /// Client pointed at this server
    pub fn client(&self) -> MessengerClient {
        let mut config = ClientConfig::new(PAGE_TOKEN);
        config.api_base.clone_from(&self.base);
        MessengerClient::new(config).expect("failed to build client")
    }

    pub async fn requests(&self) -> Vec<Captured> {
        self.state.captured.lock().await.clone()
    }
}

async fn capture(
    State(state): State<Arc<MockState>>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    state.captured.lock().await.push(Captured {
        path: uri.path().to_string(),
        query,
        content_type,
        body,
    });

    (state.status, state.reply.clone())
}
