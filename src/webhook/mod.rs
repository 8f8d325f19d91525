//! Inbound webhook
//!
//! A single axum route answers the platform's GET verification handshake and
//! receives signed POST batches. Verified callbacks are pushed onto an
//! `mpsc` channel whose receiver belongs to the application.
//!
//! ```no_run
//! # async fn run(config: messenger_bot::config::WebhookConfig) -> messenger_bot::Result<()> {
//! let (webhook, mut events) = messenger_bot::Webhook::new(config);
//! tokio::spawn(messenger_bot::server::serve(webhook.router(), 8080));
//! while let Some(callback) = events.recv().await {
//!     println!("{:?}", callback.event);
//! }
//! # Ok(())
//! # }
//! ```

mod dispatch;
pub mod signature;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use subtle::ConstantTimeEq;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;

pub use dispatch::DispatchError;
pub use signature::{SIGNATURE_HEADER, sign, verify_signature};

use crate::config::WebhookConfig;
use crate::models::{Callback, PAGE_OBJECT, ParseError, WebhookPayload};

/// What to do when the event channel cannot take a whole batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverflowPolicy {
    /// Wait for the consumer; a stalled consumer stalls webhook responses
    #[default]
    Block,
    /// Queue what fits, drop the rest with a warning
    DropNewest,
    /// Queue nothing and answer 503 so the platform redelivers
    Reject,
}

impl OverflowPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::DropNewest => "drop-newest",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverflowPolicy {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "block" => Ok(Self::Block),
            "drop-newest" => Ok(Self::DropNewest),
            "reject" => Ok(Self::Reject),
            _ => Err(ParseError::new("overflow policy", s)),
        }
    }
}

/// How to answer a correctly signed body that is not a valid payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecodeMode {
    /// 200 with no callbacks, logged at warn
    #[default]
    Lenient,
    /// 400
    Strict,
}

impl DecodeMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Strict => "strict",
        }
    }
}

impl fmt::Display for DecodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecodeMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            _ => Err(ParseError::new("decode mode", s)),
        }
    }
}

/// Shared handler state
struct WebhookState {
    verify_token: SecretString,
    app_secret: SecretString,
    tx: mpsc::Sender<Callback>,
    overflow: OverflowPolicy,
    decode: DecodeMode,
}

/// Webhook endpoint bound to one event channel
pub struct Webhook {
    path: String,
    state: Arc<WebhookState>,
}

impl Webhook {
    /// Create the webhook and the receiver its callbacks are delivered to
    ///
    /// A zero `queue_capacity` is raised to 1 and a path without a leading
    /// `/` gets one; [`WebhookConfig::validate`] rejects both up front. An
    /// empty verify token makes every verification request fail.
    #[must_use]
    pub fn new(config: WebhookConfig) -> (Self, mpsc::Receiver<Callback>) {
        let WebhookConfig {
            path,
            verify_token,
            app_secret,
            queue_capacity,
            overflow,
            decode,
        } = config;

        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };

        let webhook = Self {
            path,
            state: Arc::new(WebhookState {
                verify_token,
                app_secret,
                tx,
                overflow,
                decode,
            }),
        };
        (webhook, rx)
    }

    /// Route the webhook is served on
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Build the axum router: `GET` verifies, `POST` receives, anything else is 405
    #[must_use]
    pub fn router(&self) -> Router {
        // axum answers HEAD with the GET handler unless HEAD is routed itself
        Router::new()
            .route(
                &self.path,
                get(verify).post(receive).head(method_not_allowed),
            )
            .with_state(Arc::clone(&self.state))
            .layer(TraceLayer::new_for_http())
    }
}

/// Subscription handshake parameters
#[derive(Debug, Deserialize)]
struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    challenge: Option<String>,
}

async fn method_not_allowed() -> StatusCode {
    StatusCode::METHOD_NOT_ALLOWED
}

/// Echo `hub.challenge` when `hub.verify_token` matches
///
/// An empty configured token never matches.
async fn verify(
    State(state): State<Arc<WebhookState>>,
    Query(query): Query<VerifyQuery>,
) -> Response {
    let expected = state.verify_token.expose_secret().as_bytes();
    let matches = !expected.is_empty()
        && query
            .verify_token
            .as_deref()
            .is_some_and(|token| bool::from(token.as_bytes().ct_eq(expected)));

    if !matches {
        tracing::warn!(mode = ?query.mode, "webhook verification failed");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    tracing::info!(mode = ?query.mode, "webhook verified");
    (StatusCode::OK, query.challenge.unwrap_or_default()).into_response()
}

/// Verify, decode and enqueue a callback batch
async fn receive(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        tracing::warn!("webhook request without signature");
        return StatusCode::BAD_REQUEST;
    };

    if !verify_signature(signature, &body, state.app_secret.expose_secret()) {
        return StatusCode::BAD_REQUEST;
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, mode = %state.decode, "failed to decode webhook payload");
            return match state.decode {
                DecodeMode::Lenient => StatusCode::OK,
                DecodeMode::Strict => StatusCode::BAD_REQUEST,
            };
        }
    };

    if payload.object != PAGE_OBJECT {
        tracing::debug!(object = %payload.object, "ignoring non-page webhook");
        return StatusCode::OK;
    }

    let callbacks: Vec<Callback> = payload.into_callbacks().collect();
    match dispatch::dispatch(&state.tx, callbacks, state.overflow).await {
        Ok(count) => {
            tracing::debug!(count, "webhook callbacks queued");
            StatusCode::OK
        }
        Err(DispatchError::Closed) => {
            tracing::error!("event receiver dropped, refusing webhook");
            StatusCode::SERVICE_UNAVAILABLE
        }
        Err(DispatchError::Full) => {
            tracing::warn!("event queue full, rejecting webhook batch");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
