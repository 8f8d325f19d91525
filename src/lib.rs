//! Messenger Bot - Facebook Messenger Platform client and webhook
//!
//! This library provides:
//! - A typed data model for Send API payloads and webhook callbacks
//! - An async Send API client (messages, sender actions, uploads, thread settings)
//! - An axum webhook that verifies signed callbacks and queues them on a channel
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐  POST /webhook        ┌─────────────────┐  mpsc   ┌─────────────┐
//! │ Messenger  │ ────────────────────▶ │     Webhook     │ ──────▶ │ Application │
//! │  Platform  │ ◀──────────────────── │ MessengerClient │ ◀────── │             │
//! └────────────┘  POST /me/messages    └─────────────────┘         └─────────────┘
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod webhook;

pub use client::MessengerClient;
pub use config::Config;
pub use error::{Error, Result};
pub use webhook::Webhook;
