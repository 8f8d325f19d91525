//! Webhook callback payloads
//!
//! The platform batches events: a [`WebhookPayload`] holds entries, each entry
//! holds the callbacks delivered for one page. Every callback carries exactly
//! one event, identified by which key (`message`, `postback`, `optin`,
//! `delivery`) is present in the JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::{Page, User};

/// `object` value of page subscriptions
pub const PAGE_OBJECT: &str = "page";

/// Body of a webhook POST
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub object: String,
    #[serde(rename = "entry", default)]
    pub entries: Vec<Entry>,
}

impl WebhookPayload {
    /// All callbacks, entry by entry, in payload order
    pub fn into_callbacks(self) -> impl Iterator<Item = Callback> {
        self.entries.into_iter().flat_map(|entry| entry.messaging)
    }
}

/// Batch of callbacks for one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Page ID
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub time: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub messaging: Vec<Callback>,
}

/// A single event delivered to the webhook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCallback", into = "RawCallback")]
pub struct Callback {
    pub sender: User,
    pub recipient: Page,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub event: CallbackEvent,
}

/// What happened, decided once from the JSON keys present
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackEvent {
    Message(InputMessage),
    Postback(InputPostback),
    Optin(InputOptin),
    Delivery(InputDelivery),
    /// Event type this crate does not model (read receipts, referrals, ...)
    Unknown,
}

impl Callback {
    /// Event time, if the timestamp is in range
    #[must_use]
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    #[must_use]
    pub const fn message(&self) -> Option<&InputMessage> {
        match &self.event {
            CallbackEvent::Message(message) => Some(message),
            _ => None,
        }
    }

    #[must_use]
    pub const fn postback(&self) -> Option<&InputPostback> {
        match &self.event {
            CallbackEvent::Postback(postback) => Some(postback),
            _ => None,
        }
    }

    #[must_use]
    pub const fn optin(&self) -> Option<&InputOptin> {
        match &self.event {
            CallbackEvent::Optin(optin) => Some(optin),
            _ => None,
        }
    }

    #[must_use]
    pub const fn delivery(&self) -> Option<&InputDelivery> {
        match &self.event {
            CallbackEvent::Delivery(delivery) => Some(delivery),
            _ => None,
        }
    }

    /// A message with text or at least one attachment
    #[must_use]
    pub fn is_message(&self) -> bool {
        self.message()
            .is_some_and(|m| !m.text.is_empty() || !m.attachments.is_empty())
    }

    #[must_use]
    pub const fn is_optin(&self) -> bool {
        matches!(self.event, CallbackEvent::Optin(_))
    }

    #[must_use]
    pub const fn is_postback(&self) -> bool {
        matches!(self.event, CallbackEvent::Postback(_))
    }

    /// A delivery report naming at least one message
    #[must_use]
    pub fn is_delivery(&self) -> bool {
        self.delivery().is_some_and(|d| !d.mids.is_empty())
    }
}

/// Wire shape of a callback
#[derive(Serialize, Deserialize)]
struct RawCallback {
    sender: User,
    recipient: Page,
    #[serde(default)]
    timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<InputMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    postback: Option<InputPostback>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    optin: Option<InputOptin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    delivery: Option<InputDelivery>,
}

impl From<RawCallback> for Callback {
    fn from(raw: RawCallback) -> Self {
        // A well-formed callback has exactly one of these keys
        let event = if let Some(message) = raw.message {
            CallbackEvent::Message(message)
        } else if let Some(postback) = raw.postback {
            CallbackEvent::Postback(postback)
        } else if let Some(optin) = raw.optin {
            CallbackEvent::Optin(optin)
        } else if let Some(delivery) = raw.delivery {
            CallbackEvent::Delivery(delivery)
        } else {
            CallbackEvent::Unknown
        };

        Self {
            sender: raw.sender,
            recipient: raw.recipient,
            timestamp: raw.timestamp,
            event,
        }
    }
}

impl From<Callback> for RawCallback {
    fn from(callback: Callback) -> Self {
        let mut raw = Self {
            sender: callback.sender,
            recipient: callback.recipient,
            timestamp: callback.timestamp,
            message: None,
            postback: None,
            optin: None,
            delivery: None,
        };
        match callback.event {
            CallbackEvent::Message(message) => raw.message = Some(message),
            CallbackEvent::Postback(postback) => raw.postback = Some(postback),
            CallbackEvent::Optin(optin) => raw.optin = Some(optin),
            CallbackEvent::Delivery(delivery) => raw.delivery = Some(delivery),
            CallbackEvent::Unknown => {}
        }
        raw
    }
}

/// Message sent by a user to the page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputMessage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub mid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub seq: i64,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub text: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub attachments: Vec<InputAttachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_reply: Option<InputQuickReply>,
}

/// Payload of the quick reply the user tapped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputQuickReply {
    #[serde(default, deserialize_with = "null_as_default")]
    pub payload: String,
}

/// Media or location shared by the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputAttachment {
    /// `image`, `audio`, `video`, `file`, `location` or `fallback`
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    /// Empty for `fallback` attachments, which arrive with a `null` payload
    #[serde(default, deserialize_with = "null_as_default")]
    pub payload: InputAttachmentPayload,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputAttachmentPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub long: f64,
}

/// Delivery report for a batch of sent messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDelivery {
    #[serde(default, deserialize_with = "null_as_default")]
    pub mids: Vec<String>,
    /// Every message sent before this timestamp was delivered
    #[serde(default, deserialize_with = "null_as_default")]
    pub watermark: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub seq: i64,
}

/// Postback button tap
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputPostback {
    #[serde(default, deserialize_with = "null_as_default")]
    pub payload: String,
}

/// Send-to-Messenger plugin opt-in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputOptin {
    /// `data-ref` attribute of the plugin
    #[serde(rename = "ref", default, deserialize_with = "null_as_default")]
    pub reference: String,
}

/// Absent and `null` both decode to the field's default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
