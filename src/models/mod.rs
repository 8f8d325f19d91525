//! Messenger Platform data model
//!
//! Types shared by the outbound client and the inbound webhook:
//! users, messages, attachments, templates, request envelopes,
//! API responses and webhook callbacks.

mod callback;
mod message;
mod request;
mod response;
mod template;
mod user;

pub use callback::{
    Callback, CallbackEvent, Coordinates, Entry, InputAttachment, InputAttachmentPayload,
    InputDelivery, InputMessage, InputOptin, InputPostback, InputQuickReply, PAGE_OBJECT,
    WebhookPayload,
};
pub use message::{Attachment, FilePayload, MediaKind, Message, QuickReply};
pub use request::{NotificationType, Payload, Request, SenderAction};
pub use response::{ApiError, ApiResponse};
pub use template::{
    Button, ButtonTemplate, Element, GenericTemplate, ListTemplate, MAX_BUTTONS, MAX_ELEMENTS,
    MAX_SUBTITLE_CHARS, MAX_TITLE_CHARS, OrderAddress, OrderAdjustment, OrderItem, OrderSummary,
    ReceiptTemplate, Template, TemplateError, TopElementStyle,
};
pub use user::{Page, User};

/// Error returned when parsing one of the string-backed enums fails
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseError {
    kind: &'static str,
    value: String,
}

impl ParseError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Numeric IDs that the platform sends as JSON strings
///
/// Serializes as a string; accepts either a string or a number.
pub(crate) mod string_id {
    use serde::{Deserialize, Deserializer, Serializer, de};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StrOrInt {
        Int(i64),
        Str(String),
    }

    impl StrOrInt {
        fn into_id<E: de::Error>(self) -> Result<i64, E> {
            match self {
                Self::Int(id) => Ok(id),
                Self::Str(s) => s.parse().map_err(E::custom),
            }
        }
    }

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(id: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        StrOrInt::deserialize(deserializer)?.into_id()
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};

        use super::StrOrInt;

        #[allow(clippy::ref_option)]
        pub fn serialize<S: Serializer>(id: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
            match id {
                Some(id) => serializer.collect_str(id),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<i64>, D::Error> {
            Option::<StrOrInt>::deserialize(deserializer)?
                .map(StrOrInt::into_id)
                .transpose()
        }
    }
}
