//! Outgoing messages, attachments and quick replies

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{
    ButtonTemplate, GenericTemplate, ListTemplate, ParseError, ReceiptTemplate, Template,
};

/// Message body of a send request
///
/// Carries text or an attachment, optionally followed by quick replies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quick_replies: Vec<QuickReply>,
}

impl Message {
    /// Create a plain text message
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Create a message carrying a single attachment
    #[must_use]
    pub fn with_attachment(attachment: Attachment) -> Self {
        Self {
            attachment: Some(attachment),
            ..Self::default()
        }
    }

    /// Create a message showing an image from a URL
    #[must_use]
    pub fn image(url: impl Into<String>) -> Self {
        Self::with_attachment(MediaKind::Image.attachment(FilePayload::from_url(url)))
    }

    pub fn add_quick_reply(&mut self, quick_reply: QuickReply) {
        self.quick_replies.push(quick_reply);
    }
}

impl From<Template> for Message {
    fn from(template: Template) -> Self {
        Self::with_attachment(Attachment::Template(template))
    }
}

macro_rules! message_from_template {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Message {
                fn from(template: $ty) -> Self {
                    Template::from(template).into()
                }
            }
        )+
    };
}

message_from_template!(GenericTemplate, ListTemplate, ButtonTemplate, ReceiptTemplate);

/// Quick reply offered below a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "content_type", rename_all = "lowercase")]
pub enum QuickReply {
    Text {
        title: String,
        payload: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image_url: Option<String>,
    },
    /// Asks the user to share their location
    Location,
}

impl QuickReply {
    #[must_use]
    pub fn text(title: impl Into<String>, payload: impl Into<String>) -> Self {
        Self::Text {
            title: title.into(),
            payload: payload.into(),
            image_url: None,
        }
    }
}

/// Message attachment, tagged by `type` with the payload under `payload`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum Attachment {
    Image(FilePayload),
    Audio(FilePayload),
    Video(FilePayload),
    File(FilePayload),
    Template(Template),
}

/// Media location for image, audio, video and file attachments
///
/// Left empty when the media travels as a multipart upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl FilePayload {
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
        }
    }
}

/// Media attachment kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Audio,
    Video,
    File,
}

impl MediaKind {
    /// Wrap a payload in the attachment variant for this kind
    #[must_use]
    pub fn attachment(self, payload: FilePayload) -> Attachment {
        match self {
            Self::Image => Attachment::Image(payload),
            Self::Audio => Attachment::Audio(payload),
            Self::Video => Attachment::Video(payload),
            Self::File => Attachment::File(payload),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::File => "file",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "audio" => Ok(Self::Audio),
            "video" => Ok(Self::Video),
            "file" => Ok(Self::File),
            _ => Err(ParseError::new("media kind", s)),
        }
    }
}
