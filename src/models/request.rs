//! Send API request envelope

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{
    ButtonTemplate, GenericTemplate, ListTemplate, Message, ParseError, ReceiptTemplate, User,
};

/// Delivery urgency hint for the recipient's device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    /// Sound and vibration
    #[default]
    Regular,
    /// On-screen notification only
    SilentPush,
    /// No notification
    NoPush,
}

impl NotificationType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "REGULAR",
            Self::SilentPush => "SILENT_PUSH",
            Self::NoPush => "NO_PUSH",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the wire names; an empty string means [`NotificationType::Regular`]
impl FromStr for NotificationType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "REGULAR" => Ok(Self::Regular),
            "SILENT_PUSH" => Ok(Self::SilentPush),
            "NO_PUSH" => Ok(Self::NoPush),
            _ => Err(ParseError::new("notification type", s)),
        }
    }
}

/// Typing indicators and read receipts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderAction {
    TypingOn,
    TypingOff,
    MarkSeen,
}

/// Everything that can be sent to a user
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Message(Message),
    Action(SenderAction),
    Generic(GenericTemplate),
    List(ListTemplate),
    Button(ButtonTemplate),
    Receipt(ReceiptTemplate),
}

impl From<Message> for Payload {
    fn from(message: Message) -> Self {
        Self::Message(message)
    }
}

impl From<SenderAction> for Payload {
    fn from(action: SenderAction) -> Self {
        Self::Action(action)
    }
}

impl From<GenericTemplate> for Payload {
    fn from(template: GenericTemplate) -> Self {
        Self::Generic(template)
    }
}

impl From<ListTemplate> for Payload {
    fn from(template: ListTemplate) -> Self {
        Self::List(template)
    }
}

impl From<ButtonTemplate> for Payload {
    fn from(template: ButtonTemplate) -> Self {
        Self::Button(template)
    }
}

impl From<ReceiptTemplate> for Payload {
    fn from(template: ReceiptTemplate) -> Self {
        Self::Receipt(template)
    }
}

/// Body of a `POST /me/messages` call
///
/// Holds either a message or a sender action, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    recipient: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sender_action: Option<SenderAction>,
    #[serde(default)]
    notification_type: NotificationType,
}

impl Request {
    /// Wrap a payload for `recipient`
    ///
    /// Templates are placed in a `template` attachment of the message.
    #[must_use]
    pub fn new(
        recipient: User,
        payload: impl Into<Payload>,
        notification_type: NotificationType,
    ) -> Self {
        let (message, sender_action) = match payload.into() {
            Payload::Message(message) => (Some(message), None),
            Payload::Action(action) => (None, Some(action)),
            Payload::Generic(template) => (Some(template.into()), None),
            Payload::List(template) => (Some(template.into()), None),
            Payload::Button(template) => (Some(template.into()), None),
            Payload::Receipt(template) => (Some(template.into()), None),
        };

        Self {
            recipient,
            message,
            sender_action,
            notification_type,
        }
    }

    #[must_use]
    pub const fn recipient(&self) -> &User {
        &self.recipient
    }

    #[must_use]
    pub const fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    #[must_use]
    pub const fn sender_action(&self) -> Option<SenderAction> {
        self.sender_action
    }

    #[must_use]
    pub const fn notification_type(&self) -> NotificationType {
        self.notification_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attachment, Element, Template};

    #[test]
    fn empty_notification_type_defaults_to_regular() {
        let notification: NotificationType = "".parse().unwrap();
        let request = Request::new(User::from_id(0), Message::with_text("Hi"), notification);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "recipient": { "id": "0" },
                "message": { "text": "Hi" },
                "notification_type": "REGULAR"
            })
        );
    }

    #[test]
    fn notification_type_parses_wire_names() {
        assert_eq!("SILENT_PUSH".parse(), Ok(NotificationType::SilentPush));
        assert_eq!("NO_PUSH".parse(), Ok(NotificationType::NoPush));
        assert!("LOUD".parse::<NotificationType>().is_err());
        assert_eq!(NotificationType::NoPush.to_string(), "NO_PUSH");
    }

    #[test]
    fn sender_action_request_has_no_message() {
        let request = Request::new(
            User::from_phone("+15550100"),
            SenderAction::TypingOn,
            NotificationType::NoPush,
        );
        assert!(request.message().is_none());

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["sender_action"], "typing_on");
        assert_eq!(json["notification_type"], "NO_PUSH");
        assert!(json.get("message").is_none());
    }

    #[test]
    fn generic_template_is_wrapped_in_attachment() {
        let mut template = GenericTemplate::new();
        template.add_element(Element::new("Card"));
        let request = Request::new(
            User::from_id(7),
            template.clone(),
            NotificationType::default(),
        );

        let message = request.message().unwrap();
        assert!(message.text.is_none());
        assert_eq!(
            message.attachment,
            Some(Attachment::Template(Template::Generic(template)))
        );
        assert!(request.sender_action().is_none());
    }
}
