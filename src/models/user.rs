//! Users and pages

use serde::{Deserialize, Serialize};

/// A Messenger user, addressed either by page-scoped ID or by phone number
///
/// On the wire this is `{"id":"<decimal>"}` or `{"phone_number":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawUser", into = "RawUser")]
pub enum User {
    /// Page-scoped user ID
    Id(i64),
    /// Phone number in `+<country><number>` form
    Phone(String),
}

impl User {
    /// Address a user by page-scoped ID
    #[must_use]
    pub const fn from_id(id: i64) -> Self {
        Self::Id(id)
    }

    /// Address a user by phone number
    #[must_use]
    pub fn from_phone(phone: impl Into<String>) -> Self {
        Self::Phone(phone.into())
    }

    /// Page-scoped ID, if this user is addressed by ID
    #[must_use]
    pub const fn id(&self) -> Option<i64> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Phone(_) => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawUser {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::models::string_id::option"
    )]
    id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    phone_number: Option<String>,
}

impl TryFrom<RawUser> for User {
    type Error = String;

    fn try_from(raw: RawUser) -> Result<Self, Self::Error> {
        match (raw.id, raw.phone_number) {
            (Some(id), None) => Ok(Self::Id(id)),
            (None, Some(phone)) => Ok(Self::Phone(phone)),
            (Some(_), Some(_)) => Err("user has both id and phone_number".to_string()),
            (None, None) => Err("user has neither id nor phone_number".to_string()),
        }
    }
}

impl From<User> for RawUser {
    fn from(user: User) -> Self {
        match user {
            User::Id(id) => Self {
                id: Some(id),
                phone_number: None,
            },
            User::Phone(phone) => Self {
                id: None,
                phone_number: Some(phone),
            },
        }
    }
}

/// The Facebook page a callback was addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Page {
    #[serde(with = "crate::models::string_id")]
    pub id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_user_serializes_as_string() {
        let json = serde_json::to_value(User::from_id(1_234)).unwrap();
        assert_eq!(json, serde_json::json!({ "id": "1234" }));
    }

    #[test]
    fn phone_user_serializes_phone_number() {
        let json = serde_json::to_value(User::from_phone("+15550100")).unwrap();
        assert_eq!(json, serde_json::json!({ "phone_number": "+15550100" }));
    }

    #[test]
    fn user_id_accepts_string_or_number() {
        let a: User = serde_json::from_str(r#"{"id":"42"}"#).unwrap();
        let b: User = serde_json::from_str(r#"{"id":42}"#).unwrap();
        assert_eq!(a, User::Id(42));
        assert_eq!(a, b);
    }

    #[test]
    fn user_without_identifier_is_rejected() {
        assert!(serde_json::from_str::<User>("{}").is_err());
        assert!(serde_json::from_str::<User>(r#"{"id":"1","phone_number":"+1"}"#).is_err());
    }

    #[test]
    fn page_id_round_trips() {
        let page: Page = serde_json::from_str(r#"{"id":"987"}"#).unwrap();
        assert_eq!(page.id, 987);
        assert_eq!(serde_json::to_string(&page).unwrap(), r#"{"id":"987"}"#);
    }
}
