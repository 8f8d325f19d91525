//! Thread settings: greeting text, Get Started button and persistent menu

use serde::Serialize;

use super::MessengerClient;
use crate::Result;
use crate::models::Button;

const SETTINGS_PATH: &str = "me/thread_settings";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingType {
    Greeting,
    CallToActions,
}

/// Which conversations a call-to-action setting applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadState {
    /// Shown before the first message
    NewThread,
    /// Shown in ongoing conversations
    ExistingThread,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Greeting {
    pub text: String,
}

/// Postback sent when the user taps Get Started
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetStarted {
    pub payload: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CallToActions {
    GetStarted(Vec<GetStarted>),
    Menu(Vec<Button>),
}

/// Body of a `POST /me/thread_settings` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadSetting {
    pub setting_type: SettingType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_state: Option<ThreadState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_to_actions: Option<CallToActions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeting: Option<Greeting>,
}

impl ThreadSetting {
    #[must_use]
    pub fn greeting(text: impl Into<String>) -> Self {
        Self {
            setting_type: SettingType::Greeting,
            thread_state: None,
            call_to_actions: None,
            greeting: Some(Greeting { text: text.into() }),
        }
    }

    #[must_use]
    pub fn get_started(payload: impl Into<String>) -> Self {
        Self {
            setting_type: SettingType::CallToActions,
            thread_state: Some(ThreadState::NewThread),
            call_to_actions: Some(CallToActions::GetStarted(vec![GetStarted {
                payload: payload.into(),
            }])),
            greeting: None,
        }
    }

    #[must_use]
    pub fn persistent_menu(buttons: Vec<Button>) -> Self {
        Self {
            setting_type: SettingType::CallToActions,
            thread_state: Some(ThreadState::ExistingThread),
            call_to_actions: Some(CallToActions::Menu(buttons)),
            greeting: None,
        }
    }
}

impl MessengerClient {
    /// Apply a thread setting to the page
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Api`] on a non-2xx answer, or a transport error
    pub async fn set_thread_setting(&self, setting: &ThreadSetting) -> Result<()> {
        let body = self.post_json(SETTINGS_PATH, setting).await?;
        tracing::debug!(
            setting_type = ?setting.setting_type,
            response = %String::from_utf8_lossy(&body),
            "thread setting applied"
        );
        Ok(())
    }

    /// Set the text shown on the welcome screen
    ///
    /// # Errors
    ///
    /// See [`MessengerClient::set_thread_setting`]
    pub async fn set_greeting(&self, text: impl Into<String>) -> Result<()> {
        self.set_thread_setting(&ThreadSetting::greeting(text)).await
    }

    /// Show a Get Started button that posts back `payload`
    ///
    /// # Errors
    ///
    /// See [`MessengerClient::set_thread_setting`]
    pub async fn set_get_started(&self, payload: impl Into<String>) -> Result<()> {
        self.set_thread_setting(&ThreadSetting::get_started(payload))
            .await
    }

    /// Replace the persistent menu
    ///
    /// # Errors
    ///
    /// See [`MessengerClient::set_thread_setting`]
    pub async fn set_persistent_menu(&self, buttons: Vec<Button>) -> Result<()> {
        self.set_thread_setting(&ThreadSetting::persistent_menu(buttons))
            .await
    }
}
