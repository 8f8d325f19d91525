//! Send API client
//!
//! Posts [`Request`] envelopes to `/me/messages` and page settings to
//! `/me/thread_settings`, authenticating with the page access token as a
//! query parameter.

mod settings;

use std::path::Path;

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

pub use settings::{CallToActions, GetStarted, Greeting, SettingType, ThreadSetting, ThreadState};

use crate::config::ClientConfig;
use crate::models::{
    ApiResponse, FilePayload, MediaKind, Message, NotificationType, Payload, Request,
    SenderAction, User,
};
use crate::{Error, Result};

const MESSAGES_PATH: &str = "me/messages";

/// Messenger Platform Send API client
pub struct MessengerClient {
    client: Client,
    access_token: SecretString,
    api_base: String,
}

impl MessengerClient {
    /// Create a client from its configuration
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: ClientConfig) -> Result<Self> {
        let ClientConfig {
            access_token,
            api_base,
            request_timeout,
        } = config;

        let client = Client::builder().timeout(request_timeout).build()?;

        Ok(Self {
            client,
            access_token,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Send a payload to a user
    ///
    /// Templates are not validated here; call their `validate` first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] on a non-2xx answer, or a transport or
    /// serialization error
    pub async fn send(
        &self,
        recipient: User,
        payload: impl Into<Payload>,
        notification_type: NotificationType,
    ) -> Result<ApiResponse> {
        let request = Request::new(recipient, payload, notification_type);
        self.send_request(&request).await
    }

    /// Send a prepared request envelope
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] on a non-2xx answer, or a transport or
    /// serialization error
    pub async fn send_request(&self, request: &Request) -> Result<ApiResponse> {
        let body = serde_json::to_vec(request)?;
        tracing::debug!(
            body = %String::from_utf8_lossy(&body),
            "sending message"
        );

        let response = self
            .client
            .post(self.endpoint(MESSAGES_PATH)?)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let response = read_response(response).await?;
        tracing::debug!(
            recipient_id = ?response.recipient_id,
            message_id = ?response.message_id,
            "message sent"
        );
        Ok(response)
    }

    /// Send a plain text message with regular notification
    ///
    /// # Errors
    ///
    /// See [`MessengerClient::send`]
    pub async fn send_text(
        &self,
        recipient: User,
        text: impl Into<String>,
    ) -> Result<ApiResponse> {
        self.send(recipient, Message::with_text(text), NotificationType::Regular)
            .await
    }

    /// Show a typing indicator or mark the conversation as seen
    ///
    /// # Errors
    ///
    /// See [`MessengerClient::send`]
    pub async fn send_action(
        &self,
        recipient: User,
        action: SenderAction,
    ) -> Result<ApiResponse> {
        self.send(recipient, action, NotificationType::Regular).await
    }

    /// Upload a local file as an attachment of the given kind
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, before any request
    /// is made; otherwise as [`MessengerClient::send`]
    pub async fn send_file(
        &self,
        recipient: User,
        path: impl AsRef<Path>,
        kind: MediaKind,
    ) -> Result<ApiResponse> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "file".to_string(), |n| n.to_string_lossy().into_owned());

        let message = Message::with_attachment(kind.attachment(FilePayload::default()));
        let size = data.len();
        let form = Form::new()
            .part("filedata", Part::bytes(data).file_name(file_name.clone()))
            .text("recipient", serde_json::to_string(&recipient)?)
            .text("message", serde_json::to_string(&message)?);

        tracing::debug!(file = %file_name, size, %kind, "uploading attachment");

        let response = self
            .client
            .post(self.endpoint(MESSAGES_PATH)?)
            .multipart(form)
            .send()
            .await?;

        let response = read_response(response).await?;
        tracing::debug!(message_id = ?response.message_id, "attachment sent");
        Ok(response)
    }

    /// POST a JSON body to a Graph API path and return the raw response body
    async fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Vec<u8>> {
        let body = serde_json::to_vec(body)?;
        tracing::debug!(path, body = %String::from_utf8_lossy(&body), "posting");

        let response = self
            .client
            .post(self.endpoint(path)?)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        check_status(status, &bytes)?;
        Ok(bytes.to_vec())
    }

    /// `{api_base}/{path}?access_token=...`
    fn endpoint(&self, path: &str) -> Result<Url> {
        Url::parse_with_params(
            &format!("{}/{path}", self.api_base),
            &[("access_token", self.access_token.expose_secret())],
        )
        .map_err(|e| Error::Config(format!("invalid api base {:?}: {e}", self.api_base)))
    }
}

/// Decode a Send API answer
async fn read_response(response: reqwest::Response) -> Result<ApiResponse> {
    let status = response.status();
    let bytes = response.bytes().await?;
    check_status(status, &bytes)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Turn a non-2xx answer into [`Error::Api`] carrying whatever body was decodable
fn check_status(status: StatusCode, body: &[u8]) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }

    let response: ApiResponse = serde_json::from_slice(body).unwrap_or_default();
    tracing::warn!(
        %status,
        error = ?response.error.as_ref().map(|e| &e.message),
        "Send API request failed"
    );
    Err(Error::Api { status, response })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_base: &str) -> MessengerClient {
        let mut config = ClientConfig::new("tok&en");
        config.api_base = api_base.to_string();
        MessengerClient::new(config).unwrap()
    }

    #[test]
    fn endpoint_carries_encoded_token() {
        let url = client("https://graph.facebook.com/v2.6/")
            .endpoint(MESSAGES_PATH)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://graph.facebook.com/v2.6/me/messages?access_token=tok%26en"
        );
    }

    #[test]
    fn endpoint_rejects_bad_base() {
        let err = client("no scheme").endpoint(MESSAGES_PATH).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn non_success_keeps_decoded_error() {
        let body = br#"{"error":{"message":"bad token","type":"OAuthException","code":190}}"#;
        let err = check_status(StatusCode::UNAUTHORIZED, body).unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized");
        let error = err.api_response().unwrap().error.as_ref().unwrap();
        assert_eq!(error.code, 190);
    }

    #[test]
    fn non_success_with_garbage_body_has_default_response() {
        let err = check_status(StatusCode::BAD_GATEWAY, b"<html>").unwrap_err();
        assert_eq!(err.api_response(), Some(&ApiResponse::default()));
    }

    #[test]
    fn success_passes() {
        check_status(StatusCode::OK, b"").unwrap();
    }
}
