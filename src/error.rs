//! Error types for the Messenger client and webhook

use reqwest::StatusCode;
use thiserror::Error;

use crate::models::{ApiResponse, TemplateError};

/// Result type alias for messenger-bot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the Messenger Platform
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Template failed its pre-flight checks
    #[error("validation error: {0}")]
    Validation(#[from] TemplateError),

    /// Platform answered with a non-2xx status
    ///
    /// `response` holds whatever the platform sent back, including its
    /// structured error when the body could be decoded.
    #[error("{}", status_text(.status))]
    Api {
        status: StatusCode,
        response: ApiResponse,
    },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Platform response attached to an [`Error::Api`]
    #[must_use]
    pub const fn api_response(&self) -> Option<&ApiResponse> {
        match self {
            Self::Api { response, .. } => Some(response),
            _ => None,
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn status_text(status: &StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| status.as_str().to_string(), ToString::to_string)
}
