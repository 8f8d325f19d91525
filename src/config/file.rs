//! TOML configuration file loading
//!
//! Supports `~/.config/messenger-bot/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;
use crate::webhook::{DecodeMode, OverflowPolicy};

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct MessengerConfigFile {
    /// Send API settings
    #[serde(default)]
    pub client: ClientFileConfig,

    /// Webhook settings
    #[serde(default)]
    pub webhook: WebhookFileConfig,

    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerFileConfig,
}

/// Send API configuration
#[derive(Debug, Default, Deserialize)]
pub struct ClientFileConfig {
    /// Page access token
    pub access_token: Option<String>,

    /// Graph API base URL (e.g. "https://graph.facebook.com/v2.6")
    pub api_base: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Webhook configuration
#[derive(Debug, Default, Deserialize)]
pub struct WebhookFileConfig {
    /// Route the webhook is mounted on
    pub path: Option<String>,

    pub verify_token: Option<String>,

    pub app_secret: Option<String>,

    /// Event channel capacity
    pub queue_capacity: Option<usize>,

    /// "block", "drop-newest" or "reject"
    pub overflow: Option<OverflowPolicy>,

    /// "lenient" or "strict"
    pub decode: Option<DecodeMode>,
}

/// Server configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// Port to listen on
    pub port: Option<u16>,
}

/// Load the TOML config file from the standard path
///
/// Returns `MessengerConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> MessengerConfigFile {
    let Some(path) = config_file_path() else {
        return MessengerConfigFile::default();
    };

    if !path.exists() {
        return MessengerConfigFile::default();
    }

    match read_config_file(&path) {
        Ok(config) => {
            tracing::info!(path = %path.display(), "loaded config file");
            config
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to load config file, using defaults"
            );
            MessengerConfigFile::default()
        }
    }
}

/// Read and parse a config file at an explicit path
///
/// # Errors
///
/// Returns error if the file cannot be read or is not valid TOML
pub fn read_config_file(path: &Path) -> Result<MessengerConfigFile> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Return the config file path: `~/.config/messenger-bot/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| {
        d.config_dir()
            .join("messenger-bot")
            .join("config.toml")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_parses() {
        let fc: MessengerConfigFile = toml::from_str(
            r#"
            [webhook]
            verify_token = "hello"
            overflow = "drop-newest"

            [server]
            port = 9000
            "#,
        )
        .unwrap();

        assert_eq!(fc.webhook.verify_token.as_deref(), Some("hello"));
        assert_eq!(fc.webhook.overflow, Some(OverflowPolicy::DropNewest));
        assert!(fc.webhook.decode.is_none());
        assert!(fc.client.access_token.is_none());
        assert_eq!(fc.server.port, Some(9000));
    }

    #[test]
    fn empty_file_is_default() {
        let fc: MessengerConfigFile = toml::from_str("").unwrap();
        assert!(fc.client.api_base.is_none());
        assert!(fc.server.port.is_none());
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let result =
            toml::from_str::<MessengerConfigFile>("[webhook]\noverflow = \"drop-oldest\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn missing_explicit_file_is_io_error() {
        let err = read_config_file(Path::new("/nonexistent/messenger-bot.toml")).unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }

    #[test]
    fn config_path_ends_with_app_dir() {
        if let Some(path) = config_file_path() {
            assert!(path.ends_with("messenger-bot/config.toml"));
        }
    }
}
