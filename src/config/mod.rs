//! Configuration management for the Messenger bot
//!
//! Sources, lowest priority first: built-in defaults, the TOML file from
//! [`file::config_file_path`], then `MESSENGER_*` environment variables.
//! Command-line flags are applied on top by the binary.

pub mod file;

use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::webhook::{DecodeMode, OverflowPolicy};
use crate::{Error, Result};

pub use file::MessengerConfigFile;

/// Graph API version the wire formats in this crate follow
pub const DEFAULT_API_BASE: &str = "https://graph.facebook.com/v2.6";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_WEBHOOK_PATH: &str = "/webhook";
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;
pub const DEFAULT_PORT: u16 = 8080;

/// Messenger bot configuration
#[derive(Debug)]
pub struct Config {
    /// Send API client configuration
    pub client: ClientConfig,

    /// Inbound webhook configuration
    pub webhook: WebhookConfig,

    /// HTTP listener configuration
    pub server: ServerConfig,
}

/// Send API client configuration
#[derive(Debug)]
pub struct ClientConfig {
    /// Page access token (from `MESSENGER_PAGE_TOKEN` env)
    pub access_token: SecretString,

    /// Graph API base URL, without a trailing slash
    pub api_base: String,

    /// Timeout for a whole request/response round trip
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Configuration with default endpoint and timeout
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Check the client configuration
    ///
    /// # Errors
    ///
    /// Returns error if the token is empty, the base URL is invalid or the
    /// timeout is zero
    pub fn validate(&self) -> Result<()> {
        if self.access_token.expose_secret().is_empty() {
            return Err(Error::Config(
                "page access token required (MESSENGER_PAGE_TOKEN)".to_string(),
            ));
        }
        reqwest::Url::parse(&self.api_base)
            .map_err(|e| Error::Config(format!("invalid api base {:?}: {e}", self.api_base)))?;
        if self.request_timeout.is_zero() {
            return Err(Error::Config("request timeout must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Inbound webhook configuration
#[derive(Debug)]
pub struct WebhookConfig {
    /// Route path, starting with `/`
    pub path: String,

    /// Token echoed back during the subscription handshake
    pub verify_token: SecretString,

    /// App secret keying the body signature
    pub app_secret: SecretString,

    /// Capacity of the event channel
    pub queue_capacity: usize,

    /// Behavior when the event channel is full
    pub overflow: OverflowPolicy,

    /// Behavior when a signed body fails to decode
    pub decode: DecodeMode,
}

impl WebhookConfig {
    /// Configuration with default path, capacity and policies
    #[must_use]
    pub fn new(verify_token: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            path: DEFAULT_WEBHOOK_PATH.to_string(),
            verify_token: SecretString::from(verify_token.into()),
            app_secret: SecretString::from(app_secret.into()),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            overflow: OverflowPolicy::default(),
            decode: DecodeMode::default(),
        }
    }

    /// Check the webhook configuration
    ///
    /// # Errors
    ///
    /// Returns error if a secret is empty, the capacity is zero or the path
    /// does not start with `/`
    pub fn validate(&self) -> Result<()> {
        if self.verify_token.expose_secret().is_empty() {
            return Err(Error::Config(
                "verify token required (MESSENGER_VERIFY_TOKEN)".to_string(),
            ));
        }
        if self.app_secret.expose_secret().is_empty() {
            return Err(Error::Config(
                "app secret required (MESSENGER_APP_SECRET)".to_string(),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(Error::Config("queue capacity must be at least 1".to_string()));
        }
        if !self.path.starts_with('/') {
            return Err(Error::Config(format!(
                "webhook path must start with '/': {:?}",
                self.path
            )));
        }
        Ok(())
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Copy)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl Config {
    /// Load configuration from the standard config file and the environment
    ///
    /// # Errors
    ///
    /// Returns error if an environment variable holds an unparsable value
    pub fn load() -> Result<Self> {
        Self::from_sources(file::load_config_file(), |key| std::env::var(key).ok())
    }

    /// Load configuration from an explicit config file and the environment
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed, or an environment
    /// variable holds an unparsable value
    pub fn load_from(path: &Path) -> Result<Self> {
        let fc = file::read_config_file(path)?;
        tracing::info!(path = %path.display(), "loaded config file");
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Merge a parsed config file with environment lookups (env > toml > default)
    ///
    /// Missing secrets become empty strings; [`Config::validate`] reports them.
    ///
    /// # Errors
    ///
    /// Returns error if an environment variable holds an unparsable value
    pub fn from_sources(
        fc: MessengerConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let secret = |key: &str, file: Option<String>| {
            SecretString::from(env(key).or(file).unwrap_or_default())
        };

        let client = ClientConfig {
            access_token: secret("MESSENGER_PAGE_TOKEN", fc.client.access_token),
            api_base: env("MESSENGER_API_BASE")
                .or(fc.client.api_base)
                .map_or_else(
                    || DEFAULT_API_BASE.to_string(),
                    |base| base.trim_end_matches('/').to_string(),
                ),
            request_timeout: parse_env(&env, "MESSENGER_TIMEOUT_SECS")?
                .or(fc.client.timeout_secs)
                .map_or(DEFAULT_TIMEOUT, Duration::from_secs),
        };

        let webhook = WebhookConfig {
            path: env("MESSENGER_WEBHOOK_PATH")
                .or(fc.webhook.path)
                .unwrap_or_else(|| DEFAULT_WEBHOOK_PATH.to_string()),
            verify_token: secret("MESSENGER_VERIFY_TOKEN", fc.webhook.verify_token),
            app_secret: secret("MESSENGER_APP_SECRET", fc.webhook.app_secret),
            queue_capacity: parse_env(&env, "MESSENGER_QUEUE_CAPACITY")?
                .or(fc.webhook.queue_capacity)
                .unwrap_or(DEFAULT_QUEUE_CAPACITY),
            overflow: parse_env(&env, "MESSENGER_OVERFLOW")?
                .or(fc.webhook.overflow)
                .unwrap_or_default(),
            decode: parse_env(&env, "MESSENGER_DECODE")?
                .or(fc.webhook.decode)
                .unwrap_or_default(),
        };

        let server = ServerConfig {
            port: parse_env(&env, "MESSENGER_PORT")?
                .or(fc.server.port)
                .unwrap_or(DEFAULT_PORT),
        };

        Ok(Self {
            client,
            webhook,
            server,
        })
    }

    /// Check the whole configuration
    ///
    /// # Errors
    ///
    /// Returns the first problem found in the client or webhook section
    pub fn validate(&self) -> Result<()> {
        self.client.validate()?;
        self.webhook.validate()
    }
}

/// Parse an optional environment value, naming the variable on failure
fn parse_env<T>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    env(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| Error::Config(format!("invalid {key}: {e}")))
        })
        .transpose()
}
