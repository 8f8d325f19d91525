use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use messenger_bot::models::{
    Button, Callback, CallbackEvent, MediaKind, Message, NotificationType, User,
};
use messenger_bot::{Config, MessengerClient, Webhook, server};

/// mbot - Facebook Messenger bot toolkit
#[derive(Parser)]
#[command(name = "mbot", version, about)]
struct Cli {
    /// Config file (defaults to ~/.config/messenger-bot/config.toml)
    #[arg(short, long, env = "MESSENGER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Graph API base URL
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the webhook server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
        /// Webhook route path
        #[arg(long)]
        path: Option<String>,
        /// Reply to every text message with the same text
        #[arg(long)]
        echo: bool,
    },
    /// Send a text message
    Send {
        /// Recipient: page-scoped user ID or +phone number
        #[arg(long)]
        to: String,
        #[arg(long)]
        text: String,
        /// REGULAR, SILENT_PUSH or NO_PUSH
        #[arg(long, default_value = "REGULAR")]
        notification: NotificationType,
    },
    /// Upload a local file as an attachment
    SendFile {
        /// Recipient: page-scoped user ID or +phone number
        #[arg(long)]
        to: String,
        /// image, audio, video or file
        #[arg(long, default_value = "file")]
        kind: MediaKind,
        path: PathBuf,
    },
    /// Set the welcome screen greeting
    Greeting { text: String },
    /// Show a Get Started button with this postback payload
    GetStarted { payload: String },
    /// Replace the persistent menu
    Menu {
        /// Postback button as title=payload (repeatable)
        #[arg(long = "postback", value_parser = parse_pair)]
        postbacks: Vec<(String, String)>,
        /// Link button as title=url (repeatable)
        #[arg(long = "url", value_parser = parse_pair)]
        urls: Vec<(String, String)>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info",
        1 => "info,messenger_bot=debug,mbot=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(api_base) = cli.api_base {
        config.client.api_base = api_base.trim_end_matches('/').to_string();
    }
    tracing::debug!(?config, "loaded configuration");

    match cli.command {
        Command::Serve { port, path, echo } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(path) = path {
                config.webhook.path = path;
            }
            serve(config, echo).await
        }
        Command::Send {
            to,
            text,
            notification,
        } => {
            let client = client(config)?;
            let response = client
                .send(recipient(&to), Message::with_text(text), notification)
                .await?;
            println!("{}", response.message_id.unwrap_or_default());
            Ok(())
        }
        Command::SendFile { to, kind, path } => {
            let client = client(config)?;
            let response = client.send_file(recipient(&to), &path, kind).await?;
            println!("{}", response.message_id.unwrap_or_default());
            Ok(())
        }
        Command::Greeting { text } => {
            client(config)?.set_greeting(text).await?;
            println!("greeting set");
            Ok(())
        }
        Command::GetStarted { payload } => {
            client(config)?.set_get_started(payload).await?;
            println!("get started button set");
            Ok(())
        }
        Command::Menu { postbacks, urls } => {
            let buttons: Vec<Button> = postbacks
                .into_iter()
                .map(|(title, payload)| Button::postback(title, payload))
                .chain(urls.into_iter().map(|(title, url)| Button::url(title, url)))
                .collect();
            anyhow::ensure!(!buttons.is_empty(), "menu needs at least one --postback or --url");

            client(config)?.set_persistent_menu(buttons).await?;
            println!("persistent menu set");
            Ok(())
        }
    }
}

fn client(config: Config) -> anyhow::Result<MessengerClient> {
    config.client.validate()?;
    Ok(MessengerClient::new(config.client)?)
}

/// Run the webhook and log (or echo) every callback
async fn serve(config: Config, echo: bool) -> anyhow::Result<()> {
    let Config {
        client: client_config,
        webhook: webhook_config,
        server: server_config,
    } = config;

    webhook_config.validate()?;
    let replier = if echo {
        client_config.validate()?;
        Some(MessengerClient::new(client_config)?)
    } else {
        None
    };

    tracing::info!(
        port = server_config.port,
        path = %webhook_config.path,
        overflow = %webhook_config.overflow,
        decode = %webhook_config.decode,
        echo,
        "starting messenger webhook"
    );

    let (webhook, mut events) = Webhook::new(webhook_config);
    let consumer = tokio::spawn(async move {
        while let Some(callback) = events.recv().await {
            handle_callback(&callback, replier.as_ref()).await;
        }
    });

    let result = server::serve(webhook.router(), server_config.port).await;
    consumer.abort();
    result?;
    Ok(())
}

async fn handle_callback(callback: &Callback, replier: Option<&MessengerClient>) {
    match &callback.event {
        CallbackEvent::Message(message) => {
            tracing::info!(
                sender = ?callback.sender,
                text = %message.text,
                attachments = message.attachments.len(),
                "message received"
            );
            let Some(client) = replier.filter(|_| !message.text.is_empty()) else {
                return;
            };
            if let Err(e) = client
                .send_text(callback.sender.clone(), message.text.clone())
                .await
            {
                tracing::warn!(error = %e, "echo failed");
            }
        }
        CallbackEvent::Postback(postback) => {
            tracing::info!(
                sender = ?callback.sender,
                payload = %postback.payload,
                "postback received"
            );
        }
        CallbackEvent::Optin(optin) => {
            tracing::info!(
                sender = ?callback.sender,
                reference = %optin.reference,
                "optin received"
            );
        }
        CallbackEvent::Delivery(delivery) => {
            tracing::info!(
                mids = delivery.mids.len(),
                watermark = delivery.watermark,
                "delivery received"
            );
        }
        CallbackEvent::Unknown => {
            tracing::debug!(sender = ?callback.sender, "unhandled callback");
        }
    }
}

/// `+15550100` addresses by phone, anything else by page-scoped ID
fn recipient(to: &str) -> User {
    if to.starts_with('+') {
        return User::from_phone(to);
    }
    to.parse().map_or_else(|_| User::from_phone(to), User::from_id)
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .filter(|(title, value)| !title.is_empty() && !value.is_empty())
        .map(|(title, value)| (title.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected title=value, got {s:?}"))
}
