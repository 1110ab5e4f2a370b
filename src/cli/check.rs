//! Configuration and Telegram access checks.

use std::path::Path;

use serde::Deserialize;
use serde_json::json;

use crate::cli::output;
use crate::domain::ChatRef;
use crate::error::{Error, Result};
use crate::infrastructure::config::Config;

const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Validate configuration without starting the bot.
///
/// # Errors
/// Returns the first configuration error.
pub fn execute_config(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    let upload_channel = config.telegram.upload_channel()?;
    let db_channel = config.telegram.db_channel()?;

    if output::is_json() {
        output::json_output(json!({
            "command": "check.config",
            "owner_id": config.telegram.owner_id,
            "upload_channel": upload_channel.to_string(),
            "db_channel": db_channel.as_ref().map(ToString::to_string),
            "database": config.storage.database,
            "job_database": config.storage.job_database_path(),
            "port": config.server.port,
            "bot_token_present": config.telegram.bot_token.is_some(),
        }));
        return Ok(());
    }

    output::section("Configuration Check");
    if let Some(path) = config_path {
        output::field("Config", path.display());
    }
    output::success("Configuration is valid");

    output::section("Summary");
    output::field("Owner", config.telegram.owner_id()?);
    output::field("Upload channel", &upload_channel);
    match &db_channel {
        Some(channel) => output::field("DB channel", channel),
        None => output::warning("DB_CHANNEL_ID not set; backups are disabled"),
    }
    output::field("Database", &config.storage.database);
    output::field("Job database", config.storage.job_database_path());
    output::field(
        "Health",
        format!("{}:{}", config.server.host, config.server.port),
    );
    match &config.telegram.bot_token {
        Some(token) => output::field("Bot token", output::mask_token(token)),
        None => output::warning("BOT_TOKEN not set; the bot cannot start"),
    }
    Ok(())
}

/// Verify the bot token with `getMe` and probe each configured channel.
///
/// # Errors
/// Returns an error if the token is missing or rejected. Unreachable
/// channels are reported as warnings.
pub async fn execute_telegram(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    let token = config.telegram.bot_token()?;
    let client = TelegramApi::new(TELEGRAM_API_URL, token);

    output::section("Telegram Check");
    output::field("Bot token", output::mask_token(token));

    let me = client.get_me().await?;
    let username = me.username.unwrap_or_default();
    output::success(&format!("Token accepted for @{username}"));

    let mut channels = vec![("Upload channel", config.telegram.upload_channel()?)];
    if let Some(channel) = config.telegram.db_channel()? {
        channels.push(("DB channel", channel));
    }

    let mut reachable = Vec::new();
    for (label, channel) in &channels {
        match client.get_chat(channel).await {
            Ok(()) => {
                output::success(&format!("{label} {channel} is reachable"));
                reachable.push(channel.to_string());
            }
            Err(e) => output::warning(&format!("{label} {channel} is not reachable: {e}")),
        }
    }

    if output::is_json() {
        output::json_output(json!({
            "command": "check.telegram",
            "username": username,
            "reachable_channels": reachable,
        }));
    } else {
        output::hint("the bot must be an admin of both channels");
    }
    Ok(())
}

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

impl<T> ApiResponse<T> {
    fn into_result(self, method: &str) -> Result<T> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(Error::Telegram(format!(
                "{method} failed: {}",
                self.description.unwrap_or_else(|| "no description".into())
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BotUser {
    username: Option<String>,
}

/// Minimal raw Bot API client for diagnostics.
struct TelegramApi {
    client: reqwest::Client,
    base: String,
}

impl TelegramApi {
    fn new(api_url: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: format!("{}/bot{token}", api_url.trim_end_matches('/')),
        }
    }

    async fn get_me(&self) -> Result<BotUser> {
        let response: ApiResponse<BotUser> = self
            .client
            .get(format!("{}/getMe", self.base))
            .send()
            .await?
            .json()
            .await?;
        response.into_result("getMe")
    }

    async fn get_chat(&self, chat: &ChatRef) -> Result<()> {
        let chat_id = match chat {
            ChatRef::Id(id) => json!(id),
            ChatRef::Username(name) => json!(name),
        };
        let response: ApiResponse<serde_json::Value> = self
            .client
            .post(format!("{}/getChat", self.base))
            .json(&json!({ "chat_id": chat_id }))
            .send()
            .await?
            .json()
            .await?;
        response.into_result("getChat").map(|_| ())
    }
}
