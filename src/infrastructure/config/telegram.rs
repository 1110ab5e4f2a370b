//! Telegram bot settings.

use serde::Deserialize;

use crate::domain::ChatRef;
use crate::error::{ConfigError, Result};

fn default_join_button_text() -> String {
    "Join Channel".to_string()
}

/// Bot owner and channel configuration.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct TelegramSettings {
    /// Loaded from `BOT_TOKEN` only.
    #[serde(skip)]
    pub bot_token: Option<String>,
    /// The single account allowed to upload and administer.
    pub owner_id: Option<i64>,
    /// Channel that stores every uploaded file (`-100…` id or `@name`).
    pub upload_channel: Option<String>,
    /// Channel receiving database backups. Backups are skipped without it.
    pub db_channel: Option<String>,
    /// Label of the join button shown to non-members.
    pub force_join_button_text: String,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            bot_token: None,
            owner_id: None,
            upload_channel: None,
            db_channel: None,
            force_join_button_text: default_join_button_text(),
        }
    }
}

impl std::fmt::Debug for TelegramSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSettings")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("owner_id", &self.owner_id)
            .field("upload_channel", &self.upload_channel)
            .field("db_channel", &self.db_channel)
            .field("force_join_button_text", &self.force_join_button_text)
            .finish()
    }
}

impl TelegramSettings {
    /// The bot token.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingField`] when `BOT_TOKEN` is unset.
    #[allow(clippy::result_large_err)]
    pub fn bot_token(&self) -> Result<&str> {
        self.bot_token
            .as_deref()
            .ok_or_else(|| ConfigError::MissingField { field: "BOT_TOKEN" }.into())
    }

    /// The owner id.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingField`] when no owner is configured.
    #[allow(clippy::result_large_err)]
    pub fn owner_id(&self) -> Result<i64> {
        self.owner_id
            .ok_or_else(|| ConfigError::MissingField { field: "OWNER_ID" }.into())
    }

    /// The parsed upload channel.
    ///
    /// # Errors
    /// Returns a config error when it is missing or malformed.
    #[allow(clippy::result_large_err)]
    pub fn upload_channel(&self) -> Result<ChatRef> {
        let raw = self.upload_channel.as_deref().ok_or(ConfigError::MissingField {
            field: "UPLOAD_CHANNEL_ID",
        })?;
        parse_channel("UPLOAD_CHANNEL_ID", raw)
    }

    /// The parsed backup channel, if configured.
    ///
    /// # Errors
    /// Returns a config error when it is malformed.
    #[allow(clippy::result_large_err)]
    pub fn db_channel(&self) -> Result<Option<ChatRef>> {
        self.db_channel
            .as_deref()
            .map(|raw| parse_channel("DB_CHANNEL_ID", raw))
            .transpose()
    }
}

#[allow(clippy::result_large_err)]
fn parse_channel(field: &'static str, raw: &str) -> Result<ChatRef> {
    ChatRef::parse(raw).map_err(|e| {
        ConfigError::InvalidValue {
            field,
            reason: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_token() {
        let settings = TelegramSettings {
            bot_token: Some("123:secret".into()),
            ..TelegramSettings::default()
        };
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn blank_channel_is_invalid() {
        let settings = TelegramSettings {
            upload_channel: Some("@".into()),
            ..TelegramSettings::default()
        };
        assert!(settings.upload_channel().is_err());
    }
}
