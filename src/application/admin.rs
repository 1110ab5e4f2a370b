//! Owner-only administration commands.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::info;

use crate::application::text;
use crate::domain::channel::is_disable_keyword;
use crate::domain::{ChannelAlias, ChatRef, SessionId, SettingKey};
use crate::error::Result;
use crate::port::inbound::update::IncomingMessage;
use crate::port::outbound::messenger::Messenger;
use crate::port::outbound::store::{SessionStore, SettingsStore, UserStore};

/// Pacing for `/broadcast`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BroadcastPacing {
    /// Sends between pauses.
    pub batch: usize,
    pub pause: Duration,
}

/// A question the bot asked the owner and is waiting to have answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminPrompt {
    StartMessage,
    StartImage,
}

/// Outcome of a broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub sent: usize,
    pub failed: usize,
}

pub struct AdminService {
    messenger: Arc<dyn Messenger>,
    sessions: Arc<dyn SessionStore>,
    settings: Arc<dyn SettingsStore>,
    users: Arc<dyn UserStore>,
    pacing: BroadcastPacing,
    prompt: Mutex<Option<AdminPrompt>>,
}

impl AdminService {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        sessions: Arc<dyn SessionStore>,
        settings: Arc<dyn SettingsStore>,
        users: Arc<dyn UserStore>,
        pacing: BroadcastPacing,
    ) -> Self {
        Self {
            messenger,
            sessions,
            settings,
            users,
            pacing,
            prompt: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn pending_prompt(&self) -> Option<AdminPrompt> {
        *self.prompt.lock()
    }

    /// Forget any open prompt. Called whenever the owner sends a command.
    pub fn clear_prompt(&self) {
        self.prompt.lock().take();
    }

    pub async fn help(&self, chat_id: i64) -> Result<()> {
        self.reply(chat_id, text::ADMIN_HELP).await
    }

    /// `/setmessage`: the next owner text becomes the start message.
    pub async fn ask_start_message(&self, chat_id: i64) -> Result<()> {
        *self.prompt.lock() = Some(AdminPrompt::StartMessage);
        self.reply(chat_id, text::SET_MESSAGE_PROMPT).await
    }

    /// `/setimage`: the next owner photo becomes the start image.
    pub async fn ask_start_image(&self, chat_id: i64) -> Result<()> {
        *self.prompt.lock() = Some(AdminPrompt::StartImage);
        self.reply(chat_id, text::SET_IMAGE_PROMPT).await
    }

    /// Answer an open prompt with `msg`.
    ///
    /// Returns `false` when no prompt is open or the message does not
    /// carry what the prompt asked for.
    ///
    /// # Errors
    /// Returns storage errors and reply failures.
    pub async fn answer_prompt(&self, msg: &IncomingMessage) -> Result<bool> {
        let prompt = self.pending_prompt();
        let (key, value, done) = match (prompt, &msg.text, msg.photo_file_id()) {
            (Some(AdminPrompt::StartMessage), Some(body), _) => {
                (SettingKey::StartMessage, body.clone(), text::MESSAGE_UPDATED)
            }
            (Some(AdminPrompt::StartImage), _, Some(file_id)) => {
                (SettingKey::StartImage, file_id.to_string(), text::IMAGE_SAVED)
            }
            _ => return Ok(false),
        };
        self.settings.save_setting(key, &value)?;
        self.clear_prompt();
        info!(setting = key.as_str(), "Setting updated");
        self.reply(msg.chat_id, done).await?;
        Ok(true)
    }

    /// `/setchannel <alias> <link>`.
    pub async fn set_channel(&self, chat_id: i64, args: &str) -> Result<()> {
        match ChannelAlias::parse_args(args) {
            Ok(alias) => {
                self.settings.save_channel_alias(&alias)?;
                self.reply(chat_id, &text::alias_added(&alias.alias, &alias.link))
                    .await
            }
            Err(_) => self.reply(chat_id, text::SET_CHANNEL_USAGE).await,
        }
    }

    /// `/listchannels`.
    pub async fn list_channels(&self, chat_id: i64) -> Result<()> {
        let aliases = self.settings.channel_aliases()?;
        if aliases.is_empty() {
            return self.reply(chat_id, text::NO_ALIASES).await;
        }
        let lines: Vec<String> = aliases
            .iter()
            .map(|a| format!("{} -> {}", a.alias, a.link))
            .collect();
        self.reply(chat_id, &format!("Channel aliases:\n{}", lines.join("\n")))
            .await
    }

    /// `/setforcechannel <ref|off>`. Disabling stores an empty value.
    pub async fn set_force_channel(&self, chat_id: i64, args: &str) -> Result<()> {
        let args = args.trim();
        if args.is_empty() {
            return self.reply(chat_id, text::SET_FORCE_USAGE).await;
        }
        if is_disable_keyword(args) {
            self.settings.save_setting(SettingKey::ForceChannel, "")?;
            return self.reply(chat_id, text::FORCE_DISABLED).await;
        }
        self.settings.save_setting(SettingKey::ForceChannel, args)?;
        self.reply(chat_id, &text::force_channel_set(args)).await
    }

    /// `/broadcast <text>`: send to every tracked user in paced batches.
    pub async fn broadcast(&self, chat_id: i64, body: &str) -> Result<BroadcastReport> {
        let body = body.trim();
        if body.is_empty() {
            self.reply(chat_id, text::BROADCAST_USAGE).await?;
            return Ok(BroadcastReport::default());
        }

        let recipients = self.users.user_ids()?;
        let batch = self.pacing.batch.max(1);
        let mut report = BroadcastReport::default();
        for (index, user_id) in recipients.iter().enumerate() {
            match self
                .messenger
                .send_text(&ChatRef::user(*user_id), body, None)
                .await
            {
                Ok(_) => report.sent += 1,
                Err(e) => {
                    report.failed += 1;
                    info!(user_id, error = %e, "Broadcast failed");
                }
            }
            if (index + 1) % batch == 0 && !self.pacing.pause.is_zero() {
                tokio::time::sleep(self.pacing.pause).await;
            }
        }

        info!(sent = report.sent, failed = report.failed, "Broadcast finished");
        self.reply(chat_id, &text::broadcast_finished(report.sent, report.failed))
            .await?;
        Ok(report)
    }

    /// `/stats`: pretty JSON counters.
    pub async fn stats(&self, chat_id: i64) -> Result<()> {
        let stats = self.users.vault_stats(Utc::now())?;
        let body = serde_json::to_string_pretty(&stats)?;
        self.reply(chat_id, &body).await
    }

    /// `/revoke <session_id>`.
    pub async fn revoke(&self, chat_id: i64, args: &str) -> Result<()> {
        let raw = args.trim();
        if raw.is_empty() {
            return self.reply(chat_id, text::REVOKE_USAGE).await;
        }
        let revoked = match SessionId::parse(raw) {
            Ok(id) => self.sessions.revoke_session(&id)?,
            Err(_) => false,
        };
        if revoked {
            info!(session_id = raw, "Session revoked");
            self.reply(chat_id, &text::revoked(raw)).await
        } else {
            self.reply(chat_id, &text::revoke_not_found(raw)).await
        }
    }

    async fn reply(&self, chat_id: i64, body: &str) -> Result<()> {
        self.messenger
            .send_text(&ChatRef::Id(chat_id), body, None)
            .await?;
        Ok(())
    }
}
