//! Public side of the vault: welcome screen, help and session delivery.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::application::scheduler::DeletionScheduler;
use crate::application::text;
use crate::domain::settings::DEFAULT_START_MESSAGE;
use crate::domain::{
    ChatRef, DeletionJob, FileKind, ForceChannel, Session, SessionAccess, SessionId, SettingKey,
    StoredFile,
};
use crate::error::Result;
use crate::port::outbound::messenger::{Button, Keyboard, Messenger, OutgoingFile};
use crate::port::outbound::store::{SessionStore, SettingsStore, UserStore};

/// Channel alias buttons shown on the welcome screen.
const MAX_ALIAS_BUTTONS: usize = 6;

/// Outcome of delivering a session's files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failures: usize,
}

/// Serves `/start` and `/help` for everyone.
pub struct VaultService {
    messenger: Arc<dyn Messenger>,
    sessions: Arc<dyn SessionStore>,
    settings: Arc<dyn SettingsStore>,
    users: Arc<dyn UserStore>,
    scheduler: Arc<DeletionScheduler>,
    upload_channel: ChatRef,
    join_button_text: String,
}

impl VaultService {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        sessions: Arc<dyn SessionStore>,
        settings: Arc<dyn SettingsStore>,
        users: Arc<dyn UserStore>,
        scheduler: Arc<DeletionScheduler>,
        upload_channel: ChatRef,
        join_button_text: impl Into<String>,
    ) -> Self {
        Self {
            messenger,
            sessions,
            settings,
            users,
            scheduler,
            upload_channel,
            join_button_text: join_button_text.into(),
        }
    }

    /// Record that a user interacted with the bot. Failures are logged.
    pub fn track(&self, user_id: i64) {
        if let Err(e) = self.users.touch_user(user_id, Utc::now()) {
            warn!(user_id, error = %e, "Failed to record user activity");
        }
    }

    /// Handle `/start`, with or without a session id argument.
    ///
    /// # Errors
    /// Returns storage errors and failures to send the final reply.
    pub async fn start(&self, chat_id: i64, user_id: i64, argument: Option<&str>) -> Result<()> {
        self.track(user_id);
        match argument.map(str::trim).filter(|a| !a.is_empty()) {
            None => self.welcome(chat_id).await,
            Some(raw) => self.open_session(chat_id, user_id, raw).await.map(|_| ()),
        }
    }

    /// Handle `/help`.
    ///
    /// # Errors
    /// Returns an error if the reply cannot be sent.
    pub async fn help(&self, chat_id: i64) -> Result<()> {
        self.reply(chat_id, text::HELP).await
    }

    async fn welcome(&self, chat_id: i64) -> Result<()> {
        let chat = ChatRef::Id(chat_id);
        let message = self
            .settings
            .setting(SettingKey::StartMessage)?
            .unwrap_or_else(|| DEFAULT_START_MESSAGE.to_string());
        let image = self.settings.setting(SettingKey::StartImage)?;
        let buttons: Vec<Button> = self
            .settings
            .channel_aliases()?
            .into_iter()
            .take(MAX_ALIAS_BUTTONS)
            .map(|a| Button::url(a.alias, a.link))
            .collect();
        let keyboard = Keyboard::column(buttons);
        let keyboard = (!keyboard.is_empty()).then_some(&keyboard);

        if let Some(file_id) = image.filter(|i| !i.is_empty()) {
            let photo = OutgoingFile {
                kind: FileKind::Photo,
                file_id,
                caption: Some(message.clone()),
                protect_content: false,
            };
            match self.messenger.send_file(&chat, &photo, keyboard).await {
                Ok(_) => return Ok(()),
                Err(e) => warn!(chat_id, error = %e, "Start image failed; sending text"),
            }
        }
        self.messenger.send_text(&chat, &message, keyboard).await?;
        Ok(())
    }

    /// Validate a deep-link id and deliver the session.
    ///
    /// Returns the delivery report when files were sent.
    async fn open_session(
        &self,
        chat_id: i64,
        user_id: i64,
        raw_id: &str,
    ) -> Result<Option<DeliveryReport>> {
        let Ok(id) = SessionId::parse(raw_id) else {
            self.reply(chat_id, text::MALFORMED_SESSION).await?;
            return Ok(None);
        };
        let Some(session) = self.sessions.session(&id)? else {
            self.reply(chat_id, text::SESSION_NOT_FOUND).await?;
            return Ok(None);
        };

        match session.access_at(Utc::now()) {
            SessionAccess::Revoked => {
                self.reply(chat_id, text::SESSION_REVOKED).await?;
                return Ok(None);
            }
            SessionAccess::Expired => {
                self.reply(chat_id, text::SESSION_EXPIRED).await?;
                return Ok(None);
            }
            SessionAccess::Granted => {}
        }

        if let Some(channel) = self.required_channel(&session)? {
            if !self.is_member(&channel, user_id).await {
                let keyboard = Keyboard::row(vec![Button::url(
                    self.join_button_text.clone(),
                    channel.join_url(),
                )]);
                self.messenger
                    .send_text(&ChatRef::Id(chat_id), text::MUST_JOIN, Some(&keyboard))
                    .await?;
                return Ok(None);
            }
        }

        let files = self.sessions.files(&id)?;
        if files.is_empty() {
            self.reply(chat_id, text::EMPTY_SESSION).await?;
            return Ok(None);
        }

        let report = self.deliver(chat_id, user_id, &session, &files).await;
        info!(
            session_id = %session.id,
            chat_id,
            delivered = report.delivered,
            failures = report.failures,
            "Session delivered"
        );
        self.reply(chat_id, &text::delivered(report.delivered, report.failures))
            .await?;
        Ok(Some(report))
    }

    /// Session channel, falling back to the global setting.
    fn required_channel(&self, session: &Session) -> Result<Option<ForceChannel>> {
        if let Some(channel) = &session.force_join_channel {
            return Ok(Some(channel.clone()));
        }
        Ok(self
            .settings
            .setting(SettingKey::ForceChannel)?
            .as_deref()
            .and_then(ForceChannel::from_setting))
    }

    async fn is_member(&self, channel: &ForceChannel, user_id: i64) -> bool {
        let Some(chat) = channel.chat_ref() else {
            info!(channel = %channel, user_id, "Cannot verify membership of invite link");
            return false;
        };
        match self.messenger.is_member(&chat, user_id).await {
            Ok(member) => member,
            Err(e) => {
                info!(channel = %channel, user_id, error = %e, "Membership check failed");
                false
            }
        }
    }

    async fn deliver(
        &self,
        chat_id: i64,
        user_id: i64,
        session: &Session,
        files: &[StoredFile],
    ) -> DeliveryReport {
        let chat = ChatRef::Id(chat_id);
        let mut report = DeliveryReport::default();

        for file in files {
            match self.send_one(&chat, session, file).await {
                Ok(message_id) => {
                    report.delivered += 1;
                    self.schedule_deletion(session, user_id, chat_id, message_id);
                }
                Err(e) => {
                    warn!(
                        session_id = %session.id,
                        file = file.id,
                        user_id,
                        error = %e,
                        "Delivery failed"
                    );
                    report.failures += 1;
                }
            }
        }
        report
    }

    async fn send_one(&self, chat: &ChatRef, session: &Session, file: &StoredFile) -> Result<i32> {
        match (file.kind, &file.file_id) {
            // sendVoice cannot set protect_content.
            (Some(FileKind::Voice), _) if session.protect_content => {
                self.messenger
                    .copy_message(chat, &self.upload_channel, file.upload_channel_msg_id, true)
                    .await
            }
            (Some(kind), Some(file_id)) => {
                let outgoing = OutgoingFile {
                    kind,
                    file_id: file_id.clone(),
                    caption: file.caption.clone().filter(|c| !c.is_empty()),
                    protect_content: session.protect_content,
                };
                let sent = self.messenger.send_file(chat, &outgoing, None).await?;
                Ok(sent.message_id)
            }
            _ => {
                self.messenger
                    .copy_message(
                        chat,
                        &self.upload_channel,
                        file.upload_channel_msg_id,
                        session.protect_content,
                    )
                    .await
            }
        }
    }

    fn schedule_deletion(&self, session: &Session, user_id: i64, chat_id: i64, message_id: i32) {
        let now = Utc::now();
        let Some(run_at) = session.auto_delete.deadline_from(now) else {
            return;
        };
        let job = DeletionJob::new(session.id.clone(), user_id, chat_id, message_id, run_at, now);
        debug!(job_id = %job.id, session_id = %session.id, %run_at, "Scheduling deletion");
        if let Err(e) = self.scheduler.schedule(job) {
            warn!(session_id = %session.id, chat_id, error = %e, "Failed to schedule deletion");
        }
    }

    async fn reply(&self, chat_id: i64, body: &str) -> Result<()> {
        self.messenger
            .send_text(&ChatRef::Id(chat_id), body, None)
            .await?;
        Ok(())
    }
}
