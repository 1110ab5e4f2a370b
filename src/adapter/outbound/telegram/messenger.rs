//! Teloxide-backed [`Messenger`].
//!
//! Translates the transport-neutral port types into Bot API requests.

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    ChatMemberKind, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MessageId, Recipient,
};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::domain::{ChatRef, FileKind};
use crate::error::{Error, Result};
use crate::port::outbound::messenger::{
    Button, DocumentSource, Keyboard, Messenger, OutgoingFile, SentMessage,
};

/// Messenger talking to the Telegram Bot API through teloxide.
///
/// The bot username is fetched with `getMe` once and cached; clones share
/// the cache.
#[derive(Clone)]
pub struct TeloxideMessenger {
    bot: Bot,
    username: Arc<OnceCell<String>>,
}

impl TeloxideMessenger {
    #[must_use]
    pub fn new(bot: Bot) -> Self {
        Self {
            bot,
            username: Arc::new(OnceCell::new()),
        }
    }

    /// Messenger whose username is already known, skipping `getMe`.
    #[must_use]
    pub fn with_username(bot: Bot, username: impl Into<String>) -> Self {
        Self {
            bot,
            username: Arc::new(OnceCell::new_with(Some(username.into()))),
        }
    }

    /// Underlying bot handle, shared with the update listener.
    #[must_use]
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

/// Convert a chat reference into a Bot API recipient.
#[must_use]
pub fn to_recipient(chat: &ChatRef) -> Recipient {
    match chat {
        ChatRef::Id(id) => Recipient::Id(ChatId(*id)),
        ChatRef::Username(name) => Recipient::ChannelUsername(name.clone()),
    }
}

/// Convert a keyboard into inline markup.
///
/// # Errors
/// Returns [`Error::Parse`] if a URL button carries an invalid URL.
pub fn to_markup(keyboard: &Keyboard) -> Result<InlineKeyboardMarkup> {
    let rows = keyboard
        .rows
        .iter()
        .map(|row| row.iter().map(to_button).collect::<Result<Vec<_>>>())
        .collect::<Result<Vec<_>>>()?;
    Ok(InlineKeyboardMarkup::new(rows))
}

fn to_button(button: &Button) -> Result<InlineKeyboardButton> {
    match button {
        Button::Url { text, url } => {
            let url = url::Url::parse(url)
                .map_err(|e| Error::Parse(format!("button url `{url}`: {e}")))?;
            Ok(InlineKeyboardButton::url(text.clone(), url))
        }
        Button::Callback { text, data } => {
            Ok(InlineKeyboardButton::callback(text.clone(), data.clone()))
        }
    }
}

fn sent(msg: &Message) -> SentMessage {
    let document = msg.document();
    SentMessage {
        message_id: msg.id.0,
        file_id: document.map(|d| d.file.id.to_string()),
        file_unique_id: document.map(|d| d.file.unique_id.to_string()),
    }
}

/// Only plain members, administrators and the creator pass a forced join.
fn grants_access(kind: &ChatMemberKind) -> bool {
    matches!(
        kind,
        ChatMemberKind::Member | ChatMemberKind::Administrator(_) | ChatMemberKind::Owner(_)
    )
}

fn user_id(user_id: i64) -> Result<UserId> {
    u64::try_from(user_id)
        .map(UserId)
        .map_err(|_| Error::Parse(format!("user id {user_id} is negative")))
}

/// Send a file-id request, applying the shared optional settings.
///
/// `sendVoice` has no `protect_content` flag, so voice uses the
/// `@unprotected` arm and protected voice notes are delivered by copying.
macro_rules! send_by_id {
    (@finish $request:expr, $file:expr, $markup:expr) => {{
        let mut request = $request;
        if let Some(caption) = &$file.caption {
            request = request.caption(caption.clone());
        }
        if let Some(markup) = $markup {
            request = request.reply_markup(markup);
        }
        request.await?
    }};
    (@unprotected $bot:expr, $method:ident, $chat:expr, $file:expr, $markup:expr) => {{
        let request = $bot.$method($chat, InputFile::file_id($file.file_id.clone()));
        send_by_id!(@finish request, $file, $markup)
    }};
    ($bot:expr, $method:ident, $chat:expr, $file:expr, $markup:expr) => {{
        let request = $bot
            .$method($chat, InputFile::file_id($file.file_id.clone()))
            .protect_content($file.protect_content);
        send_by_id!(@finish request, $file, $markup)
    }};
}

#[async_trait]
impl Messenger for TeloxideMessenger {
    async fn send_text(
        &self,
        chat: &ChatRef,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<SentMessage> {
        let mut request = self.bot.send_message(to_recipient(chat), text);
        if let Some(keyboard) = keyboard.filter(|k| !k.is_empty()) {
            request = request.reply_markup(to_markup(keyboard)?);
        }
        let msg = request.await?;
        Ok(sent(&msg))
    }

    async fn send_file(
        &self,
        chat: &ChatRef,
        file: &OutgoingFile,
        keyboard: Option<&Keyboard>,
    ) -> Result<SentMessage> {
        let recipient = to_recipient(chat);
        let markup = keyboard
            .filter(|k| !k.is_empty())
            .map(to_markup)
            .transpose()?;
        let msg = match file.kind {
            FileKind::Photo => send_by_id!(self.bot, send_photo, recipient, file, markup),
            FileKind::Document => send_by_id!(self.bot, send_document, recipient, file, markup),
            FileKind::Video => send_by_id!(self.bot, send_video, recipient, file, markup),
            FileKind::Audio => send_by_id!(self.bot, send_audio, recipient, file, markup),
            FileKind::Voice if file.protect_content => {
                return Err(Error::Telegram(
                    "voice notes cannot be sent protected by file id".into(),
                ));
            }
            FileKind::Voice => {
                send_by_id!(@unprotected self.bot, send_voice, recipient, file, markup)
            }
        };
        Ok(sent(&msg))
    }

    async fn send_document(
        &self,
        chat: &ChatRef,
        source: DocumentSource,
        caption: Option<&str>,
    ) -> Result<SentMessage> {
        let input = match source {
            DocumentSource::Path(path) => InputFile::file(path),
            DocumentSource::Memory { file_name, bytes } => {
                InputFile::memory(bytes).file_name(file_name)
            }
        };
        let mut request = self.bot.send_document(to_recipient(chat), input);
        if let Some(caption) = caption {
            request = request.caption(caption.to_string());
        }
        let msg = request.await?;
        Ok(sent(&msg))
    }

    async fn copy_message(
        &self,
        to: &ChatRef,
        from: &ChatRef,
        message_id: i32,
        protect_content: bool,
    ) -> Result<i32> {
        let copied = self
            .bot
            .copy_message(to_recipient(to), to_recipient(from), MessageId(message_id))
            .protect_content(protect_content)
            .await?;
        Ok(copied.0)
    }

    async fn delete_message(&self, chat: &ChatRef, message_id: i32) -> Result<()> {
        self.bot
            .delete_message(to_recipient(chat), MessageId(message_id))
            .await?;
        Ok(())
    }

    async fn pin_message(&self, chat: &ChatRef, message_id: i32) -> Result<()> {
        self.bot
            .pin_chat_message(to_recipient(chat), MessageId(message_id))
            .disable_notification(true)
            .await?;
        Ok(())
    }

    async fn is_member(&self, chat: &ChatRef, user: i64) -> Result<bool> {
        let member = self
            .bot
            .get_chat_member(to_recipient(chat), user_id(user)?)
            .await?;
        Ok(grants_access(&member.kind))
    }

    async fn probe_chat(&self, chat: &ChatRef) -> Result<()> {
        let info = self.bot.get_chat(to_recipient(chat)).await?;
        debug!(chat = %chat, id = info.id.0, "Chat reachable");
        Ok(())
    }

    async fn bot_username(&self) -> Result<String> {
        let username = self
            .username
            .get_or_try_init(|| async {
                let me = self.bot.get_me().await?;
                Ok::<_, Error>(me.username().to_string())
            })
            .await?;
        Ok(username.clone())
    }

    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        let mut request = self.bot.answer_callback_query(callback_id.to_string());
        if let Some(text) = text {
            request = request.text(text.to_string());
        }
        request.await?;
        Ok(())
    }
}
