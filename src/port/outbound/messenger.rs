//! Messenger port: the subset of the Telegram Bot API the vault needs.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::{ChatRef, FileKind};
use crate::error::Result;

/// One inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Button {
    Url { text: String, url: String },
    Callback { text: String, data: String },
}

impl Button {
    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Url {
            text: text.into(),
            url: url.into(),
        }
    }

    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self::Callback {
            text: text.into(),
            data: data.into(),
        }
    }
}

/// Inline keyboard attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    /// A keyboard with one button per row.
    #[must_use]
    pub fn column(buttons: Vec<Button>) -> Self {
        Self {
            rows: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }

    /// A keyboard with a single row.
    #[must_use]
    pub fn row(buttons: Vec<Button>) -> Self {
        Self {
            rows: vec![buttons],
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }
}

/// A previously uploaded file to re-send by file id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingFile {
    pub kind: FileKind,
    pub file_id: String,
    pub caption: Option<String>,
    pub protect_content: bool,
}

/// Where a new document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Path(PathBuf),
    Memory { file_name: String, bytes: Vec<u8> },
}

/// Identifiers of a message the bot sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentMessage {
    pub message_id: i32,
    /// File id of the attached document, if any.
    pub file_id: Option<String>,
    pub file_unique_id: Option<String>,
}

/// Outbound messaging operations.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a text message.
    async fn send_text(
        &self,
        chat: &ChatRef,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<SentMessage>;

    /// Re-send a stored file by its file id.
    async fn send_file(
        &self,
        chat: &ChatRef,
        file: &OutgoingFile,
        keyboard: Option<&Keyboard>,
    ) -> Result<SentMessage>;

    /// Upload a new document.
    async fn send_document(
        &self,
        chat: &ChatRef,
        source: DocumentSource,
        caption: Option<&str>,
    ) -> Result<SentMessage>;

    /// Copy a message between chats. Returns the new message id.
    async fn copy_message(
        &self,
        to: &ChatRef,
        from: &ChatRef,
        message_id: i32,
        protect_content: bool,
    ) -> Result<i32>;

    /// Delete a message.
    async fn delete_message(&self, chat: &ChatRef, message_id: i32) -> Result<()>;

    /// Pin a message without notifying members.
    async fn pin_message(&self, chat: &ChatRef, message_id: i32) -> Result<()>;

    /// Whether the user is a present member of the chat.
    async fn is_member(&self, chat: &ChatRef, user_id: i64) -> Result<bool>;

    /// Check that the bot can reach a chat.
    async fn probe_chat(&self, chat: &ChatRef) -> Result<()>;

    /// The bot's own username without `@`.
    async fn bot_username(&self) -> Result<String>;

    /// Acknowledge a callback query, optionally with a toast.
    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_keyboard_has_one_button_per_row() {
        let keyboard = Keyboard::column(vec![
            Button::url("a", "https://t.me/a"),
            Button::url("b", "https://t.me/b"),
        ]);
        assert_eq!(keyboard.rows.len(), 2);
        assert!(keyboard.rows.iter().all(|row| row.len() == 1));
    }

    #[test]
    fn empty_keyboard_detection() {
        assert!(Keyboard::default().is_empty());
        assert!(Keyboard::column(Vec::new()).is_empty());
        assert!(!Keyboard::row(vec![Button::callback("x", "y")]).is_empty());
    }
}
