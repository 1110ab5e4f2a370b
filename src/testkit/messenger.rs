//! In-memory [`Messenger`] that records every outbound call.

use std::collections::HashSet;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{ChatRef, FileKind};
use crate::error::{Error, Result};
use crate::port::outbound::messenger::{
    DocumentSource, Keyboard, Messenger, OutgoingFile, SentMessage,
};

/// One recorded outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text {
        chat: ChatRef,
        text: String,
        keyboard: Option<Keyboard>,
    },
    File {
        chat: ChatRef,
        file: OutgoingFile,
        keyboard: Option<Keyboard>,
    },
    Document {
        chat: ChatRef,
        source: DocumentSource,
        caption: Option<String>,
    },
    Copied {
        to: ChatRef,
        from: ChatRef,
        message_id: i32,
        protect_content: bool,
    },
    Deleted {
        chat: ChatRef,
        message_id: i32,
    },
    Pinned {
        chat: ChatRef,
        message_id: i32,
    },
    Answered {
        callback_id: String,
        text: Option<String>,
    },
}

#[derive(Default)]
struct Faults {
    unreachable_chats: HashSet<ChatRef>,
    failing_kinds: HashSet<FileKind>,
    deletes: bool,
    pins: bool,
    copies: bool,
    membership: bool,
}

/// Thread-safe messenger double.
///
/// Successful calls get increasing message ids starting at 1000. Faults
/// are injected per chat, per file kind, or per operation.
pub struct RecordingMessenger {
    sent: Mutex<Vec<Sent>>,
    next_id: AtomicI32,
    members: Mutex<HashSet<(ChatRef, i64)>>,
    faults: Mutex<Faults>,
    username: Mutex<Option<String>>,
}

impl Default for RecordingMessenger {
    fn default() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(1000),
            members: Mutex::new(HashSet::new()),
            faults: Mutex::new(Faults::default()),
            username: Mutex::new(Some("vault_bot".to_string())),
        }
    }
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded call in order.
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }

    /// Texts sent to `chat`, in order.
    pub fn texts_to(&self, chat: &ChatRef) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter_map(|s| match s {
                Sent::Text { chat: c, text, .. } if c == chat => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Most recent text sent to `chat`.
    pub fn last_text_to(&self, chat: &ChatRef) -> Option<String> {
        self.texts_to(chat).pop()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }

    pub fn add_member(&self, chat: ChatRef, user_id: i64) {
        self.members.lock().insert((chat, user_id));
    }

    pub fn set_username(&self, username: Option<&str>) {
        *self.username.lock() = username.map(str::to_string);
    }

    /// Make every call addressed to `chat` fail.
    pub fn fail_chat(&self, chat: ChatRef) {
        self.faults.lock().unreachable_chats.insert(chat);
    }

    /// Make `send_file` fail for one kind.
    pub fn fail_kind(&self, kind: FileKind) {
        self.faults.lock().failing_kinds.insert(kind);
    }

    pub fn fail_deletes(&self) {
        self.faults.lock().deletes = true;
    }

    pub fn fail_pins(&self) {
        self.faults.lock().pins = true;
    }

    pub fn fail_copies(&self) {
        self.faults.lock().copies = true;
    }

    pub fn fail_membership(&self) {
        self.faults.lock().membership = true;
    }

    fn check_chat(&self, chat: &ChatRef) -> Result<()> {
        if self.faults.lock().unreachable_chats.contains(chat) {
            return Err(Error::Telegram(format!("chat {chat} unreachable")));
        }
        Ok(())
    }

    fn record(&self, entry: Sent) -> i32 {
        self.sent.lock().push(entry);
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(
        &self,
        chat: &ChatRef,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<SentMessage> {
        self.check_chat(chat)?;
        let message_id = self.record(Sent::Text {
            chat: chat.clone(),
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(SentMessage {
            message_id,
            ..SentMessage::default()
        })
    }

    async fn send_file(
        &self,
        chat: &ChatRef,
        file: &OutgoingFile,
        keyboard: Option<&Keyboard>,
    ) -> Result<SentMessage> {
        self.check_chat(chat)?;
        if self.faults.lock().failing_kinds.contains(&file.kind) {
            return Err(Error::Telegram(format!("cannot send {}", file.kind)));
        }
        let message_id = self.record(Sent::File {
            chat: chat.clone(),
            file: file.clone(),
            keyboard: keyboard.cloned(),
        });
        Ok(SentMessage {
            message_id,
            file_id: Some(file.file_id.clone()),
            file_unique_id: None,
        })
    }

    async fn send_document(
        &self,
        chat: &ChatRef,
        source: DocumentSource,
        caption: Option<&str>,
    ) -> Result<SentMessage> {
        self.check_chat(chat)?;
        let message_id = self.record(Sent::Document {
            chat: chat.clone(),
            source,
            caption: caption.map(str::to_string),
        });
        Ok(SentMessage {
            message_id,
            file_id: Some(format!("doc-{message_id}")),
            file_unique_id: Some(format!("uniq-{message_id}")),
        })
    }

    async fn copy_message(
        &self,
        to: &ChatRef,
        from: &ChatRef,
        message_id: i32,
        protect_content: bool,
    ) -> Result<i32> {
        self.check_chat(to)?;
        if self.faults.lock().copies {
            return Err(Error::Telegram("copy failed".into()));
        }
        Ok(self.record(Sent::Copied {
            to: to.clone(),
            from: from.clone(),
            message_id,
            protect_content,
        }))
    }

    async fn delete_message(&self, chat: &ChatRef, message_id: i32) -> Result<()> {
        self.check_chat(chat)?;
        if self.faults.lock().deletes {
            return Err(Error::Telegram("message can't be deleted".into()));
        }
        self.record(Sent::Deleted {
            chat: chat.clone(),
            message_id,
        });
        Ok(())
    }

    async fn pin_message(&self, chat: &ChatRef, message_id: i32) -> Result<()> {
        self.check_chat(chat)?;
        if self.faults.lock().pins {
            return Err(Error::Telegram("not enough rights to pin".into()));
        }
        self.record(Sent::Pinned {
            chat: chat.clone(),
            message_id,
        });
        Ok(())
    }

    async fn is_member(&self, chat: &ChatRef, user_id: i64) -> Result<bool> {
        self.check_chat(chat)?;
        if self.faults.lock().membership {
            return Err(Error::Telegram("member list is inaccessible".into()));
        }
        Ok(self.members.lock().contains(&(chat.clone(), user_id)))
    }

    async fn probe_chat(&self, chat: &ChatRef) -> Result<()> {
        self.check_chat(chat)
    }

    async fn bot_username(&self) -> Result<String> {
        self.username
            .lock()
            .clone()
            .ok_or_else(|| Error::Telegram("getMe failed".into()))
    }

    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        self.record(Sent::Answered {
            callback_id: callback_id.to_string(),
            text: text.map(str::to_string),
        });
        Ok(())
    }
}
