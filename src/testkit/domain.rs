//! Builders for domain values and incoming updates used across tests.

use chrono::{DateTime, Utc};

use crate::domain::{FileKind, NewStoredFile, Session};
use crate::port::inbound::update::{IncomingCallback, IncomingMessage, MediaAttachment};

/// Fixed instant used by tests that need stable timestamps.
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

/// A private-chat text message from `user_id`.
pub fn text_message(user_id: i64, message_id: i32, text: &str) -> IncomingMessage {
    IncomingMessage {
        chat_id: user_id,
        message_id,
        sender_id: user_id,
        text: Some(text.to_string()),
        ..IncomingMessage::default()
    }
}

/// A private-chat media message from `user_id`.
pub fn media_message(
    user_id: i64,
    message_id: i32,
    kind: FileKind,
    file_id: &str,
    caption: Option<&str>,
) -> IncomingMessage {
    IncomingMessage {
        chat_id: user_id,
        message_id,
        sender_id: user_id,
        caption: caption.map(str::to_string),
        media: Some(MediaAttachment {
            kind,
            file_id: file_id.to_string(),
            file_unique_id: Some(format!("{file_id}-uniq")),
            mime: None,
        }),
        ..IncomingMessage::default()
    }
}

/// A message with content the vault cannot stage (sticker, poll, ...).
pub fn other_message(user_id: i64, message_id: i32) -> IncomingMessage {
    IncomingMessage {
        chat_id: user_id,
        message_id,
        sender_id: user_id,
        ..IncomingMessage::default()
    }
}

pub fn callback(user_id: i64, data: &str) -> IncomingCallback {
    IncomingCallback {
        id: format!("cb-{data}"),
        sender_id: user_id,
        data: data.to_string(),
    }
}

/// A stored file row for `session` with a file id derived from `n`.
pub fn stored_file(session: &Session, n: i32, kind: FileKind) -> NewStoredFile {
    NewStoredFile {
        session_id: session.id.clone(),
        upload_channel_msg_id: 500 + n,
        kind,
        file_id: Some(format!("file-{n}")),
        file_unique_id: None,
        mime: None,
        caption: Some(format!("caption {n}")),
        added_at: session.created_at,
    }
}
