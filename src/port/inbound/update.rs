//! Transport-neutral views of incoming Telegram updates.

use crate::domain::{FileKind, StagedContent};

/// Media attached to an incoming message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAttachment {
    pub kind: FileKind,
    pub file_id: String,
    pub file_unique_id: Option<String>,
    pub mime: Option<String>,
}

/// Content category used when deciding what can be staged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Media(FileKind),
    Text,
    /// Stickers, locations, polls and everything else.
    Other,
}

/// A message received by the bot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: i64,
    pub message_id: i32,
    pub sender_id: i64,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub media: Option<MediaAttachment>,
    /// Id of the message this one replies to.
    pub reply_to: Option<i32>,
}

impl IncomingMessage {
    #[must_use]
    pub fn content_kind(&self) -> ContentKind {
        match (&self.media, &self.text) {
            (Some(media), _) => ContentKind::Media(media.kind),
            (None, Some(_)) => ContentKind::Text,
            (None, None) => ContentKind::Other,
        }
    }

    /// Content to stage, or `None` for unsupported messages.
    #[must_use]
    pub fn staged_content(&self) -> Option<StagedContent> {
        if let Some(media) = &self.media {
            return Some(StagedContent::Media {
                kind: media.kind,
                file_id: media.file_id.clone(),
                file_unique_id: media.file_unique_id.clone(),
                mime: media.mime.clone(),
            });
        }
        self.text.clone().map(StagedContent::Text)
    }

    /// Photo file id, if this message carries a photo.
    #[must_use]
    pub fn photo_file_id(&self) -> Option<&str> {
        self.media
            .as_ref()
            .filter(|m| m.kind == FileKind::Photo)
            .map(|m| m.file_id.as_str())
    }
}

/// A pressed inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingCallback {
    pub id: String,
    pub sender_id: i64,
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_wins_over_text_for_content_kind() {
        let msg = IncomingMessage {
            text: Some("hi".into()),
            media: Some(MediaAttachment {
                kind: FileKind::Video,
                file_id: "v".into(),
                file_unique_id: None,
                mime: None,
            }),
            ..Default::default()
        };
        assert_eq!(msg.content_kind(), ContentKind::Media(FileKind::Video));
    }

    #[test]
    fn plain_text_stages_as_text() {
        let msg = IncomingMessage {
            text: Some("note".into()),
            ..Default::default()
        };
        assert_eq!(
            msg.staged_content(),
            Some(StagedContent::Text("note".into()))
        );
    }

    #[test]
    fn empty_message_is_other() {
        let msg = IncomingMessage::default();
        assert_eq!(msg.content_kind(), ContentKind::Other);
        assert!(msg.staged_content().is_none());
    }

    #[test]
    fn photo_file_id_ignores_other_media() {
        let msg = IncomingMessage {
            media: Some(MediaAttachment {
                kind: FileKind::Document,
                file_id: "d".into(),
                file_unique_id: None,
                mime: None,
            }),
            ..Default::default()
        };
        assert!(msg.photo_file_id().is_none());
    }
}
