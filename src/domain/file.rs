//! Files stored in the upload channel and linked to sessions.

use std::fmt;

use chrono::{DateTime, Utc};

use super::id::SessionId;

/// Media kinds the vault can deliver by file id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Photo,
    Document,
    Video,
    Audio,
    Voice,
}

impl FileKind {
    /// Stable name stored in the `files.file_type` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Document => "document",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Voice => "voice",
        }
    }

    /// Parse a stored name. Unknown names yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "photo" => Some(Self::Photo),
            "document" => Some(Self::Document),
            "video" => Some(Self::Video),
            "audio" => Some(Self::Audio),
            "voice" => Some(Self::Voice),
            _ => None,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file row as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub id: i32,
    pub session_id: SessionId,
    /// Message id of the copy kept in the upload channel.
    pub upload_channel_msg_id: i32,
    /// `None` when the stored kind is not one the vault understands.
    pub kind: Option<FileKind>,
    pub file_id: Option<String>,
    pub file_unique_id: Option<String>,
    pub mime: Option<String>,
    pub caption: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// A file row about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStoredFile {
    pub session_id: SessionId,
    pub upload_channel_msg_id: i32,
    pub kind: FileKind,
    pub file_id: Option<String>,
    pub file_unique_id: Option<String>,
    pub mime: Option<String>,
    pub caption: Option<String>,
    pub added_at: DateTime<Utc>,
}
