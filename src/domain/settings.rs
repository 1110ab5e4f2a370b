//! Owner-editable bot settings and vault statistics.

use serde::Serialize;

/// Text shown on `/start` when no message has been configured.
pub const DEFAULT_START_MESSAGE: &str = "Welcome! Use /help to see commands.";

/// Days of inactivity after which a user no longer counts as active.
pub const ACTIVE_WINDOW_DAYS: i64 = 2;

/// Keys of the `settings` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    StartMessage,
    StartImage,
    ForceChannel,
}

impl SettingKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StartMessage => "start_message",
            Self::StartImage => "start_image",
            Self::ForceChannel => "force_channel",
        }
    }
}

/// Aggregate counters reported by `/stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VaultStats {
    pub total_users: i64,
    pub active_users: i64,
    pub total_files: i64,
    pub total_sessions: i64,
}
