//! Database model types for Diesel ORM.
//!
//! Timestamps are stored as RFC 3339 UTC strings with microsecond precision
//! so that lexical order matches chronological order.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;

use super::schema::{channels, files, jobs, sessions, settings, users};
use crate::error::{Error, Result};

/// Encode a timestamp for storage.
#[must_use]
pub fn encode_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Decode a stored timestamp.
///
/// # Errors
/// Returns [`Error::Parse`] if the column does not hold an RFC 3339 string.
pub fn decode_time(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Parse(format!("timestamp `{value}`: {e}")))
}

/// Database row for a user (insertable).
#[derive(Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub tg_id: i64,
    pub first_seen: String,
    pub last_active: String,
}

/// Database row for a user (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserRow {
    pub id: Option<i32>,
    pub tg_id: i64,
    pub first_seen: String,
    pub last_active: String,
}

/// Database row for a session.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SessionRow {
    pub id: String,
    pub owner_id: i64,
    pub title: String,
    pub created_at: String,
    pub expires_at: Option<String>,
    pub auto_delete_minutes: i32,
    pub protect_content: bool,
    pub revoked: bool,
    pub force_join_channel: Option<String>,
}

/// Database row for a stored file (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = files)]
pub struct NewFileRow {
    pub session_id: String,
    pub upload_channel_msg_id: i32,
    pub file_type: String,
    pub file_id: Option<String>,
    pub file_unique_id: Option<String>,
    pub mime: Option<String>,
    pub caption: Option<String>,
    pub added_at: String,
}

/// Database row for a stored file (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = files)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FileRow {
    pub id: Option<i32>,
    pub session_id: String,
    pub upload_channel_msg_id: i32,
    pub file_type: String,
    pub file_id: Option<String>,
    pub file_unique_id: Option<String>,
    pub mime: Option<String>,
    pub caption: Option<String>,
    pub added_at: String,
}

/// Database row for an owner setting.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = settings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SettingRow {
    pub key: String,
    pub value: String,
}

/// Database row for a channel alias.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = channels)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ChannelRow {
    pub alias: String,
    pub link: String,
}

/// Database row for a pending deletion job.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = jobs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct JobRow {
    pub id: String,
    pub session_id: String,
    pub user_tg_id: i64,
    pub chat_id: i64,
    pub message_id: i32,
    pub run_at: String,
    pub created_at: String,
}
