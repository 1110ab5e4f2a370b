//! SQLite vault store implementation.
//!
//! Persists sessions, stored files, owner settings, channel aliases and
//! tracked users using Diesel ORM.

use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;

use crate::adapter::outbound::sqlite::database::connection::{checkout, DbPool};
use crate::adapter::outbound::sqlite::database::model::{
    decode_time, encode_time, ChannelRow, FileRow, NewFileRow, NewUserRow, SessionRow, SettingRow,
};
use crate::adapter::outbound::sqlite::database::schema::{
    channels, files, sessions, settings, users,
};
use crate::domain::id::SessionId;
use crate::domain::settings::ACTIVE_WINDOW_DAYS;
use crate::domain::{
    AutoDelete, ChannelAlias, FileKind, ForceChannel, NewStoredFile, Session, SettingKey,
    StoredFile, VaultStats,
};
use crate::error::{Error, Result};
use crate::port::outbound::store::{SessionStore, SettingsStore, UserStore};

/// SQLite-backed vault store.
///
/// Implements [`SessionStore`], [`SettingsStore`] and [`UserStore`] over a
/// single connection pool.
pub struct SqliteVaultStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteVaultStore {
    /// Create a new vault store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn session_to_row(session: &Session) -> SessionRow {
        SessionRow {
            id: session.id.to_string(),
            owner_id: session.owner_id,
            title: session.title.clone(),
            created_at: encode_time(session.created_at),
            expires_at: session.expires_at.map(encode_time),
            auto_delete_minutes: i32::try_from(session.auto_delete.minutes()).unwrap_or(i32::MAX),
            protect_content: session.protect_content,
            revoked: session.revoked,
            force_join_channel: session
                .force_join_channel
                .as_ref()
                .map(|c| c.as_str().to_string()),
        }
    }

    fn session_from_row(row: SessionRow) -> Result<Session> {
        let minutes = u32::try_from(row.auto_delete_minutes)
            .map_err(|e| Error::Parse(format!("auto_delete_minutes: {e}")))?;
        Ok(Session {
            id: SessionId::from_stored(row.id),
            owner_id: row.owner_id,
            title: row.title,
            created_at: decode_time(&row.created_at)?,
            expires_at: row.expires_at.as_deref().map(decode_time).transpose()?,
            auto_delete: AutoDelete::try_new(minutes)?,
            protect_content: row.protect_content,
            revoked: row.revoked,
            force_join_channel: row
                .force_join_channel
                .as_deref()
                .and_then(ForceChannel::from_setting),
        })
    }

    fn file_from_row(row: FileRow) -> Result<StoredFile> {
        Ok(StoredFile {
            id: row.id.unwrap_or_default(),
            session_id: SessionId::from_stored(row.session_id),
            upload_channel_msg_id: row.upload_channel_msg_id,
            kind: FileKind::parse(&row.file_type),
            file_id: row.file_id,
            file_unique_id: row.file_unique_id,
            mime: row.mime,
            caption: row.caption,
            added_at: decode_time(&row.added_at)?,
        })
    }
}

impl SessionStore for SqliteVaultStore {
    fn create_session(&self, session: &Session) -> Result<()> {
        let row = Self::session_to_row(session);
        let mut conn = checkout(&self.pool)?;

        diesel::insert_into(sessions::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    fn session(&self, id: &SessionId) -> Result<Option<Session>> {
        let mut conn = checkout(&self.pool)?;

        let row: Option<SessionRow> = sessions::table
            .find(id.as_str())
            .select(SessionRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;

        row.map(Self::session_from_row).transpose()
    }

    fn revoke_session(&self, id: &SessionId) -> Result<bool> {
        let mut conn = checkout(&self.pool)?;

        let updated = diesel::update(sessions::table.find(id.as_str()))
            .set(sessions::revoked.eq(true))
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(updated > 0)
    }

    fn add_file(&self, file: &NewStoredFile) -> Result<()> {
        let row = NewFileRow {
            session_id: file.session_id.to_string(),
            upload_channel_msg_id: file.upload_channel_msg_id,
            file_type: file.kind.as_str().to_string(),
            file_id: file.file_id.clone(),
            file_unique_id: file.file_unique_id.clone(),
            mime: file.mime.clone(),
            caption: file.caption.clone(),
            added_at: encode_time(file.added_at),
        };
        let mut conn = checkout(&self.pool)?;

        diesel::insert_into(files::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    fn files(&self, session_id: &SessionId) -> Result<Vec<StoredFile>> {
        let mut conn = checkout(&self.pool)?;

        let rows: Vec<FileRow> = files::table
            .filter(files::session_id.eq(session_id.as_str()))
            .order(files::id.asc())
            .select(FileRow::as_select())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        rows.into_iter().map(Self::file_from_row).collect()
    }
}

impl SettingsStore for SqliteVaultStore {
    fn save_setting(&self, key: SettingKey, value: &str) -> Result<()> {
        let row = SettingRow {
            key: key.as_str().to_string(),
            value: value.to_string(),
        };
        let mut conn = checkout(&self.pool)?;

        diesel::replace_into(settings::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    fn setting(&self, key: SettingKey) -> Result<Option<String>> {
        let mut conn = checkout(&self.pool)?;

        settings::table
            .find(key.as_str())
            .select(settings::value)
            .first::<String>(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))
    }

    fn save_channel_alias(&self, alias: &ChannelAlias) -> Result<()> {
        let row = ChannelRow {
            alias: alias.alias.clone(),
            link: alias.link.clone(),
        };
        let mut conn = checkout(&self.pool)?;

        diesel::replace_into(channels::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    fn channel_aliases(&self) -> Result<Vec<ChannelAlias>> {
        let mut conn = checkout(&self.pool)?;

        let rows: Vec<ChannelRow> = channels::table
            .order(channels::alias.asc())
            .select(ChannelRow::as_select())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|r| ChannelAlias {
                alias: r.alias,
                link: r.link,
            })
            .collect())
    }
}

impl UserStore for SqliteVaultStore {
    fn touch_user(&self, tg_id: i64, now: DateTime<Utc>) -> Result<()> {
        let stamp = encode_time(now);
        let row = NewUserRow {
            tg_id,
            first_seen: stamp.clone(),
            last_active: stamp.clone(),
        };
        let mut conn = checkout(&self.pool)?;

        diesel::insert_into(users::table)
            .values(&row)
            .on_conflict(users::tg_id)
            .do_update()
            .set(users::last_active.eq(&stamp))
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    fn user_ids(&self) -> Result<Vec<i64>> {
        let mut conn = checkout(&self.pool)?;

        users::table
            .select(users::tg_id)
            .order(users::id.asc())
            .load::<i64>(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))
    }

    fn vault_stats(&self, now: DateTime<Utc>) -> Result<VaultStats> {
        let cutoff = encode_time(now - Duration::days(ACTIVE_WINDOW_DAYS));
        let mut conn = checkout(&self.pool)?;

        let total_users: i64 = users::table
            .count()
            .get_result(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        let active_users: i64 = users::table
            .filter(users::last_active.ge(&cutoff))
            .count()
            .get_result(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        let total_files: i64 = files::table
            .count()
            .get_result(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        let total_sessions: i64 = sessions::table
            .count()
            .get_result(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(VaultStats {
            total_users,
            active_users,
            total_files,
            total_sessions,
        })
    }
}
