//! Persistence ports for sessions, settings, users and deletion jobs.
//!
//! Stores are synchronous: the SQLite adapter works on pooled blocking
//! connections and every call is short.

use chrono::{DateTime, Utc};

use crate::domain::{
    ChannelAlias, DeletionJob, JobId, NewStoredFile, Session, SessionId, SettingKey, StoredFile,
    VaultStats,
};
use crate::error::Result;

/// Storage operations for sessions and their files.
pub trait SessionStore: Send + Sync {
    /// Insert a new session.
    fn create_session(&self, session: &Session) -> Result<()>;

    /// Get a session by ID.
    fn session(&self, id: &SessionId) -> Result<Option<Session>>;

    /// Mark a session revoked. Returns false if it does not exist.
    fn revoke_session(&self, id: &SessionId) -> Result<bool>;

    /// Attach a stored file to a session.
    fn add_file(&self, file: &NewStoredFile) -> Result<()>;

    /// Files of a session in insertion order.
    fn files(&self, session_id: &SessionId) -> Result<Vec<StoredFile>>;
}

/// Storage operations for owner settings and channel aliases.
pub trait SettingsStore: Send + Sync {
    /// Save a setting, replacing any previous value.
    fn save_setting(&self, key: SettingKey, value: &str) -> Result<()>;

    /// Get a setting value.
    fn setting(&self, key: SettingKey) -> Result<Option<String>>;

    /// Save a channel alias, replacing an alias with the same name.
    fn save_channel_alias(&self, alias: &ChannelAlias) -> Result<()>;

    /// All channel aliases ordered by name.
    fn channel_aliases(&self) -> Result<Vec<ChannelAlias>>;
}

/// User tracking and aggregate counters.
pub trait UserStore: Send + Sync {
    /// Record activity, creating the user on first sight.
    fn touch_user(&self, tg_id: i64, now: DateTime<Utc>) -> Result<()>;

    /// Telegram ids of every tracked user.
    fn user_ids(&self) -> Result<Vec<i64>>;

    /// Counters for `/stats`, with activity measured relative to `now`.
    fn vault_stats(&self, now: DateTime<Utc>) -> Result<VaultStats>;
}

/// Storage operations for pending deletion jobs.
pub trait JobStore: Send + Sync {
    /// Save a job, replacing if it exists.
    fn save_job(&self, job: &DeletionJob) -> Result<()>;

    /// Delete a job by ID.
    fn delete_job(&self, id: &JobId) -> Result<bool>;

    /// All pending jobs ordered by run time.
    fn jobs(&self) -> Result<Vec<DeletionJob>>;
}
