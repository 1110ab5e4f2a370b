//! Persisted auto-delete jobs for delivered messages.

use chrono::{DateTime, Duration, Utc};

use super::id::{JobId, SessionId};

/// Delete one delivered message at `run_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionJob {
    pub id: JobId,
    pub session_id: SessionId,
    pub user_tg_id: i64,
    pub chat_id: i64,
    pub message_id: i32,
    pub run_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl DeletionJob {
    #[must_use]
    pub fn new(
        session_id: SessionId,
        user_tg_id: i64,
        chat_id: i64,
        message_id: i32,
        run_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: JobId::new(),
            session_id,
            user_tg_id,
            chat_id,
            message_id,
            run_at,
            created_at: now,
        }
    }

    /// When the job should fire if (re)armed at `now`.
    ///
    /// Jobs already overdue fire `grace` after `now`.
    #[must_use]
    pub fn effective_run_at(&self, now: DateTime<Utc>, grace: Duration) -> DateTime<Utc> {
        if self.run_at > now {
            self.run_at
        } else {
            now + grace
        }
    }
}
