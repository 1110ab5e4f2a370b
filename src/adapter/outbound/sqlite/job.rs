//! SQLite deletion job store.
//!
//! Jobs live in their own database so the scheduler can be pointed at a
//! separate file via `JOB_DB_PATH`.

use diesel::prelude::*;

use crate::adapter::outbound::sqlite::database::connection::{checkout, DbPool};
use crate::adapter::outbound::sqlite::database::model::{decode_time, encode_time, JobRow};
use crate::adapter::outbound::sqlite::database::schema::jobs;
use crate::domain::id::SessionId;
use crate::domain::{DeletionJob, JobId};
use crate::error::{Error, Result};
use crate::port::outbound::store::JobStore;

/// SQLite-backed job store.
pub struct SqliteJobStore {
    pool: DbPool,
}

impl SqliteJobStore {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn to_row(job: &DeletionJob) -> JobRow {
        JobRow {
            id: job.id.to_string(),
            session_id: job.session_id.to_string(),
            user_tg_id: job.user_tg_id,
            chat_id: job.chat_id,
            message_id: job.message_id,
            run_at: encode_time(job.run_at),
            created_at: encode_time(job.created_at),
        }
    }

    fn from_row(row: JobRow) -> Result<DeletionJob> {
        Ok(DeletionJob {
            id: JobId::from(row.id),
            session_id: SessionId::from_stored(row.session_id),
            user_tg_id: row.user_tg_id,
            chat_id: row.chat_id,
            message_id: row.message_id,
            run_at: decode_time(&row.run_at)?,
            created_at: decode_time(&row.created_at)?,
        })
    }
}

impl JobStore for SqliteJobStore {
    fn save_job(&self, job: &DeletionJob) -> Result<()> {
        let row = Self::to_row(job);
        let mut conn = checkout(&self.pool)?;

        diesel::replace_into(jobs::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    fn delete_job(&self, id: &JobId) -> Result<bool> {
        let mut conn = checkout(&self.pool)?;

        let deleted = diesel::delete(jobs::table.find(id.as_str()))
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(deleted > 0)
    }

    fn jobs(&self) -> Result<Vec<DeletionJob>> {
        let mut conn = checkout(&self.pool)?;

        let rows: Vec<JobRow> = jobs::table
            .order(jobs::run_at.asc())
            .select(JobRow::as_select())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        rows.into_iter().map(Self::from_row).collect()
    }
}
