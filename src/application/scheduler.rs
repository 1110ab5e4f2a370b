//! Auto-delete scheduling for delivered messages.
//!
//! Every job is written to the [`JobStore`] before its timer is armed, so a
//! restart can rebuild the timers from the database with
//! [`DeletionScheduler::restore`]. A fired job deletes the message and then
//! its row. Shutdown only aborts timers; rows survive for the next start.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::{ChatRef, DeletionJob, JobId};
use crate::error::Result;
use crate::port::outbound::messenger::Messenger;
use crate::port::outbound::store::JobStore;

type Timers = Arc<Mutex<HashMap<JobId, JoinHandle<()>>>>;

/// Persistent one-shot timers that delete messages.
pub struct DeletionScheduler {
    messenger: Arc<dyn Messenger>,
    jobs: Arc<dyn JobStore>,
    /// Delay applied to jobs that were already due when restored.
    restore_grace: Duration,
    timers: Timers,
}

impl DeletionScheduler {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        jobs: Arc<dyn JobStore>,
        restore_grace: Duration,
    ) -> Self {
        Self {
            messenger,
            jobs,
            restore_grace,
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Persist a job and arm its timer.
    ///
    /// # Errors
    /// Returns an error if the job cannot be saved; no timer is armed then.
    pub fn schedule(&self, job: DeletionJob) -> Result<()> {
        self.jobs.save_job(&job)?;
        let run_at = job.run_at;
        self.arm(job, run_at);
        Ok(())
    }

    /// Re-arm timers for every persisted job.
    ///
    /// Returns the number of restored jobs.
    ///
    /// # Errors
    /// Returns an error if the job store cannot be read.
    pub fn restore(&self) -> Result<usize> {
        let now = Utc::now();
        let jobs = self.jobs.jobs()?;
        let count = jobs.len();
        for job in jobs {
            let run_at = job.effective_run_at(now, self.restore_grace);
            self.arm(job, run_at);
        }
        info!(count, "Restored deletion jobs");
        Ok(count)
    }

    /// Number of armed timers.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.timers.lock().len()
    }

    /// Abort every armed timer.
    pub fn shutdown(&self) {
        let mut timers = self.timers.lock();
        let count = timers.len();
        for (_, handle) in timers.drain() {
            handle.abort();
        }
        debug!(count, "Deletion timers stopped");
    }

    fn arm(&self, job: DeletionJob, run_at: DateTime<Utc>) {
        let delay = (run_at - Utc::now()).to_std().unwrap_or_default();
        let messenger = Arc::clone(&self.messenger);
        let jobs = Arc::clone(&self.jobs);
        let timers = Arc::clone(&self.timers);
        let id = job.id.clone();

        // The lock is held across spawn so the task cannot remove its entry
        // before it has been inserted.
        let mut guard = self.timers.lock();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            fire(messenger.as_ref(), jobs.as_ref(), &job).await;
            timers.lock().remove(&job.id);
        });
        if let Some(previous) = guard.insert(id, handle) {
            previous.abort();
        }
    }
}

async fn fire(messenger: &dyn Messenger, jobs: &dyn JobStore, job: &DeletionJob) {
    let chat = ChatRef::Id(job.chat_id);
    match messenger.delete_message(&chat, job.message_id).await {
        Ok(()) => debug!(
            job_id = %job.id,
            chat_id = job.chat_id,
            message_id = job.message_id,
            "Deleted expired message"
        ),
        Err(e) => warn!(
            job_id = %job.id,
            chat_id = job.chat_id,
            message_id = job.message_id,
            error = %e,
            "Failed to delete message"
        ),
    }
    if let Err(e) = jobs.delete_job(&job.id) {
        warn!(job_id = %job.id, error = %e, "Failed to remove deletion job");
    }
}
