//! Database backups to the DB channel.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tracing::{error, info, warn};

use crate::domain::ChatRef;
use crate::port::outbound::messenger::{DocumentSource, Messenger};

/// Uploads the vault database file and pins it.
pub struct BackupService {
    messenger: Arc<dyn Messenger>,
    database: PathBuf,
    channel: Option<ChatRef>,
}

impl BackupService {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        database: impl Into<PathBuf>,
        channel: Option<ChatRef>,
    ) -> Self {
        Self {
            messenger,
            database: database.into(),
            channel,
        }
    }

    /// Upload a backup. Returns the backup message id on success.
    ///
    /// Never fails: a missing channel is skipped with a warning, upload
    /// errors are logged, and a failed pin only logs at info.
    pub async fn run(&self) -> Option<i32> {
        let Some(channel) = &self.channel else {
            warn!("DB channel not configured; skipping DB backup");
            return None;
        };

        let caption = format!(
            "Backup: {}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        let sent = match self
            .messenger
            .send_document(
                channel,
                DocumentSource::Path(self.database.clone()),
                Some(&caption),
            )
            .await
        {
            Ok(sent) => sent,
            Err(e) => {
                error!(channel = %channel, error = %e, "Failed to back up database");
                return None;
            }
        };

        if let Err(e) = self.messenger.pin_message(channel, sent.message_id).await {
            info!(channel = %channel, error = %e, "Pinning DB backup failed");
        }
        info!(channel = %channel, message_id = sent.message_id, "Database backed up");
        Some(sent.message_id)
    }
}
