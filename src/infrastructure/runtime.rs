//! Bot runtime: startup checks, health server, polling and shutdown.

use tracing::{error, info, warn};

use crate::adapter::inbound::{health, telegram};
use crate::error::Result;
use crate::infrastructure::bootstrap::{self, Services};
use crate::infrastructure::config::Config;

/// Run the bot until Ctrl-C.
///
/// # Errors
/// Returns an error if the services cannot be built or restored.
pub async fn run(config: Config) -> Result<()> {
    info!(
        owner_id = ?config.telegram.owner_id,
        database = %config.storage.database,
        "Starting sessionvault"
    );

    let (bot, services) = bootstrap::build(&config)?;
    startup(&services, &config).await?;

    let host = config.server.host.clone();
    let port = config.server.port;
    let health_handle = tokio::spawn(async move {
        if let Err(e) = health::serve(&host, port).await {
            error!(error = %e, "Health server stopped");
        }
    });

    telegram::listen(bot, services.router.clone()).await;

    info!("Shutdown signal received");
    shutdown(&services).await;
    health_handle.abort();

    info!("sessionvault stopped");
    Ok(())
}

/// Restore deletion jobs and probe the configured channels.
///
/// Channel probes only warn: the bot still serves sessions whose files
/// are delivered by file id.
///
/// # Errors
/// Returns an error if persisted jobs cannot be read.
pub async fn startup(services: &Services, config: &Config) -> Result<usize> {
    let restored = services.scheduler.restore()?;
    info!(restored, "Deletion jobs restored");

    match services.messenger.bot_username().await {
        Ok(username) => info!(username = %username, "Bot identity resolved"),
        Err(e) => warn!(error = %e, "Could not resolve bot username"),
    }

    let upload_channel = config.telegram.upload_channel()?;
    if let Err(e) = services.messenger.probe_chat(&upload_channel).await {
        warn!(channel = %upload_channel, error = %e, "Upload channel is not reachable");
    }
    match config.telegram.db_channel()? {
        Some(channel) => {
            if let Err(e) = services.messenger.probe_chat(&channel).await {
                warn!(channel = %channel, error = %e, "DB channel is not reachable");
            }
        }
        None => warn!("DB_CHANNEL_ID not set; backups are disabled"),
    }

    Ok(restored)
}

/// Back up the database and stop pending timers.
///
/// Job rows stay in the database and are restored on the next start.
pub async fn shutdown(services: &Services) {
    services.backup.run().await;
    services.scheduler.shutdown();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::{ChatRef, DeletionJob, SessionId};
    use crate::testkit::messenger::{RecordingMessenger, Sent};

    fn config_in(dir: &std::path::Path, db_channel: Option<&str>) -> Config {
        let database = dir.join("vault.sqlite3").to_string_lossy().into_owned();
        let db_channel = db_channel.map(str::to_string);
        Config::parse_toml_with_env("", move |key| match key {
            "OWNER_ID" => Some("1".into()),
            "UPLOAD_CHANNEL_ID" => Some("-1001".into()),
            "DB_CHANNEL_ID" => db_channel.clone(),
            "DB_PATH" => Some(database.clone()),
            _ => None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn startup_survives_unreachable_channels() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), Some("-1002"));
        let messenger = Arc::new(RecordingMessenger::new());
        messenger.fail_chat(ChatRef::Id(-1001));
        messenger.fail_chat(ChatRef::Id(-1002));

        let services = bootstrap::build_services(&config, messenger).unwrap();
        assert_eq!(startup(&services, &config).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn startup_rearms_persisted_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), None);
        let messenger = Arc::new(RecordingMessenger::new());

        let first = bootstrap::build_services(&config, messenger.clone()).unwrap();
        let now = chrono::Utc::now();
        first
            .scheduler
            .schedule(DeletionJob::new(
                SessionId::generate(),
                5,
                5,
                77,
                now + chrono::Duration::hours(1),
                now,
            ))
            .unwrap();
        first.scheduler.shutdown();

        let second = bootstrap::build_services(&config, messenger).unwrap();
        assert_eq!(startup(&second, &config).await.unwrap(), 1);
        assert_eq!(second.scheduler.pending(), 1);
        second.scheduler.shutdown();
    }

    #[tokio::test]
    async fn shutdown_uploads_a_backup() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), Some("-1002"));
        let messenger = Arc::new(RecordingMessenger::new());
        let services = bootstrap::build_services(&config, messenger.clone()).unwrap();

        shutdown(&services).await;

        assert!(messenger
            .sent()
            .iter()
            .any(|sent| matches!(sent, Sent::Document { chat, .. } if *chat == ChatRef::Id(-1002))));
    }
}
