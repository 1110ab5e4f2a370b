//! Composition root: builds stores, services and the update router.

use std::sync::Arc;

use teloxide::Bot;
use tracing::info;

use crate::adapter::inbound::telegram::UpdateRouter;
use crate::adapter::outbound::sqlite::database::connection::{
    create_pool, ensure_parent_dir, run_migrations, DbPool, JOB_MIGRATIONS, VAULT_MIGRATIONS,
};
use crate::adapter::outbound::sqlite::{SqliteJobStore, SqliteVaultStore};
use crate::adapter::outbound::telegram::TeloxideMessenger;
use crate::application::{AdminService, BackupService, DeletionScheduler, UploadFlow, VaultService};
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::port::outbound::messenger::Messenger;

/// Open the vault database, creating its directory and schema if needed.
///
/// # Errors
/// Returns an error if the directory, pool or migrations fail.
pub fn open_vault_database(path: &str) -> Result<DbPool> {
    ensure_parent_dir(path)?;
    let pool = create_pool(path)?;
    run_migrations(&pool, VAULT_MIGRATIONS)?;
    Ok(pool)
}

/// Open the deletion job database, creating its directory and schema if needed.
///
/// # Errors
/// Returns an error if the directory, pool or migrations fail.
pub fn open_job_database(path: &str) -> Result<DbPool> {
    ensure_parent_dir(path)?;
    let pool = create_pool(path)?;
    run_migrations(&pool, JOB_MIGRATIONS)?;
    Ok(pool)
}

/// Everything the runtime drives.
pub struct Services {
    pub messenger: Arc<dyn Messenger>,
    pub store: Arc<SqliteVaultStore>,
    pub scheduler: Arc<DeletionScheduler>,
    pub backup: Arc<BackupService>,
    pub router: Arc<UpdateRouter>,
}

/// Wire services around an existing messenger.
///
/// # Errors
/// Returns an error if the configuration is incomplete or a database
/// cannot be opened.
pub fn build_services(config: &Config, messenger: Arc<dyn Messenger>) -> Result<Services> {
    let owner_id = config.telegram.owner_id()?;
    let upload_channel = config.telegram.upload_channel()?;
    let db_channel = config.telegram.db_channel()?;

    let vault_pool = open_vault_database(&config.storage.database)?;
    let job_pool = open_job_database(config.storage.job_database_path())?;
    info!(
        database = %config.storage.database,
        job_database = %config.storage.job_database_path(),
        "Databases ready"
    );

    let store = Arc::new(SqliteVaultStore::new(vault_pool));
    let jobs = Arc::new(SqliteJobStore::new(job_pool));

    let scheduler = Arc::new(DeletionScheduler::new(
        Arc::clone(&messenger),
        jobs,
        config.scheduler.restore_grace(),
    ));
    let backup = Arc::new(BackupService::new(
        Arc::clone(&messenger),
        config.storage.database.clone(),
        db_channel,
    ));
    let vault = Arc::new(VaultService::new(
        Arc::clone(&messenger),
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::clone(&scheduler),
        upload_channel.clone(),
        config.telegram.force_join_button_text.clone(),
    ));
    let upload = Arc::new(UploadFlow::new(
        Arc::clone(&messenger),
        store.clone(),
        Arc::clone(&backup),
        upload_channel,
    ));
    let admin = Arc::new(AdminService::new(
        Arc::clone(&messenger),
        store.clone(),
        store.clone(),
        store.clone(),
        config.broadcast.pacing(),
    ));
    let router = Arc::new(UpdateRouter::new(
        owner_id,
        Arc::clone(&messenger),
        vault,
        upload,
        admin,
    ));

    Ok(Services {
        messenger,
        store,
        scheduler,
        backup,
        router,
    })
}

/// Create the bot and wire services around it.
///
/// # Errors
/// Returns an error if `BOT_TOKEN` is missing or wiring fails.
pub fn build(config: &Config) -> Result<(Bot, Services)> {
    let bot = Bot::new(config.telegram.bot_token()?);
    let messenger: Arc<dyn Messenger> = Arc::new(TeloxideMessenger::new(bot.clone()));
    let services = build_services(config, messenger)?;
    Ok((bot, services))
}
