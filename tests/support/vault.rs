use std::path::Path;
use std::sync::Arc;

use sessionvault::infrastructure::bootstrap::{build_services, Services};
use sessionvault::infrastructure::config::Config;
use sessionvault::testkit::messenger::RecordingMessenger;

pub const OWNER: i64 = 1;
pub const UPLOAD_CHANNEL: i64 = -1001;
pub const DB_CHANNEL: i64 = -1002;

/// Configuration pointing both databases into `dir`.
pub fn config_in(dir: &Path) -> Config {
    let database = dir.join("data/database.sqlite3").to_string_lossy().into_owned();
    let jobs = dir.join("data/jobs.sqlite").to_string_lossy().into_owned();
    Config::parse_toml_with_env("", move |key| match key {
        "OWNER_ID" => Some(OWNER.to_string()),
        "UPLOAD_CHANNEL_ID" => Some(UPLOAD_CHANNEL.to_string()),
        "DB_CHANNEL_ID" => Some(DB_CHANNEL.to_string()),
        "DB_PATH" => Some(database.clone()),
        "JOB_DB_PATH" => Some(jobs.clone()),
        "BROADCAST_PAUSE" => Some("0".to_string()),
        _ => None,
    })
    .expect("test config should validate")
}

pub struct Harness {
    pub messenger: Arc<RecordingMessenger>,
    pub services: Services,
    pub config: Config,
    _dir: tempfile::TempDir,
}

pub fn harness() -> Harness {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path());
    let messenger = Arc::new(RecordingMessenger::new());
    let services = build_services(&config, messenger.clone()).expect("services should build");
    Harness {
        messenger,
        services,
        config,
        _dir: dir,
    }
}

/// Session id from the owner's finalize summary.
pub fn session_id_from(summary: &str) -> String {
    summary
        .lines()
        .find_map(|line| line.strip_prefix("Upload finalized. Session ID: "))
        .expect("finalize summary")
        .trim()
        .to_string()
}
