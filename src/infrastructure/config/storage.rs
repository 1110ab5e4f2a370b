//! SQLite file locations.

use serde::Deserialize;

fn default_database_path() -> String {
    "bot_data.sqlite3".to_string()
}

/// Paths of the vault and job databases.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Main database. Also the file uploaded as a backup.
    pub database: String,
    /// Deletion job database. Defaults to the main database file.
    pub job_database: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            job_database: None,
        }
    }
}

impl StorageConfig {
    #[must_use]
    pub fn job_database_path(&self) -> &str {
        self.job_database.as_deref().unwrap_or(&self.database)
    }
}
