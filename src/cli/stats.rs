//! Handler for the `stats` command.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tabled::{Table, Tabled};

use crate::adapter::outbound::sqlite::database::connection::create_pool;
use crate::adapter::outbound::sqlite::SqliteVaultStore;
use crate::cli::{output, StatsArgs};
use crate::domain::VaultStats;
use crate::error::{Error, Result};
use crate::infrastructure::config::Config;
use crate::port::outbound::store::UserStore;

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: i64,
}

/// Print vault counters read directly from the database file.
///
/// # Errors
/// Returns an error if the database does not exist or cannot be queried.
pub fn execute(config_path: Option<&Path>, args: &StatsArgs) -> Result<()> {
    let database = match &args.db {
        Some(path) => path.clone(),
        None => PathBuf::from(Config::load(config_path)?.storage.database),
    };
    let stats = read_stats(&database)?;

    if output::is_json() {
        output::json_output(serde_json::to_value(stats)?);
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Vault statistics");
    output::field("Database", database.display());
    println!();
    output::lines(&render(&stats));
    Ok(())
}

/// Query counters without creating or migrating the database.
fn read_stats(database: &Path) -> Result<VaultStats> {
    if !database.is_file() {
        return Err(Error::Database(format!(
            "database not found: {}",
            database.display()
        )));
    }
    let pool = create_pool(&database.to_string_lossy())?;
    SqliteVaultStore::new(pool).vault_stats(Utc::now())
}

fn render(stats: &VaultStats) -> String {
    let rows = vec![
        StatRow {
            metric: "Total users",
            value: stats.total_users,
        },
        StatRow {
            metric: "Active users (2d)",
            value: stats.active_users,
        },
        StatRow {
            metric: "Sessions",
            value: stats.total_sessions,
        },
        StatRow {
            metric: "Files",
            value: stats.total_files,
        },
    ];
    Table::new(rows).to_string()
}
