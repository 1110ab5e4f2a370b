//! Database connection management using Diesel ORM.
//!
//! Provides connection pooling, migration support, and connection
//! configuration for the vault and job SQLite databases.

use std::path::Path;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::error::{Error, Result};

/// Embedded vault migrations (users, sessions, files, settings, channels).
pub const VAULT_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/vault");

/// Embedded job migrations.
pub const JOB_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/jobs");

/// Type alias for a SQLite connection pool.
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Type alias for a connection checked out of a [`DbPool`].
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

const DEFAULT_POOL_SIZE: u32 = 5;

/// Pragmas applied to every pooled connection.
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA busy_timeout = 5000; PRAGMA foreign_keys = ON;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Create a connection pool for the given database URL.
///
/// # Errors
/// Returns an error if the pool cannot be created.
pub fn create_pool(database_url: &str) -> Result<DbPool> {
    create_pool_with_size(database_url, DEFAULT_POOL_SIZE)
}

/// Create a connection pool holding at most `max_size` connections.
///
/// `:memory:` databases are private to each connection, so callers sharing
/// one in-memory database must use a size of 1.
///
/// # Errors
/// Returns an error if the pool cannot be created.
pub fn create_pool_with_size(database_url: &str, max_size: u32) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)
        .map_err(|e| Error::Connection(e.to_string()))
}

/// Make sure the directory holding a database file exists.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(database_path: &str) -> Result<()> {
    if database_path == ":memory:" {
        return Ok(());
    }
    if let Some(parent) = Path::new(database_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Check out a connection, mapping pool failures to [`Error::Connection`].
///
/// # Errors
/// Returns an error if no connection becomes available.
pub fn checkout(pool: &DbPool) -> Result<DbConnection> {
    pool.get().map_err(|e| Error::Connection(e.to_string()))
}

/// Run all pending migrations from `migrations`.
///
/// # Errors
/// Returns an error if migrations fail.
pub fn run_migrations(pool: &DbPool, migrations: EmbeddedMigrations) -> Result<()> {
    let mut conn = checkout(pool)?;
    conn.run_pending_migrations(migrations)
        .map_err(|e| Error::Database(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::prelude::*;

    #[derive(diesel::QueryableByName)]
    struct TableName {
        #[diesel(sql_type = diesel::sql_types::Text)]
        name: String,
    }

    #[derive(diesel::QueryableByName)]
    struct PragmaValue {
        #[diesel(sql_type = diesel::sql_types::Integer)]
        value: i32,
    }

    fn table_names(pool: &DbPool) -> Vec<String> {
        let mut conn = pool.get().unwrap();
        diesel::sql_query(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name",
        )
        .load::<TableName>(&mut conn)
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect()
    }

    #[test]
    fn create_pool_with_memory_db() {
        assert!(create_pool_with_size(":memory:", 1).is_ok());
    }

    #[test]
    fn vault_migrations_create_tables() {
        let pool = create_pool_with_size(":memory:", 1).unwrap();
        run_migrations(&pool, VAULT_MIGRATIONS).unwrap();

        let tables = table_names(&pool);
        for expected in ["channels", "files", "sessions", "settings", "users"] {
            assert!(tables.contains(&expected.to_string()), "missing {expected}");
        }
        assert!(!tables.contains(&"jobs".to_string()));
    }

    #[test]
    fn both_migration_sets_share_one_database() {
        let pool = create_pool_with_size(":memory:", 1).unwrap();
        run_migrations(&pool, VAULT_MIGRATIONS).unwrap();
        run_migrations(&pool, JOB_MIGRATIONS).unwrap();

        let tables = table_names(&pool);
        assert!(tables.contains(&"jobs".to_string()));
        assert!(tables.contains(&"sessions".to_string()));
    }

    #[test]
    fn run_migrations_is_idempotent() {
        let pool = create_pool_with_size(":memory:", 1).unwrap();
        run_migrations(&pool, VAULT_MIGRATIONS).unwrap();
        run_migrations(&pool, VAULT_MIGRATIONS).unwrap();
        assert_eq!(table_names(&pool).len(), 5);
    }

    #[test]
    fn pragmas_enable_foreign_keys() {
        let pool = create_pool_with_size(":memory:", 1).unwrap();
        let mut conn = pool.get().unwrap();
        let value = diesel::sql_query("SELECT foreign_keys AS value FROM pragma_foreign_keys")
            .get_result::<PragmaValue>(&mut conn)
            .unwrap()
            .value;
        assert_eq!(value, 1);
    }

    #[test]
    fn ensure_parent_dir_creates_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("data/nested/vault.sqlite3");
        ensure_parent_dir(db.to_str().unwrap()).unwrap();
        assert!(dir.path().join("data/nested").is_dir());
    }

    #[test]
    fn ensure_parent_dir_ignores_memory_and_bare_names() {
        ensure_parent_dir(":memory:").unwrap();
        ensure_parent_dir("bot_data.sqlite3").unwrap();
    }
}
