//! In-memory SQLite stores for tests.

use crate::adapter::outbound::sqlite::database::connection::{
    create_pool_with_size, run_migrations, DbPool, JOB_MIGRATIONS, VAULT_MIGRATIONS,
};
use crate::adapter::outbound::sqlite::{SqliteJobStore, SqliteVaultStore};

/// Single-connection in-memory pool with both migration sets applied.
///
/// One connection keeps every checkout on the same private database.
pub fn memory_pool() -> DbPool {
    let pool = create_pool_with_size(":memory:", 1).expect("in-memory sqlite pool should initialize");
    run_migrations(&pool, VAULT_MIGRATIONS).expect("vault migrations should apply");
    run_migrations(&pool, JOB_MIGRATIONS).expect("job migrations should apply");
    pool
}

/// Build an in-memory vault store.
pub fn memory_vault_store() -> SqliteVaultStore {
    SqliteVaultStore::new(memory_pool())
}

/// Build an in-memory job store.
pub fn memory_job_store() -> SqliteJobStore {
    SqliteJobStore::new(memory_pool())
}
