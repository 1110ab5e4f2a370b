//! SQLite persistence adapters.
//!
//! Provides SQLite-backed implementations of the vault and job stores
//! using Diesel ORM.

pub mod database;
pub mod job;
pub mod store;

pub use job::SqliteJobStore;
pub use store::SqliteVaultStore;
