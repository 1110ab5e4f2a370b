//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`messenger`]: [`RecordingMessenger`](messenger::RecordingMessenger),
//!   a Bot API double with fault injection.
//! - [`store`]: In-memory SQLite pools and stores.
//! - [`domain`]: Builders for incoming updates and stored files.

pub mod domain;
pub mod messenger;
pub mod store;
