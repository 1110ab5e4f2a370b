//! Inbound adapters (driving side).

pub mod health;
pub mod telegram;
