//! Telegram inbound adapter: command parsing, routing and the update listener.

pub mod auth;
pub mod command;
pub mod listener;
pub mod router;

pub use listener::listen;
pub use router::UpdateRouter;
