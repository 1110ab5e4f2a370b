//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe infrastructure dependencies: persistence and
//! the Telegram Bot API.

pub mod messenger;
pub mod store;
