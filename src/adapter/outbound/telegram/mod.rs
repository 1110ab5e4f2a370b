//! Telegram Bot API adapter.

pub mod messenger;

pub use messenger::TeloxideMessenger;
