//! Inbound (driving) ports consumed by inbound adapters.
//!
//! Inbound ports describe what external drivers hand to the application:
//!
//! - Telegram updates reduced to transport-neutral messages and callbacks
//!
//! # Modules
//!
//! - [`update`]: Incoming messages, media attachments and button presses

pub mod update;
