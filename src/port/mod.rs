//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points in the hexagonal architecture.
//! They are traits and DTOs that adapters implement or produce to integrate
//! with external systems (Telegram, SQLite).
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │                         │
//!     ┌──────────────┤  Domain + Port          ├──────────────┐
//!     │              │                         │              │
//!     │              └─────────────────────────┘              │
//!     │                         │                             │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │ Update  │            │   Store     │              │ Messenger │
//! │ Router  │            │   Adapter   │              │  Adapter  │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`inbound::update`] - Incoming messages and callbacks
//! - [`outbound::store`] - Sessions, settings, users and jobs persistence
//! - [`outbound::messenger`] - Telegram Bot API operations

pub mod inbound;
pub mod outbound;
