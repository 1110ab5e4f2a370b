//! Infrastructure configuration modules.

pub mod logging;
pub mod server;
pub mod settings;
pub mod storage;
pub mod telegram;

pub use settings::Config;
