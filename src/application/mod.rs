//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement the bot's behaviour: public delivery, the owner's upload
//! flow, administration, backups and scheduled deletions.

pub mod admin;
pub mod backup;
pub mod scheduler;
pub mod text;
pub mod upload;
pub mod vault;

pub use admin::{AdminService, BroadcastPacing};
pub use backup::BackupService;
pub use scheduler::DeletionScheduler;
pub use upload::UploadFlow;
pub use vault::VaultService;
