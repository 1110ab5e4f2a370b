//! Telegram-agnostic vault domain: sessions, files, staging and jobs.

pub mod channel;
pub mod error;
pub mod file;
pub mod id;
pub mod job;
pub mod session;
pub mod settings;
pub mod staging;

pub use channel::{ChannelAlias, ChatRef, ForceChannel};
pub use file::{FileKind, NewStoredFile, StoredFile};
pub use id::{JobId, SessionId};
pub use job::DeletionJob;
pub use session::{AutoDelete, Session, SessionAccess};
pub use settings::{SettingKey, VaultStats};
pub use staging::{FinalizePlan, StagedContent, StagedItem, StagingError, StagingPhase, StagingSession};
