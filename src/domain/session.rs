//! Vault sessions: shareable bundles of stored files.

use chrono::{DateTime, Duration, Utc};

use super::channel::ForceChannel;
use super::error::DomainError;
use super::id::SessionId;

/// Auto-delete window in minutes. Zero means never.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct AutoDelete(u32);

impl AutoDelete {
    /// One week, the largest accepted window.
    pub const MAX_MINUTES: u32 = 10_080;

    /// Never delete.
    pub const NEVER: Self = Self(0);

    /// Create an auto-delete window.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidAutoDelete`] above [`Self::MAX_MINUTES`].
    pub fn try_new(minutes: u32) -> Result<Self, DomainError> {
        if minutes > Self::MAX_MINUTES {
            return Err(DomainError::InvalidAutoDelete {
                value: minutes.to_string(),
                max: Self::MAX_MINUTES,
            });
        }
        Ok(Self(minutes))
    }

    /// Parse owner input such as `"30"`.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidAutoDelete`] for anything that is not an
    /// integer in `0..=MAX_MINUTES`.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let trimmed = input.trim();
        let invalid = || DomainError::InvalidAutoDelete {
            value: trimmed.to_string(),
            max: Self::MAX_MINUTES,
        };
        let minutes: u32 = trimmed.parse().map_err(|_| invalid())?;
        Self::try_new(minutes).map_err(|_| invalid())
    }

    #[must_use]
    pub const fn minutes(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_never(self) -> bool {
        self.0 == 0
    }

    /// The instant `minutes` after `from`, or `None` when deletion is off.
    #[must_use]
    pub fn deadline_from(self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.is_never() {
            None
        } else {
            Some(from + Duration::minutes(i64::from(self.0)))
        }
    }
}

/// Result of checking whether a session can be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAccess {
    Granted,
    Revoked,
    Expired,
}

/// A finalised upload that can be opened through its deep link.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: SessionId,
    pub owner_id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub auto_delete: AutoDelete,
    pub protect_content: bool,
    pub revoked: bool,
    pub force_join_channel: Option<ForceChannel>,
}

impl Session {
    /// Build a new, unrevoked session created at `now`.
    #[must_use]
    pub fn new(
        owner_id: i64,
        now: DateTime<Utc>,
        auto_delete: AutoDelete,
        protect_content: bool,
        force_join_channel: Option<ForceChannel>,
    ) -> Self {
        Self {
            id: SessionId::generate(),
            owner_id,
            title: "session".to_string(),
            created_at: now,
            expires_at: auto_delete.deadline_from(now),
            auto_delete,
            protect_content,
            revoked: false,
            force_join_channel,
        }
    }

    /// Decide whether the session may be opened at `now`.
    ///
    /// Revocation wins over expiry.
    #[must_use]
    pub fn access_at(&self, now: DateTime<Utc>) -> SessionAccess {
        if self.revoked {
            return SessionAccess::Revoked;
        }
        match self.expires_at {
            Some(expires_at) if expires_at < now => SessionAccess::Expired,
            _ => SessionAccess::Granted,
        }
    }

    /// Deep link that opens this session through the given bot.
    #[must_use]
    pub fn deep_link(&self, bot_username: &str) -> String {
        format!("https://t.me/{bot_username}?start={}", self.id)
    }
}
