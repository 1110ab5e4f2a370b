//! Owner upload staging.
//!
//! An owner collects messages with `/upload`, then walks through a short
//! dialogue (copy protection, auto-delete minutes, optional force-join
//! channel) before the staged items become a [`Session`](super::session::Session).
//! [`StagingSession`] encodes that dialogue as an explicit phase machine so
//! that each owner message is interpreted according to the step it answers.

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::channel::ForceChannel;
use super::error::DomainError;
use super::file::FileKind;
use super::session::AutoDelete;

/// Content of one staged message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedContent {
    Media {
        kind: FileKind,
        file_id: String,
        file_unique_id: Option<String>,
        mime: Option<String>,
    },
    Text(String),
}

/// A message the owner sent while staging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedItem {
    pub chat_id: i64,
    pub message_id: i32,
    pub content: StagedContent,
    pub caption: Option<String>,
}

impl StagedItem {
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self.content, StagedContent::Text(_))
    }
}

/// Step of the finalisation dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingPhase {
    Collecting,
    AwaitingProtection,
    AwaitingAutoDelete,
    AwaitingForceChoice,
    AwaitingForceChannel,
    Ready,
}

impl fmt::Display for StagingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Collecting => "collecting",
            Self::AwaitingProtection => "awaiting protection",
            Self::AwaitingAutoDelete => "awaiting auto-delete",
            Self::AwaitingForceChoice => "awaiting force-join choice",
            Self::AwaitingForceChannel => "awaiting force-join channel",
            Self::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// Errors raised by staging transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StagingError {
    #[error("staging is {actual}, expected {expected}")]
    WrongPhase {
        expected: StagingPhase,
        actual: StagingPhase,
    },

    #[error("text is excluded from this upload")]
    ExcludedText,

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Everything needed to persist a finalised upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizePlan {
    pub owner_id: i64,
    pub items: Vec<StagedItem>,
    pub exclude_text: bool,
    pub protect_content: bool,
    pub auto_delete: AutoDelete,
    pub force_channel: Option<ForceChannel>,
}

/// In-memory upload being prepared by the owner.
#[derive(Debug, Clone)]
pub struct StagingSession {
    owner_id: i64,
    items: Vec<StagedItem>,
    exclude_text: bool,
    created_at: DateTime<Utc>,
    phase: StagingPhase,
    protect_content: bool,
    auto_delete: AutoDelete,
    force_channel: Option<ForceChannel>,
}

impl StagingSession {
    #[must_use]
    pub fn new(owner_id: i64, exclude_text: bool, now: DateTime<Utc>) -> Self {
        Self {
            owner_id,
            items: Vec::new(),
            exclude_text,
            created_at: now,
            phase: StagingPhase::Collecting,
            protect_content: false,
            auto_delete: AutoDelete::NEVER,
            force_channel: None,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> StagingPhase {
        self.phase
    }

    #[must_use]
    pub fn items(&self) -> &[StagedItem] {
        &self.items
    }

    #[must_use]
    pub const fn exclude_text(&self) -> bool {
        self.exclude_text
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn expect(&self, expected: StagingPhase) -> Result<(), StagingError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(StagingError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    /// Add a message to the upload.
    ///
    /// # Errors
    /// Fails outside [`StagingPhase::Collecting`] and for text when the
    /// upload excludes text.
    pub fn stage(&mut self, item: StagedItem) -> Result<(), StagingError> {
        self.expect(StagingPhase::Collecting)?;
        if self.exclude_text && item.is_text() {
            return Err(StagingError::ExcludedText);
        }
        self.items.push(item);
        Ok(())
    }

    /// Close collection and ask for copy protection.
    ///
    /// Repeating `/d` while the protection question is open is accepted.
    ///
    /// # Errors
    /// Fails in any later phase.
    pub fn begin_finalize(&mut self) -> Result<(), StagingError> {
        if self.phase == StagingPhase::AwaitingProtection {
            return Ok(());
        }
        self.expect(StagingPhase::Collecting)?;
        self.phase = StagingPhase::AwaitingProtection;
        Ok(())
    }

    /// Record the protection choice.
    ///
    /// # Errors
    /// Fails outside [`StagingPhase::AwaitingProtection`].
    pub fn choose_protection(&mut self, protect: bool) -> Result<(), StagingError> {
        self.expect(StagingPhase::AwaitingProtection)?;
        self.protect_content = protect;
        self.phase = StagingPhase::AwaitingAutoDelete;
        Ok(())
    }

    /// Record the auto-delete minutes typed by the owner.
    ///
    /// Invalid input leaves the phase unchanged so the owner can retry.
    ///
    /// # Errors
    /// Fails outside [`StagingPhase::AwaitingAutoDelete`] or on bad input.
    pub fn set_auto_delete(&mut self, input: &str) -> Result<AutoDelete, StagingError> {
        self.expect(StagingPhase::AwaitingAutoDelete)?;
        let auto_delete = AutoDelete::parse(input)?;
        self.auto_delete = auto_delete;
        self.phase = StagingPhase::AwaitingForceChoice;
        Ok(auto_delete)
    }

    /// Record whether the session requires joining a channel.
    ///
    /// # Errors
    /// Fails outside [`StagingPhase::AwaitingForceChoice`].
    pub fn choose_force(&mut self, require: bool) -> Result<(), StagingError> {
        self.expect(StagingPhase::AwaitingForceChoice)?;
        if require {
            self.phase = StagingPhase::AwaitingForceChannel;
        } else {
            self.force_channel = None;
            self.phase = StagingPhase::Ready;
        }
        Ok(())
    }

    /// Record the channel the owner typed. Disable keywords mean none.
    ///
    /// # Errors
    /// Fails outside [`StagingPhase::AwaitingForceChannel`].
    pub fn set_force_channel(&mut self, input: &str) -> Result<Option<ForceChannel>, StagingError> {
        self.expect(StagingPhase::AwaitingForceChannel)?;
        self.force_channel = ForceChannel::from_input(input);
        self.phase = StagingPhase::Ready;
        Ok(self.force_channel.clone())
    }

    /// Consume a ready upload.
    ///
    /// # Errors
    /// Fails unless the dialogue reached [`StagingPhase::Ready`].
    pub fn into_plan(self) -> Result<FinalizePlan, StagingError> {
        self.expect(StagingPhase::Ready)?;
        Ok(FinalizePlan {
            owner_id: self.owner_id,
            items: self.items,
            exclude_text: self.exclude_text,
            protect_content: self.protect_content,
            auto_delete: self.auto_delete,
            force_channel: self.force_channel,
        })
    }
}
