//! Domain validation errors for core domain types.
//!
//! These errors are returned by `parse`/`try_new` constructors when owner or
//! user input violates a domain rule.
//!
//! # Examples
//!
//! ```
//! use sessionvault::domain::error::DomainError;
//! use sessionvault::domain::id::SessionId;
//!
//! let result = SessionId::parse("abc");
//! assert!(matches!(result, Err(DomainError::MalformedSessionId { .. })));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Session ids are alphanumeric and at least 8 characters long.
    #[error("malformed session id `{value}`")]
    MalformedSessionId {
        /// The rejected input.
        value: String,
    },

    /// Auto-delete minutes must be an integer within the allowed window.
    #[error("invalid auto-delete minutes `{value}` (expected 0..={max})")]
    InvalidAutoDelete {
        /// The rejected input.
        value: String,
        /// Largest accepted value.
        max: u32,
    },

    /// Channel references cannot be blank.
    #[error("invalid chat reference `{value}`")]
    InvalidChatRef {
        /// The rejected input.
        value: String,
    },

    /// Channel aliases need both a name and a link.
    #[error("channel alias and link must both be non-empty")]
    IncompleteAlias,
}
