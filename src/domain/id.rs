//! Domain identifier types with proper encapsulation.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::DomainError;

const SESSION_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of freshly generated session ids.
pub const SESSION_ID_LEN: usize = 36;

/// Shortest session id accepted from a deep link.
pub const MIN_SESSION_ID_LEN: usize = 8;

/// Session identifier - the secret part of a deep link.
///
/// The inner String is private to ensure all construction goes through
/// [`SessionId::generate`] or the validating [`SessionId::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a random session id from a cryptographically secure RNG.
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_with_len(SESSION_ID_LEN)
    }

    /// Generate a random session id of the given length.
    #[must_use]
    pub fn generate_with_len(len: usize) -> Self {
        let mut rng = rand::thread_rng();
        let id = (0..len)
            .map(|_| SESSION_ALPHABET[rng.gen_range(0..SESSION_ALPHABET.len())] as char)
            .collect();
        Self(id)
    }

    /// Validate an id received from a user.
    ///
    /// # Errors
    /// Returns [`DomainError::MalformedSessionId`] unless the input is ASCII
    /// alphanumeric and at least [`MIN_SESSION_ID_LEN`] characters long.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let value = value.trim();
        if value.len() < MIN_SESSION_ID_LEN || !value.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(DomainError::MalformedSessionId {
                value: value.to_string(),
            });
        }
        Ok(Self(value.to_string()))
    }

    /// Rebuild an id read back from storage without re-validating it.
    pub(crate) fn from_stored(value: String) -> Self {
        Self(value)
    }

    /// Get the session ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deletion job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(String);

impl JobId {
    /// Create a new random job ID.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the job ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_alphanumeric_and_long() {
        let id = SessionId::generate();
        assert_eq!(id.as_str().len(), SESSION_ID_LEN);
        assert!(id.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }

    #[test]
    fn generated_ids_parse_back() {
        let id = SessionId::generate();
        assert_eq!(SessionId::parse(id.as_str()).unwrap(), id);
    }

    #[test]
    fn parse_rejects_short_ids() {
        assert!(SessionId::parse("abc1234").is_err());
        assert!(SessionId::parse("abcd1234").is_ok());
    }

    #[test]
    fn parse_rejects_non_alphanumeric() {
        assert!(SessionId::parse("abcd-1234").is_err());
        assert!(SessionId::parse("abcd_1234").is_err());
        assert!(SessionId::parse("abcd1234é").is_err());
    }

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(SessionId::parse("  abcd1234 ").unwrap().as_str(), "abcd1234");
    }

    #[test]
    fn job_ids_are_unique() {
        assert_ne!(JobId::new(), JobId::new());
    }
}
