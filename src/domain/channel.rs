//! Chat and channel references.

use std::fmt;

use super::error::DomainError;

const TELEGRAM_HOSTS: [&str; 3] = ["https://t.me/", "http://t.me/", "https://telegram.me/"];

/// Words that switch a force-join requirement off.
const DISABLE_KEYWORDS: [&str; 4] = ["off", "none", "no", "disable"];

/// Address of a chat the bot talks to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChatRef {
    /// Numeric chat id (users, groups, `-100…` channels).
    Id(i64),
    /// Public username including the leading `@`.
    Username(String),
}

impl ChatRef {
    /// Parse a configured chat reference such as `-1001234` or `@vault`.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidChatRef`] for blank input.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let value = value.trim();
        if let Ok(id) = value.parse::<i64>() {
            return Ok(Self::Id(id));
        }
        let name = value.trim_start_matches('@');
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidChatRef {
                value: value.to_string(),
            });
        }
        Ok(Self::Username(format!("@{name}")))
    }

    /// The chat of a private conversation with a user.
    #[must_use]
    pub const fn user(user_id: i64) -> Self {
        Self::Id(user_id)
    }
}

impl fmt::Display for ChatRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Username(name) => f.write_str(name),
        }
    }
}

/// A channel users must join before opening a session.
///
/// Keeps the owner's raw input (`@name`, `https://t.me/name`, or an id)
/// because that is what the join button links to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForceChannel(String);

impl ForceChannel {
    /// Interpret owner input. Blank input and disable keywords yield `None`.
    #[must_use]
    pub fn from_input(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() || is_disable_keyword(input) {
            None
        } else {
            Some(Self(input.to_string()))
        }
    }

    /// Interpret a stored setting, where the empty string means none.
    #[must_use]
    pub fn from_setting(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(Self(value.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL for the join button.
    #[must_use]
    pub fn join_url(&self) -> String {
        if self.0.starts_with("http") {
            self.0.clone()
        } else {
            format!("https://t.me/{}", self.0.trim_start_matches('@'))
        }
    }

    /// Chat to query for membership.
    ///
    /// Invite links have no addressable chat and return `None`.
    #[must_use]
    pub fn chat_ref(&self) -> Option<ChatRef> {
        let raw = self.0.as_str();
        let path = TELEGRAM_HOSTS
            .iter()
            .find_map(|host| raw.strip_prefix(host));
        match path {
            Some(path) => {
                let name = path.split(['/', '?']).next().unwrap_or_default();
                if name.is_empty() || name.starts_with('+') || name == "joinchat" {
                    None
                } else {
                    Some(ChatRef::Username(format!("@{name}")))
                }
            }
            None if raw.starts_with("http") => None,
            None => ChatRef::parse(raw).ok(),
        }
    }
}

impl fmt::Display for ForceChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// True for `off`, `none`, `no` and `disable`, ignoring case.
#[must_use]
pub fn is_disable_keyword(input: &str) -> bool {
    let lowered = input.trim().to_lowercase();
    DISABLE_KEYWORDS.contains(&lowered.as_str())
}

/// A named channel link shown as a button on `/start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelAlias {
    pub alias: String,
    pub link: String,
}

impl ChannelAlias {
    /// Parse `/setchannel` arguments: `<alias> <link>`.
    ///
    /// # Errors
    /// Returns [`DomainError::IncompleteAlias`] unless both parts are present.
    pub fn parse_args(args: &str) -> Result<Self, DomainError> {
        let (alias, link) = args
            .trim()
            .split_once(char::is_whitespace)
            .ok_or(DomainError::IncompleteAlias)?;
        let link = link.trim();
        if alias.is_empty() || link.is_empty() {
            return Err(DomainError::IncompleteAlias);
        }
        Ok(Self {
            alias: alias.to_string(),
            link: link.to_string(),
        })
    }
}
