//! Owner authorization for commands and callbacks.

use tracing::warn;

/// The single account allowed to run owner commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner(pub i64);

impl Owner {
    /// Check if a sender is the owner.
    #[must_use]
    pub fn is(self, sender_id: i64) -> bool {
        self.0 == sender_id
    }

    /// Like [`Owner::is`], logging rejected senders.
    #[must_use]
    pub fn authorize(self, sender_id: i64, action: &str) -> bool {
        if self.is(sender_id) {
            return true;
        }
        warn!(user_id = sender_id, action, "Rejected owner-only action");
        false
    }
}
