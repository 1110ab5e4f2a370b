//! User-facing reply texts.

pub const HELP: &str = "📚 Help - Bot Commands\n\n\
/start - start bot or use deep link: /start <session_id>\n\
/help - show this help\n\
\n\
Owner-only commands are available to the owner. Use /adminp to show them if you are the owner.";

pub const ADMIN_HELP: &str = "Admin Commands\n\n\
/upload [exclude_text] - start staging files for upload\n\
/d - finalize upload session (choose protect + expiry)\n\
/e - cancel current staging upload\n\
/setmessage - set start/help message (send text next)\n\
/setimage - set start image (send photo next)\n\
/setchannel <alias> <link> - add channel alias for buttons\n\
/setforcechannel <channel_link_or_username> - require join to access sessions\n\
/setforcechannel off - disable force join requirement\n\
/stats - show stats\n\
/broadcast <text> - broadcast to all users\n\
/revoke <session_id> - revoke a session\n\
/listchannels - list channel aliases";

// Public delivery
pub const MALFORMED_SESSION: &str = "Invalid or malformed session id.";
pub const SESSION_NOT_FOUND: &str = "Session not found or invalid.";
pub const SESSION_REVOKED: &str = "This session has been revoked.";
pub const SESSION_EXPIRED: &str = "This session has expired.";
pub const MUST_JOIN: &str = "You must join the required channel to access this session.";
pub const EMPTY_SESSION: &str = "No files in this session.";

// Owner guard
pub const OWNER_ONLY: &str = "Unauthorized: owner-only command.";
pub const UNAUTHORIZED: &str = "Unauthorized";

// Upload flow
pub const UPLOAD_STARTED: &str =
    "Upload session started. Send files now. When done send /d to finalize or /e to cancel.";
pub const UPLOAD_CANCELLED: &str = "Upload session cancelled and staging cleared.";
pub const NO_STAGING: &str = "No active staging session found.";
pub const NO_UPLOAD: &str = "No active upload session. Start with /upload";
pub const STAGED: &str = "Added to staging.";
pub const TEXT_EXCLUDED: &str = "Text excluded from staging (exclude_text).";
pub const UNSUPPORTED_STAGING: &str =
    "Unsupported type for staging. Send photos, documents, videos, audio, voice, or text.";
pub const CHOOSE_PROTECTION: &str = "Choose copy protection for delivered files:";
pub const ASK_MINUTES: &str = "Enter auto-delete time in minutes (0 = never, max 10080):";
pub const INVALID_MINUTES: &str = "Invalid minutes. Please send an integer between 0 and 10080.";
pub const ASK_FORCE: &str = "Do you want to require joining a channel to access this session?";
pub const ASK_FORCE_CHANNEL: &str = "Send the channel username or link to require users to join (e.g. @mychannel or https://t.me/mychannel).";
pub const NO_FORCE_FINALIZING: &str = "Session will not require forced join. Finalizing...";
pub const FORCE_OFF_FINALIZING: &str = "No force join channel set. Finalizing...";
pub const STAGING_LOST: &str = "Staging lost. Start again with /upload";
pub const USE_BUTTONS: &str = "Please answer the question above using the buttons, or send /e to cancel.";
pub const FINALIZE_IN_PROGRESS: &str =
    "Finalization already in progress. Answer the question above or send /e to cancel.";
pub const STALE_CHOICE: &str = "That choice is no longer available.";
pub const TEXT_FILE_CAPTION: &str = "(text file)";
pub const FALLBACK_BOT_USERNAME: &str = "this_bot";

// Button labels and callback data
pub const PROTECT_ON_LABEL: &str = "Protect ON";
pub const PROTECT_OFF_LABEL: &str = "Protect OFF";
pub const FORCE_NONE_LABEL: &str = "No Force Join";
pub const FORCE_SET_LABEL: &str = "Set Force Join";
pub const PROTECT_ON: &str = "protect_on";
pub const PROTECT_OFF: &str = "protect_off";
pub const FORCE_NONE: &str = "force_none";
pub const FORCE_SET: &str = "force_set";

// Admin
pub const SET_MESSAGE_PROMPT: &str = "Send the new start/help message text as your next message.";
pub const MESSAGE_UPDATED: &str = "Start/help message updated.";
pub const SET_IMAGE_PROMPT: &str =
    "Send a photo to set as the start image (will be shown on /start without args).";
pub const IMAGE_SAVED: &str = "Start image saved.";
pub const SET_CHANNEL_USAGE: &str = "Usage: /setchannel <alias> <link>";
pub const NO_ALIASES: &str = "No channel aliases set.";
pub const SET_FORCE_USAGE: &str =
    "Usage: /setforcechannel <channel_link_or_username>\nUse \"off\" to disable";
pub const FORCE_DISABLED: &str = "Force join disabled globally.";
pub const BROADCAST_USAGE: &str = "Usage: /broadcast Your message here";
pub const REVOKE_USAGE: &str = "Usage: /revoke <session_id>";

#[must_use]
pub fn delivered(delivered: usize, failures: usize) -> String {
    format!("Delivered: {delivered} files. Failures: {failures}")
}

#[must_use]
pub fn force_channel_set(channel: &str) -> String {
    format!("Force join channel set to: {channel}")
}

#[must_use]
pub fn force_channel_finalizing(channel: &str) -> String {
    format!("Force join channel set to: {channel}\nFinalizing...")
}

#[must_use]
pub fn alias_added(alias: &str, link: &str) -> String {
    format!("Channel alias added: {alias} -> {link}")
}

#[must_use]
pub fn broadcast_finished(sent: usize, failed: usize) -> String {
    format!("Broadcast finished. Sent: {sent} Failed: {failed}")
}

#[must_use]
pub fn revoked(session_id: &str) -> String {
    format!("Session {session_id} revoked.")
}

#[must_use]
pub fn revoke_not_found(session_id: &str) -> String {
    format!("Session {session_id} not found.")
}

/// Summary sent to the owner after a finalised upload.
#[must_use]
pub fn finalized(
    session_id: &str,
    deep_link: &str,
    saved: usize,
    minutes: u32,
    protect: bool,
    force_channel: Option<&str>,
) -> String {
    format!(
        "Upload finalized. Session ID: {session_id}\n\
         Deep-link: {deep_link}\n\
         Files saved: {saved}\n\
         Expires in minutes: {minutes} (0 = never)\n\
         Protect content: {}\n\
         Force join channel: {}",
        if protect { "ON" } else { "OFF" },
        force_channel.unwrap_or("None"),
    )
}
