//! Telegram command parsing.

/// Supported bot commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultCommand {
    /// `/start [session_id]`.
    Start(Option<String>),
    /// `/help` and its `/hep` alias.
    Help,
    AdminHelp,
    Upload {
        exclude_text: bool,
    },
    /// `/d`.
    Finalize,
    /// `/e`.
    Cancel,
    SetMessage,
    SetImage,
    SetChannel(String),
    ListChannels,
    SetForceChannel(String),
    Broadcast(String),
    Stats,
    Revoke(String),
}

impl VaultCommand {
    /// Commands only the owner may run.
    #[must_use]
    pub const fn is_owner_only(&self) -> bool {
        !matches!(self, Self::Start(_) | Self::Help)
    }
}

/// Parse error for command messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    NotACommand,
    UnknownCommand(String),
}

impl std::fmt::Display for CommandParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotACommand => write!(f, "message is not a command"),
            Self::UnknownCommand(cmd) => write!(f, "unknown command `{cmd}`"),
        }
    }
}

impl std::error::Error for CommandParseError {}

/// Parse a message text into a bot command.
///
/// Everything after the command word is the argument, with surrounding
/// whitespace trimmed and inner line breaks kept (broadcast bodies).
pub fn parse_command(text: &str) -> Result<VaultCommand, CommandParseError> {
    let text = text.trim_start();
    if !text.starts_with('/') {
        return Err(CommandParseError::NotACommand);
    }

    let (raw_command, args) = text
        .split_once(char::is_whitespace)
        .map_or((text, ""), |(head, rest)| (head, rest.trim()));
    let command = raw_command
        .split_once('@')
        .map_or(raw_command, |(head, _)| head);

    let owned = || args.to_string();
    match command {
        "/start" => Ok(VaultCommand::Start((!args.is_empty()).then(owned))),
        "/help" | "/hep" => Ok(VaultCommand::Help),
        "/adminp" => Ok(VaultCommand::AdminHelp),
        "/upload" => Ok(VaultCommand::Upload {
            exclude_text: args.eq_ignore_ascii_case("exclude_text"),
        }),
        "/d" => Ok(VaultCommand::Finalize),
        "/e" => Ok(VaultCommand::Cancel),
        "/setmessage" => Ok(VaultCommand::SetMessage),
        "/setimage" => Ok(VaultCommand::SetImage),
        "/setchannel" => Ok(VaultCommand::SetChannel(owned())),
        "/listchannels" => Ok(VaultCommand::ListChannels),
        "/setforcechannel" => Ok(VaultCommand::SetForceChannel(owned())),
        "/broadcast" => Ok(VaultCommand::Broadcast(owned())),
        "/stats" => Ok(VaultCommand::Stats),
        "/revoke" => Ok(VaultCommand::Revoke(owned())),
        other => Err(CommandParseError::UnknownCommand(other.to_string())),
    }
}

/// Bot commands for Telegram menu registration.
///
/// Returns tuples of (command, description) for `set_my_commands`.
#[must_use]
pub fn bot_commands() -> Vec<(&'static str, &'static str)> {
    vec![
        ("start", "Start the bot or open a session link"),
        ("help", "Show help"),
        ("adminp", "Owner commands"),
        ("upload", "Start staging files"),
        ("d", "Finalize the staged upload"),
        ("e", "Cancel the staged upload"),
        ("stats", "Show stats"),
    ]
}
