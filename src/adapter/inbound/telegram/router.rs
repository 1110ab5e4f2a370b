//! Routes incoming updates to the application services.
//!
//! Kept free of teloxide types so every routing rule can be exercised
//! with the recording messenger.
//!
//! Owner messages are interpreted in priority order:
//! 1. commands (any command also closes an open admin prompt),
//! 2. the answer to an open `/setmessage` or `/setimage` prompt,
//! 3. the upload staging dialogue,
//! 4. plain activity tracking.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::{text, AdminService, UploadFlow, VaultService};
use crate::domain::ChatRef;
use crate::error::Result;
use crate::port::inbound::update::{IncomingCallback, IncomingMessage};
use crate::port::outbound::messenger::Messenger;

use super::auth::Owner;
use super::command::{parse_command, CommandParseError, VaultCommand};

pub struct UpdateRouter {
    owner: Owner,
    messenger: Arc<dyn Messenger>,
    vault: Arc<VaultService>,
    upload: Arc<UploadFlow>,
    admin: Arc<AdminService>,
}

impl UpdateRouter {
    pub fn new(
        owner_id: i64,
        messenger: Arc<dyn Messenger>,
        vault: Arc<VaultService>,
        upload: Arc<UploadFlow>,
        admin: Arc<AdminService>,
    ) -> Self {
        Self {
            owner: Owner(owner_id),
            messenger,
            vault,
            upload,
            admin,
        }
    }

    /// Handle one message.
    ///
    /// # Errors
    /// Returns the first error raised by the handling service.
    pub async fn handle_message(&self, msg: &IncomingMessage) -> Result<()> {
        let is_owner = self.owner.is(msg.sender_id);

        if let Some(body) = msg.text.as_deref() {
            match parse_command(body) {
                Ok(command) => {
                    if is_owner {
                        self.admin.clear_prompt();
                    }
                    return self.dispatch(msg, command).await;
                }
                Err(CommandParseError::UnknownCommand(command)) => {
                    if is_owner {
                        self.admin.clear_prompt();
                    }
                    debug!(user_id = msg.sender_id, command, "Ignoring unknown command");
                    self.vault.track(msg.sender_id);
                    return Ok(());
                }
                Err(CommandParseError::NotACommand) => {}
            }
        }

        if is_owner {
            if self.admin.answer_prompt(msg).await? {
                return Ok(());
            }
            if self.upload.handle_message(msg).await? {
                return Ok(());
            }
        }
        self.vault.track(msg.sender_id);
        Ok(())
    }

    /// Handle one inline button press.
    ///
    /// # Errors
    /// Returns the first error raised by the upload flow.
    pub async fn handle_callback(&self, callback: &IncomingCallback) -> Result<()> {
        if !self.owner.authorize(callback.sender_id, &callback.data) {
            if let Err(e) = self
                .messenger
                .answer_callback(&callback.id, Some(text::UNAUTHORIZED))
                .await
            {
                warn!(error = %e, "Failed to answer callback");
            }
            return Ok(());
        }
        self.upload.handle_callback(callback).await
    }

    async fn dispatch(&self, msg: &IncomingMessage, command: VaultCommand) -> Result<()> {
        let chat_id = msg.chat_id;
        let sender = msg.sender_id;

        if command.is_owner_only() && !self.owner.authorize(sender, &format!("{command:?}")) {
            self.messenger
                .send_text(&ChatRef::Id(chat_id), text::OWNER_ONLY, None)
                .await?;
            return Ok(());
        }

        match command {
            VaultCommand::Start(argument) => {
                self.vault.start(chat_id, sender, argument.as_deref()).await
            }
            VaultCommand::Help => self.vault.help(chat_id).await,
            VaultCommand::AdminHelp => self.admin.help(chat_id).await,
            VaultCommand::Upload { exclude_text } => {
                self.upload.begin(sender, chat_id, exclude_text).await
            }
            VaultCommand::Finalize => self.upload.request_finalize(sender, chat_id).await,
            VaultCommand::Cancel => self.upload.cancel(sender, chat_id).await,
            VaultCommand::SetMessage => self.admin.ask_start_message(chat_id).await,
            VaultCommand::SetImage => self.admin.ask_start_image(chat_id).await,
            VaultCommand::SetChannel(args) => self.admin.set_channel(chat_id, &args).await,
            VaultCommand::ListChannels => self.admin.list_channels(chat_id).await,
            VaultCommand::SetForceChannel(args) => {
                self.admin.set_force_channel(chat_id, &args).await
            }
            VaultCommand::Broadcast(body) => self.admin.broadcast(chat_id, &body).await.map(|_| ()),
            VaultCommand::Stats => self.admin.stats(chat_id).await,
            VaultCommand::Revoke(args) => self.admin.revoke(chat_id, &args).await,
        }
    }
}
