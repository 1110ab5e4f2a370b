//! Long-polling listener that feeds Telegram updates to the router.

use std::sync::Arc;

use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::types::{BotCommand, CallbackQuery, FileMeta, Message, UserId};
use tracing::{debug, error, info, warn};

use crate::domain::FileKind;
use crate::port::inbound::update::{IncomingCallback, IncomingMessage, MediaAttachment};

use super::command::bot_commands;
use super::router::UpdateRouter;

/// Run the dispatcher until Ctrl-C.
///
/// Updates queued while the bot was offline are dropped first so stale
/// `/start` links are not replayed.
pub async fn listen(bot: Bot, router: Arc<UpdateRouter>) {
    if let Err(e) = bot.delete_webhook().drop_pending_updates(true).await {
        warn!(error = %e, "Failed to drop pending updates");
    }
    if let Err(e) = register_bot_commands(&bot).await {
        warn!(error = %e, "Failed to register bot commands with Telegram");
    }

    info!("Telegram listener started");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_callback_query().endpoint(on_callback));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![router])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Telegram listener stopped");
}

async fn on_message(msg: Message, router: Arc<UpdateRouter>) -> ResponseResult<()> {
    let Some(incoming) = incoming_message(&msg) else {
        debug!(chat_id = msg.chat.id.0, "Skipping message without a sender");
        return Ok(());
    };
    if let Err(e) = router.handle_message(&incoming).await {
        error!(
            chat_id = incoming.chat_id,
            user_id = incoming.sender_id,
            error = %e,
            "Failed to handle message"
        );
    }
    Ok(())
}

async fn on_callback(query: CallbackQuery, router: Arc<UpdateRouter>) -> ResponseResult<()> {
    let incoming = incoming_callback(&query);
    if let Err(e) = router.handle_callback(&incoming).await {
        error!(user_id = incoming.sender_id, error = %e, "Failed to handle callback");
    }
    Ok(())
}

async fn register_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    let commands: Vec<BotCommand> = bot_commands()
        .into_iter()
        .map(|(cmd, desc)| BotCommand::new(cmd, desc))
        .collect();

    bot.set_my_commands(commands).await?;
    info!("Registered bot commands with Telegram");
    Ok(())
}

/// Convert a teloxide message. Messages without a sender are skipped.
fn incoming_message(msg: &Message) -> Option<IncomingMessage> {
    let sender = msg.from.as_ref()?;
    Some(IncomingMessage {
        chat_id: msg.chat.id.0,
        message_id: msg.id.0,
        sender_id: user_id(sender.id),
        text: msg.text().map(str::to_string),
        caption: msg.caption().map(str::to_string),
        media: media_attachment(msg),
        reply_to: msg.reply_to_message().map(|reply| reply.id.0),
    })
}

fn incoming_callback(query: &CallbackQuery) -> IncomingCallback {
    IncomingCallback {
        id: query.id.to_string(),
        sender_id: user_id(query.from.id),
        data: query.data.clone().unwrap_or_default(),
    }
}

fn media_attachment(msg: &Message) -> Option<MediaAttachment> {
    // Telegram lists photo sizes smallest first.
    if let Some(largest) = msg.photo().and_then(<[_]>::last) {
        return Some(attachment(FileKind::Photo, &largest.file, None));
    }
    if let Some(doc) = msg.document() {
        return Some(attachment(FileKind::Document, &doc.file, mime(doc.mime_type.as_ref())));
    }
    if let Some(video) = msg.video() {
        return Some(attachment(FileKind::Video, &video.file, mime(video.mime_type.as_ref())));
    }
    if let Some(audio) = msg.audio() {
        return Some(attachment(FileKind::Audio, &audio.file, mime(audio.mime_type.as_ref())));
    }
    if let Some(voice) = msg.voice() {
        return Some(attachment(FileKind::Voice, &voice.file, mime(voice.mime_type.as_ref())));
    }
    None
}

fn attachment(kind: FileKind, file: &FileMeta, mime: Option<String>) -> MediaAttachment {
    MediaAttachment {
        kind,
        file_id: file.id.to_string(),
        file_unique_id: Some(file.unique_id.to_string()),
        mime,
    }
}

fn mime(mime: Option<&impl ToString>) -> Option<String> {
    mime.map(ToString::to_string)
}

#[allow(clippy::cast_possible_wrap)]
fn user_id(id: UserId) -> i64 {
    id.0 as i64
}
