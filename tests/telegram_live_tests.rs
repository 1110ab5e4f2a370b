//! Live Bot API checks. Need `--features telegram-integration`,
//! `SESSIONVAULT_LIVE=1`, `BOT_TOKEN` and `UPLOAD_CHANNEL_ID`.

#![cfg(feature = "telegram-integration")]

use std::env;
use std::time::Duration;

use sessionvault::adapter::outbound::telegram::TeloxideMessenger;
use sessionvault::domain::ChatRef;
use sessionvault::port::outbound::messenger::Messenger;
use teloxide::Bot;
use tokio::time::timeout;

fn live_messenger() -> Option<TeloxideMessenger> {
    if env::var("SESSIONVAULT_LIVE").ok().as_deref() != Some("1") {
        eprintln!("Skipping live test (set SESSIONVAULT_LIVE=1 to enable)");
        return None;
    }
    let token = env::var("BOT_TOKEN").expect("BOT_TOKEN must be set");
    Some(TeloxideMessenger::new(Bot::new(token)))
}

#[tokio::test]
#[ignore = "requires SESSIONVAULT_LIVE=1 and network access"]
async fn live_bot_resolves_its_username() {
    let Some(messenger) = live_messenger() else {
        return;
    };
    let username = timeout(Duration::from_secs(20), messenger.bot_username())
        .await
        .expect("timed out calling getMe")
        .expect("getMe failed");
    assert!(!username.is_empty());
    assert!(!username.starts_with('@'));
}

#[tokio::test]
#[ignore = "requires SESSIONVAULT_LIVE=1 and network access"]
async fn live_upload_channel_is_reachable() {
    let Some(messenger) = live_messenger() else {
        return;
    };
    let channel = ChatRef::parse(&env::var("UPLOAD_CHANNEL_ID").expect("UPLOAD_CHANNEL_ID must be set"))
        .expect("UPLOAD_CHANNEL_ID must be a chat id or @name");
    timeout(Duration::from_secs(20), messenger.probe_chat(&channel))
        .await
        .expect("timed out calling getChat")
        .expect("upload channel should be reachable");
}
