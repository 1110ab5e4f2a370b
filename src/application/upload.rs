//! Owner upload flow.
//!
//! Drives a [`StagingSession`] from `/upload` through the finalisation
//! dialogue and persists the result: media is copied into the upload
//! channel, staged text becomes a small `.txt` document, and the new
//! session row plus file rows are written before a database backup.
//!
//! The staging map is only locked for synchronous transitions. Every
//! reply is sent after the guard is dropped.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use rand::Rng;
use tracing::{info, warn};

use crate::application::backup::BackupService;
use crate::application::text;
use crate::domain::{
    ChatRef, FileKind, FinalizePlan, NewStoredFile, Session, StagedContent, StagedItem,
    StagingError, StagingPhase, StagingSession,
};
use crate::error::Result;
use crate::port::inbound::update::{IncomingCallback, IncomingMessage};
use crate::port::outbound::messenger::{Button, DocumentSource, Keyboard, Messenger};
use crate::port::outbound::store::SessionStore;

/// What to tell the owner once the staging lock is released.
enum Step {
    Reply(&'static str),
    ReplyWith(&'static str, Keyboard),
    Finalize(String, FinalizePlan),
}

/// Owner-side staging and finalisation.
pub struct UploadFlow {
    messenger: Arc<dyn Messenger>,
    sessions: Arc<dyn SessionStore>,
    backup: Arc<BackupService>,
    upload_channel: ChatRef,
    staging: Mutex<HashMap<i64, StagingSession>>,
}

impl UploadFlow {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        sessions: Arc<dyn SessionStore>,
        backup: Arc<BackupService>,
        upload_channel: ChatRef,
    ) -> Self {
        Self {
            messenger,
            sessions,
            backup,
            upload_channel,
            staging: Mutex::new(HashMap::new()),
        }
    }

    /// Phase of the owner's staging, if any.
    #[must_use]
    pub fn phase(&self, owner_id: i64) -> Option<StagingPhase> {
        self.staging.lock().get(&owner_id).map(StagingSession::phase)
    }

    /// `/upload [exclude_text]`: start or restart staging.
    ///
    /// # Errors
    /// Returns an error if the reply cannot be sent.
    pub async fn begin(&self, owner_id: i64, chat_id: i64, exclude_text: bool) -> Result<()> {
        self.staging
            .lock()
            .insert(owner_id, StagingSession::new(owner_id, exclude_text, Utc::now()));
        info!(owner_id, exclude_text, "Upload staging started");
        self.reply(chat_id, text::UPLOAD_STARTED, None).await
    }

    /// `/e`: drop the owner's staging.
    ///
    /// # Errors
    /// Returns an error if the reply cannot be sent.
    pub async fn cancel(&self, owner_id: i64, chat_id: i64) -> Result<()> {
        let removed = self.staging.lock().remove(&owner_id).is_some();
        let body = if removed {
            text::UPLOAD_CANCELLED
        } else {
            text::NO_STAGING
        };
        self.reply(chat_id, body, None).await
    }

    /// `/d`: close collection and ask about copy protection.
    ///
    /// # Errors
    /// Returns an error if the reply cannot be sent.
    pub async fn request_finalize(&self, owner_id: i64, chat_id: i64) -> Result<()> {
        let step = match self.staging.lock().get_mut(&owner_id) {
            None => Step::Reply(text::NO_UPLOAD),
            Some(staging) => match staging.begin_finalize() {
                Ok(()) => Step::ReplyWith(text::CHOOSE_PROTECTION, protection_keyboard()),
                Err(_) => Step::Reply(text::FINALIZE_IN_PROGRESS),
            },
        };
        self.perform(owner_id, chat_id, step).await
    }

    /// Interpret a non-command owner message against the staging phase.
    ///
    /// Returns `false` when the owner has no staging, leaving the message
    /// to the caller.
    ///
    /// # Errors
    /// Returns an error if a reply or the finalisation fails.
    pub async fn handle_message(&self, msg: &IncomingMessage) -> Result<bool> {
        let owner_id = msg.sender_id;
        let step = {
            let mut staging = self.staging.lock();
            let Some(session) = staging.get_mut(&owner_id) else {
                return Ok(false);
            };
            match session.phase() {
                StagingPhase::Collecting => stage(session, msg),
                StagingPhase::AwaitingAutoDelete => {
                    let input = msg.text.as_deref().unwrap_or_default();
                    match session.set_auto_delete(input) {
                        Ok(_) => Step::ReplyWith(text::ASK_FORCE, force_keyboard()),
                        Err(_) => Step::Reply(text::INVALID_MINUTES),
                    }
                }
                StagingPhase::AwaitingForceChannel => match msg.text.as_deref() {
                    Some(input) => match session.set_force_channel(input) {
                        Ok(channel) => {
                            let notice = match &channel {
                                Some(channel) => text::force_channel_finalizing(channel.as_str()),
                                None => text::FORCE_OFF_FINALIZING.to_string(),
                            };
                            match session.clone().into_plan() {
                                Ok(plan) => Step::Finalize(notice, plan),
                                Err(_) => Step::Reply(text::STAGING_LOST),
                            }
                        }
                        Err(_) => Step::Reply(text::ASK_FORCE_CHANNEL),
                    },
                    None => Step::Reply(text::ASK_FORCE_CHANNEL),
                },
                _ => Step::Reply(text::USE_BUTTONS),
            }
        };
        self.perform(owner_id, msg.chat_id, step).await?;
        Ok(true)
    }

    /// Handle a button press from the owner.
    ///
    /// # Errors
    /// Returns an error if a reply or the finalisation fails.
    pub async fn handle_callback(&self, callback: &IncomingCallback) -> Result<()> {
        let owner_id = callback.sender_id;
        let step = {
            let mut staging = self.staging.lock();
            match staging.get_mut(&owner_id) {
                None => Some(Step::Reply(text::STAGING_LOST)),
                Some(session) => match callback.data.as_str() {
                    text::PROTECT_ON | text::PROTECT_OFF => session
                        .choose_protection(callback.data == text::PROTECT_ON)
                        .ok()
                        .map(|()| Step::Reply(text::ASK_MINUTES)),
                    text::FORCE_NONE => session.choose_force(false).ok().map(|()| {
                        match session.clone().into_plan() {
                            Ok(plan) => Step::Finalize(text::NO_FORCE_FINALIZING.to_string(), plan),
                            Err(_) => Step::Reply(text::STAGING_LOST),
                        }
                    }),
                    text::FORCE_SET => session
                        .choose_force(true)
                        .ok()
                        .map(|()| Step::Reply(text::ASK_FORCE_CHANNEL)),
                    _ => None,
                },
            }
        };

        let toast = step.is_none().then_some(text::STALE_CHOICE);
        if let Err(e) = self.messenger.answer_callback(&callback.id, toast).await {
            warn!(error = %e, "Failed to answer callback");
        }
        match step {
            Some(step) => self.perform(owner_id, owner_id, step).await,
            None => Ok(()),
        }
    }

    async fn perform(&self, owner_id: i64, chat_id: i64, step: Step) -> Result<()> {
        match step {
            Step::Reply(body) => self.reply(chat_id, body, None).await,
            Step::ReplyWith(body, keyboard) => self.reply(chat_id, body, Some(&keyboard)).await,
            Step::Finalize(notice, plan) => {
                self.messenger
                    .send_text(&ChatRef::Id(chat_id), &notice, None)
                    .await?;
                self.finalize(owner_id, chat_id, plan).await.map(|_| ())
            }
        }
    }

    /// Persist a ready upload and report it to the owner.
    ///
    /// Staging is cleared only once the session row exists, so a storage
    /// failure leaves the owner free to retry with `/e` and `/upload`.
    async fn finalize(&self, owner_id: i64, chat_id: i64, plan: FinalizePlan) -> Result<Session> {
        let session = Session::new(
            plan.owner_id,
            Utc::now(),
            plan.auto_delete,
            plan.protect_content,
            plan.force_channel.clone(),
        );
        self.sessions.create_session(&session)?;

        let mut saved = 0;
        for item in &plan.items {
            match self.persist_item(&session, item, plan.exclude_text).await {
                Ok(Some(file)) => match self.sessions.add_file(&file) {
                    Ok(()) => saved += 1,
                    Err(e) => warn!(session_id = %session.id, error = %e, "Failed to save file row"),
                },
                Ok(None) => {}
                Err(e) => warn!(
                    session_id = %session.id,
                    message_id = item.message_id,
                    error = %e,
                    "Failed to copy file to upload channel"
                ),
            }
        }

        self.backup.run().await;
        {
            // A `/upload` sent while finalizing started a new staging; keep it.
            let mut staging = self.staging.lock();
            if staging
                .get(&owner_id)
                .is_some_and(|s| s.phase() == StagingPhase::Ready)
            {
                staging.remove(&owner_id);
            }
        }

        let username = match self.messenger.bot_username().await {
            Ok(name) => name,
            Err(e) => {
                warn!(error = %e, "Failed to resolve bot username");
                text::FALLBACK_BOT_USERNAME.to_string()
            }
        };
        info!(session_id = %session.id, saved, "Upload finalized");

        let summary = text::finalized(
            session.id.as_str(),
            &session.deep_link(&username),
            saved,
            session.auto_delete.minutes(),
            session.protect_content,
            session.force_join_channel.as_ref().map(|c| c.as_str()),
        );
        self.reply(chat_id, &summary, None).await?;
        Ok(session)
    }

    /// Store one staged item in the upload channel.
    async fn persist_item(
        &self,
        session: &Session,
        item: &StagedItem,
        exclude_text: bool,
    ) -> Result<Option<NewStoredFile>> {
        match &item.content {
            StagedContent::Media {
                kind,
                file_id,
                file_unique_id,
                mime,
            } => {
                let message_id = self
                    .messenger
                    .copy_message(
                        &self.upload_channel,
                        &ChatRef::Id(item.chat_id),
                        item.message_id,
                        false,
                    )
                    .await?;
                Ok(Some(NewStoredFile {
                    session_id: session.id.clone(),
                    upload_channel_msg_id: message_id,
                    kind: *kind,
                    file_id: Some(file_id.clone()),
                    file_unique_id: file_unique_id.clone(),
                    mime: mime.clone(),
                    caption: item.caption.clone(),
                    added_at: Utc::now(),
                }))
            }
            StagedContent::Text(_) if exclude_text => Ok(None),
            StagedContent::Text(body) => {
                let source = DocumentSource::Memory {
                    file_name: text_file_name(session),
                    bytes: body.as_bytes().to_vec(),
                };
                let sent = self
                    .messenger
                    .send_document(&self.upload_channel, source, Some(text::TEXT_FILE_CAPTION))
                    .await?;
                Ok(Some(NewStoredFile {
                    session_id: session.id.clone(),
                    upload_channel_msg_id: sent.message_id,
                    kind: FileKind::Document,
                    file_id: sent.file_id,
                    file_unique_id: sent.file_unique_id,
                    mime: Some("text/plain".to_string()),
                    caption: None,
                    added_at: Utc::now(),
                }))
            }
        }
    }

    async fn reply(&self, chat_id: i64, body: &str, keyboard: Option<&Keyboard>) -> Result<()> {
        self.messenger
            .send_text(&ChatRef::Id(chat_id), body, keyboard)
            .await?;
        Ok(())
    }
}

fn stage(session: &mut StagingSession, msg: &IncomingMessage) -> Step {
    let Some(content) = msg.staged_content() else {
        return Step::Reply(text::UNSUPPORTED_STAGING);
    };
    let item = StagedItem {
        chat_id: msg.chat_id,
        message_id: msg.message_id,
        content,
        caption: msg.caption.clone(),
    };
    match session.stage(item) {
        Ok(()) => Step::Reply(text::STAGED),
        Err(StagingError::ExcludedText) => Step::Reply(text::TEXT_EXCLUDED),
        Err(_) => Step::Reply(text::USE_BUTTONS),
    }
}

fn text_file_name(session: &Session) -> String {
    let suffix: String = rand::thread_rng()
        .gen::<[u8; 6]>()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect();
    format!("session_{}_text_{suffix}.txt", session.id)
}

fn protection_keyboard() -> Keyboard {
    Keyboard::row(vec![
        Button::callback(text::PROTECT_ON_LABEL, text::PROTECT_ON),
        Button::callback(text::PROTECT_OFF_LABEL, text::PROTECT_OFF),
    ])
}

fn force_keyboard() -> Keyboard {
    Keyboard::row(vec![
        Button::callback(text::FORCE_NONE_LABEL, text::FORCE_NONE),
        Button::callback(text::FORCE_SET_LABEL, text::FORCE_SET),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::SqliteVaultStore;
    use crate::domain::{AutoDelete, ForceChannel, SessionId};
    use crate::testkit::domain::{callback, media_message, other_message, text_message};
    use crate::testkit::messenger::{RecordingMessenger, Sent};
    use crate::testkit::store::memory_vault_store;

    const OWNER: i64 = 1;
    const UPLOADS: ChatRef = ChatRef::Id(-1001);
    const BACKUPS: ChatRef = ChatRef::Id(-1002);

    struct Fixture {
        messenger: Arc<RecordingMessenger>,
        store: Arc<SqliteVaultStore>,
        flow: UploadFlow,
    }

    fn fixture() -> Fixture {
        let messenger = Arc::new(RecordingMessenger::new());
        let store = Arc::new(memory_vault_store());
        let backup = Arc::new(BackupService::new(
            messenger.clone(),
            "vault.sqlite3",
            Some(BACKUPS),
        ));
        let flow = UploadFlow::new(messenger.clone(), store.clone(), backup, UPLOADS);
        Fixture {
            messenger,
            store,
            flow,
        }
    }

    fn owner_chat() -> ChatRef {
        ChatRef::Id(OWNER)
    }

    fn session_id_from(summary: &str) -> SessionId {
        let id = summary
            .lines()
            .next()
            .and_then(|l| l.strip_prefix("Upload finalized. Session ID: "))
            .unwrap();
        SessionId::parse(id).unwrap()
    }

    async fn walk_to_minutes(f: &Fixture, protect: &str) {
        f.flow.request_finalize(OWNER, OWNER).await.unwrap();
        f.flow.handle_callback(&callback(OWNER, protect)).await.unwrap();
    }

    /// Stage one photo and walk to `Ready`, returning the plan the
    /// force-none button would finalize.
    async fn ready_plan(f: &Fixture) -> FinalizePlan {
        f.flow.begin(OWNER, OWNER, false).await.unwrap();
        f.flow
            .handle_message(&media_message(OWNER, 2, FileKind::Photo, "p", None))
            .await
            .unwrap();
        walk_to_minutes(f, text::PROTECT_OFF).await;
        f.flow
            .handle_message(&text_message(OWNER, 3, "0"))
            .await
            .unwrap();
        let mut staging = f.flow.staging.lock();
        let session = staging.get_mut(&OWNER).unwrap();
        session.choose_force(false).unwrap();
        session.clone().into_plan().unwrap()
    }

    #[tokio::test]
    async fn finalize_clears_the_ready_staging() {
        let f = fixture();
        let plan = ready_plan(&f).await;

        f.flow.finalize(OWNER, OWNER, plan).await.unwrap();

        assert_eq!(f.flow.phase(OWNER), None);
    }

    #[tokio::test]
    async fn finalize_keeps_a_staging_restarted_meanwhile() {
        let f = fixture();
        let plan = ready_plan(&f).await;
        f.flow.begin(OWNER, OWNER, true).await.unwrap();

        let session = f.flow.finalize(OWNER, OWNER, plan).await.unwrap();

        assert_eq!(f.flow.phase(OWNER), Some(StagingPhase::Collecting));
        assert_eq!(f.store.files(&session.id).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn messages_without_staging_are_not_handled() {
        let f = fixture();
        assert!(!f
            .flow
            .handle_message(&text_message(OWNER, 1, "hello"))
            .await
            .unwrap());
        assert!(f.messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn collecting_stages_supported_content() {
        let f = fixture();
        f.flow.begin(OWNER, OWNER, false).await.unwrap();
        f.flow
            .handle_message(&media_message(OWNER, 2, FileKind::Photo, "p", None))
            .await
            .unwrap();
        f.flow
            .handle_message(&text_message(OWNER, 3, "note"))
            .await
            .unwrap();
        f.flow
            .handle_message(&other_message(OWNER, 4))
            .await
            .unwrap();

        assert_eq!(
            f.messenger.texts_to(&owner_chat()),
            vec![
                text::UPLOAD_STARTED.to_string(),
                text::STAGED.to_string(),
                text::STAGED.to_string(),
                text::UNSUPPORTED_STAGING.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn exclude_text_rejects_text_items() {
        let f = fixture();
        f.flow.begin(OWNER, OWNER, true).await.unwrap();
        f.flow
            .handle_message(&text_message(OWNER, 2, "note"))
            .await
            .unwrap();

        assert_eq!(
            f.messenger.last_text_to(&owner_chat()).unwrap(),
            text::TEXT_EXCLUDED
        );
    }

    #[tokio::test]
    async fn cancel_reports_whether_staging_existed() {
        let f = fixture();
        f.flow.cancel(OWNER, OWNER).await.unwrap();
        f.flow.begin(OWNER, OWNER, false).await.unwrap();
        f.flow.cancel(OWNER, OWNER).await.unwrap();

        let texts = f.messenger.texts_to(&owner_chat());
        assert_eq!(texts[0], text::NO_STAGING);
        assert_eq!(texts[2], text::UPLOAD_CANCELLED);
        assert!(f.flow.phase(OWNER).is_none());
    }

    #[tokio::test]
    async fn finalize_without_staging_points_to_upload() {
        let f = fixture();
        f.flow.request_finalize(OWNER, OWNER).await.unwrap();
        assert_eq!(
            f.messenger.last_text_to(&owner_chat()).unwrap(),
            text::NO_UPLOAD
        );
    }

    #[tokio::test]
    async fn finalize_shows_protection_buttons() {
        let f = fixture();
        f.flow.begin(OWNER, OWNER, false).await.unwrap();
        f.flow.request_finalize(OWNER, OWNER).await.unwrap();

        match f.messenger.sent().last().unwrap() {
            Sent::Text {
                text: body,
                keyboard: Some(keyboard),
                ..
            } => {
                assert_eq!(body, text::CHOOSE_PROTECTION);
                assert_eq!(keyboard, &protection_keyboard());
            }
            other => panic!("unexpected call {other:?}"),
        }
        assert_eq!(f.flow.phase(OWNER), Some(StagingPhase::AwaitingProtection));
    }

    #[tokio::test]
    async fn invalid_minutes_keep_asking() {
        let f = fixture();
        f.flow.begin(OWNER, OWNER, false).await.unwrap();
        walk_to_minutes(&f, text::PROTECT_OFF).await;

        f.flow
            .handle_message(&text_message(OWNER, 9, "10081"))
            .await
            .unwrap();

        assert_eq!(
            f.messenger.last_text_to(&owner_chat()).unwrap(),
            text::INVALID_MINUTES
        );
        assert_eq!(f.flow.phase(OWNER), Some(StagingPhase::AwaitingAutoDelete));
    }

    #[tokio::test]
    async fn full_flow_without_force_join() {
        let f = fixture();
        f.flow.begin(OWNER, OWNER, false).await.unwrap();
        f.flow
            .handle_message(&media_message(OWNER, 2, FileKind::Video, "vid", Some("clip")))
            .await
            .unwrap();
        f.flow
            .handle_message(&text_message(OWNER, 3, "read me"))
            .await
            .unwrap();
        walk_to_minutes(&f, text::PROTECT_ON).await;
        f.flow
            .handle_message(&text_message(OWNER, 4, "15"))
            .await
            .unwrap();
        f.flow
            .handle_callback(&callback(OWNER, text::FORCE_NONE))
            .await
            .unwrap();

        let summary = f.messenger.last_text_to(&owner_chat()).unwrap();
        let id = session_id_from(&summary);
        assert!(summary.contains(&format!("Deep-link: https://t.me/vault_bot?start={id}")));
        assert!(summary.contains("Files saved: 2"));
        assert!(summary.contains("Expires in minutes: 15 (0 = never)"));
        assert!(summary.contains("Protect content: ON"));
        assert!(summary.ends_with("Force join channel: None"));
        assert!(f.flow.phase(OWNER).is_none());

        let session = f.store.session(&id).unwrap().unwrap();
        assert!(session.protect_content);
        assert_eq!(session.auto_delete, AutoDelete::try_new(15).unwrap());
        assert!(session.expires_at.is_some());

        let files = f.store.files(&id).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].kind, Some(FileKind::Video));
        assert_eq!(files[0].file_id.as_deref(), Some("vid"));
        assert_eq!(files[0].caption.as_deref(), Some("clip"));
        assert_eq!(files[1].kind, Some(FileKind::Document));
        assert!(files[1].file_id.as_deref().unwrap().starts_with("doc-"));

        let sent = f.messenger.sent();
        assert!(sent.contains(&Sent::Copied {
            to: UPLOADS,
            from: owner_chat(),
            message_id: 2,
            protect_content: false,
        }));
        assert!(sent.iter().any(|s| matches!(
            s,
            Sent::Document { chat, source: DocumentSource::Memory { file_name, bytes }, caption }
                if *chat == UPLOADS
                    && file_name.starts_with(&format!("session_{id}_text_"))
                    && file_name.ends_with(".txt")
                    && bytes == b"read me"
                    && caption.as_deref() == Some(text::TEXT_FILE_CAPTION)
        )));
        assert!(sent
            .iter()
            .any(|s| matches!(s, Sent::Pinned { chat, .. } if *chat == BACKUPS)));
    }

    #[tokio::test]
    async fn force_channel_is_asked_then_saved() {
        let f = fixture();
        f.flow.begin(OWNER, OWNER, false).await.unwrap();
        f.flow
            .handle_message(&media_message(OWNER, 2, FileKind::Photo, "p", None))
            .await
            .unwrap();
        walk_to_minutes(&f, text::PROTECT_OFF).await;
        f.flow
            .handle_message(&text_message(OWNER, 3, "0"))
            .await
            .unwrap();
        f.flow
            .handle_callback(&callback(OWNER, text::FORCE_SET))
            .await
            .unwrap();
        assert_eq!(
            f.messenger.last_text_to(&owner_chat()).unwrap(),
            text::ASK_FORCE_CHANNEL
        );

        f.flow
            .handle_message(&text_message(OWNER, 4, "@news"))
            .await
            .unwrap();

        let texts = f.messenger.texts_to(&owner_chat());
        assert!(texts.contains(&"Force join channel set to: @news\nFinalizing...".to_string()));
        let id = session_id_from(texts.last().unwrap());
        let session = f.store.session(&id).unwrap().unwrap();
        assert_eq!(session.force_join_channel, ForceChannel::from_input("@news"));
        assert!(session.expires_at.is_none());
    }

    #[tokio::test]
    async fn disable_keyword_means_no_force_channel() {
        let f = fixture();
        f.flow.begin(OWNER, OWNER, false).await.unwrap();
        walk_to_minutes(&f, text::PROTECT_OFF).await;
        f.flow
            .handle_message(&text_message(OWNER, 3, "0"))
            .await
            .unwrap();
        f.flow
            .handle_callback(&callback(OWNER, text::FORCE_SET))
            .await
            .unwrap();
        f.flow
            .handle_message(&text_message(OWNER, 4, "Off"))
            .await
            .unwrap();

        let texts = f.messenger.texts_to(&owner_chat());
        assert!(texts.contains(&text::FORCE_OFF_FINALIZING.to_string()));
        assert!(texts.last().unwrap().ends_with("Force join channel: None"));
    }

    #[tokio::test]
    async fn copy_failures_are_not_counted() {
        let f = fixture();
        f.messenger.fail_copies();
        f.flow.begin(OWNER, OWNER, false).await.unwrap();
        f.flow
            .handle_message(&media_message(OWNER, 2, FileKind::Audio, "a", None))
            .await
            .unwrap();
        walk_to_minutes(&f, text::PROTECT_OFF).await;
        f.flow
            .handle_message(&text_message(OWNER, 3, "0"))
            .await
            .unwrap();
        f.flow
            .handle_callback(&callback(OWNER, text::FORCE_NONE))
            .await
            .unwrap();

        let summary = f.messenger.last_text_to(&owner_chat()).unwrap();
        assert!(summary.contains("Files saved: 0"));
    }

    #[tokio::test]
    async fn username_failure_uses_fallback_link() {
        let f = fixture();
        f.messenger.set_username(None);
        f.flow.begin(OWNER, OWNER, false).await.unwrap();
        walk_to_minutes(&f, text::PROTECT_OFF).await;
        f.flow
            .handle_message(&text_message(OWNER, 3, "0"))
            .await
            .unwrap();
        f.flow
            .handle_callback(&callback(OWNER, text::FORCE_NONE))
            .await
            .unwrap();

        let summary = f.messenger.last_text_to(&owner_chat()).unwrap();
        assert!(summary.contains("https://t.me/this_bot?start="));
    }

    #[tokio::test]
    async fn callbacks_without_staging_report_loss() {
        let f = fixture();
        f.flow
            .handle_callback(&callback(OWNER, text::PROTECT_ON))
            .await
            .unwrap();

        assert_eq!(
            f.messenger.last_text_to(&owner_chat()).unwrap(),
            text::STAGING_LOST
        );
        assert!(f.messenger.sent().contains(&Sent::Answered {
            callback_id: format!("cb-{}", text::PROTECT_ON),
            text: None
        }));
    }

    #[tokio::test]
    async fn stale_buttons_get_a_toast() {
        let f = fixture();
        f.flow.begin(OWNER, OWNER, false).await.unwrap();
        f.flow
            .handle_callback(&callback(OWNER, text::FORCE_NONE))
            .await
            .unwrap();

        assert!(f.messenger.sent().contains(&Sent::Answered {
            callback_id: format!("cb-{}", text::FORCE_NONE),
            text: Some(text::STALE_CHOICE.to_string())
        }));
        assert_eq!(f.flow.phase(OWNER), Some(StagingPhase::Collecting));
    }

    #[tokio::test]
    async fn text_while_waiting_for_buttons_gets_a_hint() {
        let f = fixture();
        f.flow.begin(OWNER, OWNER, false).await.unwrap();
        f.flow.request_finalize(OWNER, OWNER).await.unwrap();
        f.flow
            .handle_message(&text_message(OWNER, 5, "yes"))
            .await
            .unwrap();

        assert_eq!(
            f.messenger.last_text_to(&owner_chat()).unwrap(),
            text::USE_BUTTONS
        );
    }
}
