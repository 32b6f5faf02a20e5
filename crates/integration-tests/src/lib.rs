//! Shared fixtures for the end-to-end tests: an in-memory SQLite store, a
//! temporary upload directory and scriptable picker/chat fakes, wired into an
//! `AdsContext` the same way the binary wires it.

use std::sync::Arc;

use ads_app::{AdForm, AdsContext, DocumentAdRepo};
use ads_core::{
    ChatId, ChatService, LocalMediaRef, MediaPicker, StaticIdentity, UserId, USERS_COLLECTION,
};
use ads_db_sqlite::SqliteDocumentStore;
use ads_storage_local::{FsMediaSource, LocalBlobStore};
use async_trait::async_trait;
use serde_json::json;
use tempfile::TempDir;
use tokio::sync::Mutex;

pub const MEDIA_URL_PREFIX: &str = "/static/uploads";

/// Hands out whatever media the test offered last, once.
#[derive(Default)]
pub struct ScriptedPicker {
    next: Mutex<Option<LocalMediaRef>>,
}

impl ScriptedPicker {
    pub async fn offer(&self, media: impl Into<LocalMediaRef>) {
        *self.next.lock().await = Some(media.into());
    }
}

#[async_trait]
impl MediaPicker for ScriptedPicker {
    async fn pick(&self) -> anyhow::Result<Option<LocalMediaRef>> {
        Ok(self.next.lock().await.take())
    }
}

/// Records every participant it is asked to chat with.
#[derive(Default)]
pub struct RecordingChat {
    participants: Mutex<Vec<UserId>>,
}

impl RecordingChat {
    pub async fn participants(&self) -> Vec<UserId> {
        self.participants.lock().await.clone()
    }
}

#[async_trait]
impl ChatService for RecordingChat {
    async fn create_chat(&self, participant: &UserId) -> anyhow::Result<ChatId> {
        self.participants.lock().await.push(participant.clone());
        Ok(ChatId::new(format!("chat-{participant}")))
    }
}

pub struct Harness {
    pub store: Arc<SqliteDocumentStore>,
    pub picker: Arc<ScriptedPicker>,
    pub chat: Arc<RecordingChat>,
    pub ctx: AdsContext,
    /// Scratch space: `uploads/` is the blob root, anything else is "device" media.
    pub dir: TempDir,
}

impl Harness {
    /// A fresh environment with `user` signed in (or nobody).
    pub async fn new(user: Option<&str>) -> anyhow::Result<Self> {
        let store = Arc::new(SqliteDocumentStore::new("sqlite::memory:").await?);
        let dir = tempfile::tempdir()?;
        let picker = Arc::new(ScriptedPicker::default());
        let chat = Arc::new(RecordingChat::default());
        let identity = match user {
            Some(user) => StaticIdentity::signed_in(user),
            None => StaticIdentity::anonymous(),
        };

        let ctx = AdsContext::new(
            Arc::new(DocumentAdRepo::new(store.clone())),
            picker.clone(),
            Arc::new(FsMediaSource),
            Arc::new(LocalBlobStore::new(dir.path().join("uploads"), MEDIA_URL_PREFIX)),
            chat.clone(),
            Arc::new(identity),
        );

        Ok(Self {
            store,
            picker,
            chat,
            ctx,
            dir,
        })
    }

    /// Stores a profile the way the profile subsystem would.
    pub async fn add_user(&self, id: &str, username: &str) -> anyhow::Result<()> {
        self.store
            .put(USERS_COLLECTION, id, json!({ "username": username }))
            .await
    }

    /// Writes a file into the scratch dir and returns it as a `file://` reference.
    pub fn device_file(&self, name: &str, contents: &[u8]) -> anyhow::Result<LocalMediaRef> {
        let path = self.dir.path().join("device").join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, contents)?;
        Ok(LocalMediaRef::new(format!("file://{}", path.display())))
    }
}

/// The canonical listing used across the lifecycle tests.
pub fn car_form() -> AdForm {
    AdForm {
        title: "Car".into(),
        description: "Good condition".into(),
        category: "Work and business".into(),
        ad_type: "sale".into(),
        city: "Bagdad".into(),
    }
}
