//! # Core Traits (Ports)
//!
//! Backends and collaborators implement these traits; controllers only ever
//! see them as `Arc<dyn Trait>`.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::{
    AdId, Ad, ChatId, DurableMediaRef, LocalMediaRef, NewAd, UserId, UserProfile,
};

/// Collection holding ad documents.
pub const ADS_COLLECTION: &str = "ads";
/// Collection holding user profile documents, keyed by user id.
pub const USERS_COLLECTION: &str = "users";

/// A raw document as returned by the backing store.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Backend-assigned identifier.
    pub id: String,
    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,
    /// The document's fields, exactly as stored.
    pub body: serde_json::Value,
}

/// Generic document persistence contract.
///
/// The backend assigns `id` and `created_at` on `create`; callers never
/// supply either.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create(&self, collection: &str, body: serde_json::Value) -> anyhow::Result<String>;
    async fn get(&self, collection: &str, id: &str) -> anyhow::Result<Option<Document>>;
    async fn list(&self, collection: &str) -> anyhow::Result<Vec<Document>>;
    /// Merges the top-level fields of `patch` into an existing document.
    async fn update(&self, collection: &str, id: &str, patch: serde_json::Value) -> anyhow::Result<()>;
}

/// Typed ad persistence contract. Failures are already normalized.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AdRepo: Send + Sync {
    async fn create(&self, ad: NewAd) -> Result<AdId>;
    async fn list_all(&self) -> Result<Vec<Ad>>;
    async fn get_by_id(&self, id: &AdId) -> Result<Option<Ad>>;
    async fn get_user_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>>;
    async fn update_title(&self, id: &AdId, title: &str) -> Result<()>;
    async fn update_description(&self, id: &AdId, description: &str) -> Result<()>;
}

/// Blob storage contract for uploaded media.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `data` under `name` and returns its public URL.
    async fn put(&self, name: &str, data: Bytes) -> anyhow::Result<DurableMediaRef>;
}

/// Resolves a local media reference to its binary content.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn read(&self, media: &LocalMediaRef) -> anyhow::Result<Bytes>;
}

/// Lets the user choose a local media item.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MediaPicker: Send + Sync {
    /// `Ok(None)` means the user cancelled the selection.
    async fn pick(&self) -> anyhow::Result<Option<LocalMediaRef>>;
}

/// Chat subsystem contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Creates (or reuses) a direct chat between the current user and `participant`.
    async fn create_chat(&self, participant: &UserId) -> anyhow::Result<ChatId>;
}

/// Supplies the current authenticated user.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<UserId>;
}

/// An identity provider that always reports the same user (or nobody).
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(Option<UserId>);

impl StaticIdentity {
    pub fn signed_in(user: impl Into<UserId>) -> Self {
        Self(Some(user.into()))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<UserId> {
        self.0.clone()
    }
}

/// Returns the current user or fails with `Unauthenticated`.
///
/// An empty identifier counts as absent.
pub fn require_user(identity: &dyn IdentityProvider) -> Result<UserId> {
    identity
        .current_user()
        .filter(|user| !user.is_empty())
        .ok_or(AppError::Unauthenticated)
}
