//! # Ad Repository Adapter
//!
//! Maps the typed `AdRepo` contract onto a generic `DocumentStore`.
//! Pure boundary code: no retries, no caching. Payloads that do not match
//! the closed `Ad`/`UserProfile` records are rejected with `DecodeFailed`.

use std::sync::Arc;

use ads_core::{
    Ad, AdCategory, AdId, AdRepo, AdType, AppError, City, Document, DocumentStore,
    DurableMediaRef, NewAd, Result, UserId, UserProfile, ADS_COLLECTION, USERS_COLLECTION,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, instrument};

/// Ad fields as stored in a document body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdBody {
    title: String,
    description: String,
    created_by: UserId,
    class_name: AdCategory,
    type_name: AdType,
    country: String,
    city: City,
    #[serde(default)]
    media_url: Option<DurableMediaRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileBody {
    username: String,
    #[serde(default)]
    display_name: Option<String>,
}

fn decode_ad(doc: Document) -> Result<Ad> {
    if doc.id.trim().is_empty() {
        return Err(AppError::DecodeFailed("ad document without an id".into()));
    }
    let body: AdBody = serde_json::from_value(doc.body)
        .map_err(|e| AppError::DecodeFailed(format!("ad {}: {e}", doc.id)))?;

    Ok(Ad {
        id: AdId::new(doc.id),
        title: body.title,
        description: body.description,
        created_by: body.created_by,
        created_at: doc.created_at,
        class_name: body.class_name,
        type_name: body.type_name,
        country: body.country,
        city: body.city,
        media_url: body.media_url,
    })
}

fn decode_profile(doc: Document) -> Result<UserProfile> {
    let body: ProfileBody = serde_json::from_value(doc.body)
        .map_err(|e| AppError::DecodeFailed(format!("user {}: {e}", doc.id)))?;
    Ok(UserProfile {
        id: UserId::new(doc.id),
        username: body.username,
        display_name: body.display_name,
    })
}

pub struct DocumentAdRepo {
    store: Arc<dyn DocumentStore>,
}

impl DocumentAdRepo {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AdRepo for DocumentAdRepo {
    #[instrument(skip(self, ad), fields(created_by = %ad.created_by))]
    async fn create(&self, ad: NewAd) -> Result<AdId> {
        let body = serde_json::to_value(&ad)
            .map_err(|e| AppError::CreateFailed(format!("could not encode ad: {e}")))?;

        let id = self.store.create(ADS_COLLECTION, body).await.map_err(|e| {
            error!(error = %e, "ad write failed");
            AppError::CreateFailed("Failed to create ad".into())
        })?;

        if id.trim().is_empty() {
            error!("backend returned an empty ad id");
            return Err(AppError::CreateFailed("Failed to create ad".into()));
        }

        info!(ad_id = %id, "ad created");
        Ok(AdId::new(id))
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<Ad>> {
        let docs = self.store.list(ADS_COLLECTION).await.map_err(|e| {
            error!(error = %e, "ad listing failed");
            AppError::FetchFailed("Failed to load ads".into())
        })?;

        docs.into_iter().map(decode_ad).collect()
    }

    #[instrument(skip(self), fields(ad_id = %id))]
    async fn get_by_id(&self, id: &AdId) -> Result<Option<Ad>> {
        let doc = self.store.get(ADS_COLLECTION, id.as_str()).await.map_err(|e| {
            error!(error = %e, "ad lookup failed");
            AppError::FetchFailed("Failed to load ad".into())
        })?;

        doc.map(decode_ad).transpose()
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn get_user_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>> {
        let doc = self
            .store
            .get(USERS_COLLECTION, user_id.as_str())
            .await
            .map_err(|e| {
                error!(error = %e, "profile lookup failed");
                AppError::FetchFailed("Failed to load user".into())
            })?;

        doc.map(decode_profile).transpose()
    }

    #[instrument(skip(self, title), fields(ad_id = %id))]
    async fn update_title(&self, id: &AdId, title: &str) -> Result<()> {
        self.patch(id, json!({ "title": title })).await
    }

    #[instrument(skip(self, description), fields(ad_id = %id))]
    async fn update_description(&self, id: &AdId, description: &str) -> Result<()> {
        self.patch(id, json!({ "description": description })).await
    }
}

impl DocumentAdRepo {
    async fn patch(&self, id: &AdId, patch: serde_json::Value) -> Result<()> {
        self.store
            .update(ADS_COLLECTION, id.as_str(), patch)
            .await
            .map_err(|e| {
                error!(error = %e, "ad update failed");
                AppError::UpdateFailed("Failed to update ad".into())
            })
    }
}
