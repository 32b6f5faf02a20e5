//! Composition root: the collaborators every controller is built from.

use std::sync::Arc;

use ads_core::{
    require_user, Ad, AdRepo, BlobStore, ChatService, IdentityProvider, MediaPicker, MediaSource,
    Result, DEFAULT_COUNTRY,
};

use crate::creation::CreationController;
use crate::detail::DetailController;
use crate::feed::FeedController;
use crate::uploader::MediaUploader;

/// Shared handles injected into controllers. Cheap to clone.
#[derive(Clone)]
pub struct AdsContext {
    pub repo: Arc<dyn AdRepo>,
    pub picker: Arc<dyn MediaPicker>,
    pub source: Arc<dyn MediaSource>,
    pub blobs: Arc<dyn BlobStore>,
    pub chat: Arc<dyn ChatService>,
    pub identity: Arc<dyn IdentityProvider>,
    /// Country stamped on created ads.
    pub country: String,
}

impl AdsContext {
    pub fn new(
        repo: Arc<dyn AdRepo>,
        picker: Arc<dyn MediaPicker>,
        source: Arc<dyn MediaSource>,
        blobs: Arc<dyn BlobStore>,
        chat: Arc<dyn ChatService>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            repo,
            picker,
            source,
            blobs,
            chat,
            identity,
            country: DEFAULT_COUNTRY.to_string(),
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn feed(&self) -> FeedController {
        FeedController::new(self.repo.clone())
    }

    /// Fails with `Unauthenticated` when nobody is signed in.
    pub fn creation(&self) -> Result<CreationController> {
        let user = require_user(self.identity.as_ref())?;
        let uploader = MediaUploader::new(
            self.picker.clone(),
            self.source.clone(),
            self.blobs.clone(),
        );
        Ok(CreationController::new(self.repo.clone(), uploader, user).with_country(&self.country))
    }

    /// Open to anonymous viewers; messaging then fails with `Unauthenticated`.
    pub fn detail(&self, ad: Ad) -> DetailController {
        let viewer = require_user(self.identity.as_ref()).ok();
        DetailController::new(ad, viewer, self.repo.clone(), self.chat.clone())
    }
}
