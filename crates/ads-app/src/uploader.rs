//! # Media Uploader
//!
//! Picks a local media item, resolves its bytes and hands them to the blob
//! store under the file's base name. One upload is in flight at a time.

use std::sync::Arc;

use ads_core::{
    AppError, BlobStore, DurableMediaRef, LocalMediaRef, MediaPicker, MediaSource, Result,
};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::scope::TaskScope;

/// Observable uploader state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadState {
    /// The local item waiting to be uploaded. Kept on failure so the caller can retry.
    pub selected: Option<LocalMediaRef>,
    /// Durable reference of the last successful upload.
    pub uploaded: Option<DurableMediaRef>,
    pub is_uploading: bool,
    pub last_error: Option<AppError>,
}

pub struct MediaUploader {
    picker: Arc<dyn MediaPicker>,
    source: Arc<dyn MediaSource>,
    blobs: Arc<dyn BlobStore>,
    state: watch::Sender<UploadState>,
    scope: TaskScope,
}

impl MediaUploader {
    pub fn new(
        picker: Arc<dyn MediaPicker>,
        source: Arc<dyn MediaSource>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            picker,
            source,
            blobs,
            state: watch::Sender::new(UploadState::default()),
            scope: TaskScope::new(),
        }
    }

    /// Ties this uploader's lifetime to an owning controller's scope.
    pub(crate) fn attach(&mut self, scope: TaskScope) {
        self.scope = scope;
    }

    pub fn state(&self) -> UploadState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UploadState> {
        self.state.subscribe()
    }

    /// Asks the user for a media item. `Ok(None)` means they cancelled.
    #[instrument(skip(self))]
    pub async fn pick(&self) -> Result<Option<LocalMediaRef>> {
        let picked = self.scope.run(self.picker.pick()).await?.map_err(|e| {
            warn!(error = %e, "media picker failed");
            AppError::UploadFailed("Could not open the media library".into())
        })?;

        if let Some(media) = &picked {
            self.state.send_modify(|state| {
                state.selected = Some(media.clone());
                state.uploaded = None;
                state.last_error = None;
            });
        }
        Ok(picked)
    }

    /// Uploads the selected item and returns its durable reference.
    #[instrument(skip(self))]
    pub async fn upload(&self) -> Result<DurableMediaRef> {
        let media = self
            .state
            .borrow()
            .selected
            .clone()
            .ok_or_else(|| AppError::ValidationFailed("No media selected".into()))?;

        let started = self.state.send_if_modified(|state| {
            if state.is_uploading {
                return false;
            }
            state.is_uploading = true;
            state.last_error = None;
            true
        });
        if !started {
            return Err(AppError::UploadFailed("An upload is already in progress".into()));
        }

        match self.scope.run(self.transfer(&media)).await? {
            Ok(url) => {
                info!(media = %media, url = %url, "media uploaded");
                self.state.send_modify(|state| {
                    state.is_uploading = false;
                    if state.selected.as_ref() == Some(&media) {
                        state.selected = None;
                        state.uploaded = Some(url.clone());
                    } else {
                        // A pick during the transfer replaced this media.
                        debug!(url = %url, "selection changed during upload; not keeping it");
                    }
                });
                Ok(url)
            }
            Err(e) => {
                self.state.send_modify(|state| {
                    state.is_uploading = false;
                    state.last_error = Some(e.clone());
                });
                Err(e)
            }
        }
    }

    /// Forgets `url` once an ad has been created with it, so it is attached
    /// at most once.
    pub(crate) fn consume_uploaded(&self, url: &DurableMediaRef) {
        self.state.send_if_modified(|state| {
            if state.uploaded.as_ref() != Some(url) {
                return false;
            }
            state.uploaded = None;
            true
        });
    }

    async fn transfer(&self, media: &LocalMediaRef) -> Result<DurableMediaRef> {
        let name = media.base_name();
        if name.is_empty() {
            return Err(AppError::UploadFailed("The selected media has no file name".into()));
        }

        let data = self.source.read(media).await.map_err(|e| {
            error!(media = %media, error = %e, "failed to read local media");
            AppError::UploadFailed("Could not read the selected media".into())
        })?;

        self.blobs.put(name, data).await.map_err(|e| {
            error!(media = %media, error = %e, "blob store rejected upload");
            AppError::UploadFailed("Failed to upload media".into())
        })
    }

    pub fn dispose(&self) {
        self.scope.dispose();
    }
}
