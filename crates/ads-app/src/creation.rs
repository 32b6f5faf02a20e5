//! # Ad Creation Controller
//!
//! Form state machine: validate → submit → success/failure. Composes the
//! media uploader with the repository; an upload never gates submission,
//! but a completed one is attached to the next created ad as `media_url`.

use std::sync::Arc;

use ads_core::{
    AdId, AdRepo, AppError, DurableMediaRef, LocalMediaRef, NewAd, Result, UserId,
    DEFAULT_COUNTRY, MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS,
};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::scope::TaskScope;
use crate::uploader::{MediaUploader, UploadState};

/// Fallback when the repository gives no usable message.
pub const CREATE_FAILED_MESSAGE: &str = "Failed to create ad. Please try again.";

/// Raw form input, as typed or selected by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdForm {
    pub title: String,
    pub description: String,
    pub category: String,
    pub ad_type: String,
    pub city: String,
}

impl AdForm {
    /// Validates the form and builds the draft to persist.
    ///
    /// All five fields are required after trimming; category, type and city
    /// must name one of their closed options.
    pub fn to_draft(
        &self,
        created_by: &UserId,
        country: &str,
        media_url: Option<DurableMediaRef>,
    ) -> Result<NewAd> {
        let title = self.title.trim();
        let description = self.description.trim();
        let category = self.category.trim();
        let ad_type = self.ad_type.trim();
        let city = self.city.trim();

        let missing: Vec<&str> = [
            ("title", title),
            ("description", description),
            ("category", category),
            ("type", ad_type),
            ("city", city),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();
        if !missing.is_empty() {
            return Err(AppError::ValidationFailed(format!(
                "Please enter all data for your ad (missing: {})",
                missing.join(", ")
            )));
        }

        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(AppError::ValidationFailed(format!(
                "Title must be at most {MAX_TITLE_CHARS} characters"
            )));
        }
        if description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(AppError::ValidationFailed(format!(
                "Description must be at most {MAX_DESCRIPTION_CHARS} characters"
            )));
        }

        Ok(NewAd {
            title: title.to_string(),
            description: description.to_string(),
            created_by: created_by.clone(),
            class_name: category.parse()?,
            type_name: ad_type.parse()?,
            country: country.to_string(),
            city: city.parse()?,
            media_url,
        })
    }
}

/// Observable creation state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreationState {
    pub form: AdForm,
    pub is_submitting: bool,
    pub last_error: Option<AppError>,
    pub last_created: Option<AdId>,
}

pub struct CreationController {
    repo: Arc<dyn AdRepo>,
    uploader: MediaUploader,
    user: UserId,
    country: String,
    state: watch::Sender<CreationState>,
    scope: TaskScope,
}

impl CreationController {
    pub fn new(repo: Arc<dyn AdRepo>, mut uploader: MediaUploader, user: UserId) -> Self {
        let scope = TaskScope::new();
        uploader.attach(scope.child());
        Self {
            repo,
            uploader,
            user,
            country: DEFAULT_COUNTRY.to_string(),
            state: watch::Sender::new(CreationState::default()),
            scope,
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn state(&self) -> CreationState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CreationState> {
        self.state.subscribe()
    }

    pub fn media_state(&self) -> UploadState {
        self.uploader.state()
    }

    pub fn update_form(&self, edit: impl FnOnce(&mut AdForm)) {
        self.state.send_modify(|state| edit(&mut state.form));
    }

    pub async fn pick_media(&self) -> Result<Option<LocalMediaRef>> {
        self.uploader.pick().await
    }

    pub async fn upload_media(&self) -> Result<DurableMediaRef> {
        self.uploader.upload().await
    }

    /// Validates and persists the form. Returns the new ad's id.
    ///
    /// Validation failures never reach the repository. Repository failures
    /// are normalized to `CreateFailed`, recorded in `last_error` and returned.
    #[instrument(skip(self), fields(user = %self.user))]
    pub async fn submit(&self) -> Result<AdId> {
        if self.scope.is_disposed() {
            return Err(AppError::Disposed);
        }

        let form = self.state.borrow().form.clone();
        let media = self.uploader.state();
        let attached = media.uploaded.clone();
        let draft = match form.to_draft(&self.user, &self.country, media.uploaded) {
            Ok(draft) => draft,
            Err(e) => {
                warn!(error = %e, "ad form rejected");
                self.state.send_modify(|state| state.last_error = Some(e.clone()));
                return Err(e);
            }
        };
        if media.selected.is_some() {
            debug!("selected media has not been uploaded; it will not be attached");
        }

        let ticket = self.scope.issue();
        self.state.send_modify(|state| {
            state.is_submitting = true;
            state.last_error = None;
        });

        let result = self.scope.run(self.repo.create(draft)).await?;
        let current = self.scope.is_current(ticket);
        if !current {
            debug!(?ticket, "submit superseded; leaving state to the latest submission");
        }

        match result {
            Ok(id) => {
                info!(ad_id = %id, "ad submitted");
                if current {
                    if let Some(url) = &attached {
                        self.uploader.consume_uploaded(url);
                    }
                    self.state.send_modify(|state| {
                        state.is_submitting = false;
                        state.last_created = Some(id.clone());
                    });
                }
                Ok(id)
            }
            Err(e) => {
                let err = match e {
                    AppError::CreateFailed(msg) if !msg.trim().is_empty() => {
                        AppError::CreateFailed(msg)
                    }
                    other => {
                        error!(error = %other, "unexpected create failure");
                        AppError::CreateFailed(CREATE_FAILED_MESSAGE.to_string())
                    }
                };
                if current {
                    self.state.send_modify(|state| {
                        state.is_submitting = false;
                        state.last_error = Some(err.clone());
                    });
                }
                Err(err)
            }
        }
    }

    /// Stops in-flight submissions and uploads from touching state.
    pub fn dispose(&self) {
        self.scope.dispose();
    }
}
