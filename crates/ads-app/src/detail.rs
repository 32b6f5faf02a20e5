//! # Ad Detail Orchestrator
//!
//! Resolves the author's profile for one ad and starts a direct chat with
//! them. The chat collaborator is only ever called with a resolved profile.
//! Anonymous viewers can read the ad and its author but cannot message.

use std::sync::Arc;

use ads_core::{Ad, AdRepo, AppError, ChatService, Conversation, Result, UserId, UserProfile};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::age;
use crate::scope::TaskScope;

pub const PROFILE_LOAD_FAILED_MESSAGE: &str = "Failed to load user";
pub const PROFILE_NOT_FOUND_MESSAGE: &str = "User not found";
pub const CHAT_CREATE_FAILED_MESSAGE: &str = "Failed to start chat. Please try again.";

/// Observable detail state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailState {
    pub profile: Option<UserProfile>,
    pub is_loading_profile: bool,
    pub profile_error: Option<AppError>,
    pub is_starting_chat: bool,
    pub chat_error: Option<AppError>,
}

pub struct DetailController {
    ad: Ad,
    viewer: Option<UserId>,
    repo: Arc<dyn AdRepo>,
    chat: Arc<dyn ChatService>,
    state: watch::Sender<DetailState>,
    scope: TaskScope,
    chat_scope: TaskScope,
}

impl DetailController {
    pub fn new(
        ad: Ad,
        viewer: Option<UserId>,
        repo: Arc<dyn AdRepo>,
        chat: Arc<dyn ChatService>,
    ) -> Self {
        let scope = TaskScope::new();
        let chat_scope = scope.child();
        Self {
            ad,
            viewer,
            repo,
            chat,
            state: watch::Sender::new(DetailState::default()),
            scope,
            chat_scope,
        }
    }

    pub fn ad(&self) -> &Ad {
        &self.ad
    }

    pub fn state(&self) -> DetailState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }

    /// Relative age of the ad, e.g. "3d ago".
    pub fn posted_label(&self) -> String {
        age::format_relative_age(self.ad.created_at)
    }

    pub fn is_own_ad(&self) -> bool {
        self.viewer.as_ref() == Some(&self.ad.created_by)
    }

    /// Whether the "message" affordance should be offered.
    pub fn can_message(&self) -> bool {
        self.viewer.is_some() && self.state.borrow().profile.is_some() && !self.is_own_ad()
    }

    pub async fn mount(&self) {
        self.load_profile().await;
    }

    /// Looks up the ad author's profile. Failures are non-fatal and land in
    /// `profile_error`.
    #[instrument(skip(self), fields(author = %self.ad.created_by))]
    pub async fn load_profile(&self) {
        if self.scope.is_disposed() {
            return;
        }
        let ticket = self.scope.issue();
        self.state.send_modify(|state| {
            state.is_loading_profile = true;
            state.profile_error = None;
        });

        let Ok(result) = self
            .scope
            .run(self.repo.get_user_profile(&self.ad.created_by))
            .await
        else {
            debug!("detail disposed during profile lookup");
            return;
        };
        if !self.scope.is_current(ticket) {
            debug!(?ticket, "discarding stale profile response");
            return;
        }

        let outcome = match result {
            Ok(Some(profile)) => Ok(profile),
            Ok(None) => {
                warn!("ad author has no profile");
                Err(AppError::ProfileLoadFailed(PROFILE_NOT_FOUND_MESSAGE.into()))
            }
            Err(e) => {
                error!(error = %e, "error loading user");
                Err(AppError::ProfileLoadFailed(PROFILE_LOAD_FAILED_MESSAGE.into()))
            }
        };

        self.state.send_modify(|state| {
            state.is_loading_profile = false;
            match outcome {
                Ok(profile) => state.profile = Some(profile),
                Err(e) => state.profile_error = Some(e),
            }
        });
    }

    /// Creates a chat with the ad's author and returns where to navigate.
    ///
    /// Rejected with `ProfilePending` (or the lookup's `ProfileLoadFailed`)
    /// until the profile has resolved, and with `Unauthenticated` when nobody
    /// is signed in; the chat collaborator is not called.
    #[instrument(skip(self), fields(author = %self.ad.created_by))]
    pub async fn start_conversation(&self) -> Result<Conversation> {
        if self.chat_scope.is_disposed() {
            return Err(AppError::Disposed);
        }

        let Some(viewer) = &self.viewer else {
            return Err(AppError::Unauthenticated);
        };
        let profile = {
            let state = self.state.borrow();
            match (&state.profile, &state.profile_error) {
                (Some(profile), _) => profile.clone(),
                (None, Some(err)) => return Err(err.clone()),
                (None, None) => return Err(AppError::ProfilePending),
            }
        };
        if &profile.id == viewer {
            return Err(AppError::ValidationFailed(
                "You cannot start a conversation with yourself".into(),
            ));
        }

        let ticket = self.chat_scope.issue();
        self.state.send_modify(|state| {
            state.is_starting_chat = true;
            state.chat_error = None;
        });

        let result = self
            .chat_scope
            .run(self.chat.create_chat(&profile.id))
            .await?;
        let current = self.chat_scope.is_current(ticket);

        let outcome = match result {
            Ok(chat_id) if !chat_id.is_empty() => {
                info!(chat_id = %chat_id, "conversation started");
                Ok(Conversation {
                    chat_id,
                    other_user: profile,
                })
            }
            Ok(_) => {
                error!("chat service returned an empty chat id");
                Err(AppError::ChatCreateFailed(CHAT_CREATE_FAILED_MESSAGE.into()))
            }
            Err(e) => {
                error!(error = %e, "error creating chat");
                Err(AppError::ChatCreateFailed(CHAT_CREATE_FAILED_MESSAGE.into()))
            }
        };

        if current {
            self.state.send_modify(|state| {
                state.is_starting_chat = false;
                state.chat_error = outcome.as_ref().err().cloned();
            });
        }
        outcome
    }

    pub fn dispose(&self) {
        self.scope.dispose();
    }
}
