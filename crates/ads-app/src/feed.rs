//! # Ad Feed Controller
//!
//! Owns the listing collection and its loading/error state. The visible list
//! is only replaced by a successful, current refresh; while loading or after
//! a failure the previous list stays visible.

use std::sync::Arc;

use ads_core::{Ad, AdRepo};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument};

use crate::age;
use crate::scope::TaskScope;

/// Shown instead of the raw repository error.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load ads";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedPhase {
    Idle,
    Loading,
    Loaded,
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    pub phase: FeedPhase,
    pub ads: Vec<Ad>,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            phase: FeedPhase::Idle,
            ads: Vec::new(),
        }
    }
}

impl FeedState {
    pub fn is_loading(&self) -> bool {
        self.phase == FeedPhase::Loading
    }

    /// The banner message of a failed refresh.
    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            FeedPhase::Failed { message } => Some(message),
            _ => None,
        }
    }

    /// A successful load that returned no ads (the explicit empty state).
    pub fn is_empty(&self) -> bool {
        self.phase == FeedPhase::Loaded && self.ads.is_empty()
    }

    /// "1 ad" / "{n} ads".
    pub fn count_label(&self) -> String {
        match self.ads.len() {
            1 => "1 ad".to_string(),
            n => format!("{n} ads"),
        }
    }
}

pub struct FeedController {
    repo: Arc<dyn AdRepo>,
    state: watch::Sender<FeedState>,
    scope: TaskScope,
}

impl FeedController {
    pub fn new(repo: Arc<dyn AdRepo>) -> Self {
        Self {
            repo,
            state: watch::Sender::new(FeedState::default()),
            scope: TaskScope::new(),
        }
    }

    pub fn state(&self) -> FeedState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    /// Initial load when the feed is first shown.
    pub async fn mount(&self) {
        self.refresh().await;
    }

    /// Re-fetches every ad. Errors land in the state, never in the caller.
    #[instrument(skip(self))]
    pub async fn refresh(&self) {
        if self.scope.is_disposed() {
            return;
        }
        let ticket = self.scope.issue();
        self.state.send_modify(|state| state.phase = FeedPhase::Loading);

        let Ok(result) = self.scope.run(self.repo.list_all()).await else {
            debug!("feed disposed during refresh");
            return;
        };
        if !self.scope.is_current(ticket) {
            debug!(?ticket, "discarding stale feed response");
            return;
        }

        match result {
            Ok(ads) => {
                info!(count = ads.len(), "feed loaded");
                self.state.send_modify(|state| {
                    state.phase = FeedPhase::Loaded;
                    state.ads = ads;
                });
            }
            Err(e) => {
                error!(error = %e, "error loading ads");
                self.state.send_modify(|state| {
                    state.phase = FeedPhase::Failed {
                        message: LOAD_FAILED_MESSAGE.to_string(),
                    };
                });
            }
        }
    }

    /// "now", "5m ago", ... relative to the wall clock at call time.
    pub fn format_relative_age(&self, created_at: DateTime<Utc>) -> String {
        age::format_relative_age(created_at)
    }

    pub fn dispose(&self) {
        self.scope.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_ad, GatedRepo};
    use ads_core::{AppError, MockAdRepo};
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_starts_idle_and_loads_on_mount() {
        let mut repo = MockAdRepo::new();
        repo.expect_list_all()
            .times(1)
            .returning(|| Ok(vec![sample_ad("a1"), sample_ad("a2")]));

        let feed = FeedController::new(Arc::new(repo));
        assert_eq!(feed.state().phase, FeedPhase::Idle);

        feed.mount().await;
        let state = feed.state();
        assert_eq!(state.phase, FeedPhase::Loaded);
        assert_eq!(state.ads.len(), 2);
        assert_eq!(state.count_label(), "2 ads");
    }

    #[tokio::test]
    async fn test_empty_list_is_loaded_not_failed() {
        let mut repo = MockAdRepo::new();
        repo.expect_list_all().returning(|| Ok(vec![]));

        let feed = FeedController::new(Arc::new(repo));
        feed.refresh().await;

        let state = feed.state();
        assert!(state.is_empty());
        assert_eq!(state.error(), None);
        assert_eq!(state.count_label(), "0 ads");
    }

    #[tokio::test]
    async fn test_failure_keeps_stale_list_and_retry_clears_it() {
        let mut repo = MockAdRepo::new();
        let mut calls = 0;
        repo.expect_list_all().times(3).returning(move || {
            calls += 1;
            match calls {
                1 => Ok(vec![sample_ad("a1")]),
                2 => Err(AppError::FetchFailed("socket closed by peer".into())),
                _ => Ok(vec![sample_ad("a2"), sample_ad("a3")]),
            }
        });

        let feed = FeedController::new(Arc::new(repo));
        feed.refresh().await;
        feed.refresh().await;

        let failed = feed.state();
        assert_eq!(failed.error(), Some(LOAD_FAILED_MESSAGE));
        assert_eq!(failed.ads, vec![sample_ad("a1")]);
        assert_eq!(failed.count_label(), "1 ad");

        feed.refresh().await;
        let recovered = feed.state();
        assert_eq!(recovered.phase, FeedPhase::Loaded);
        assert_eq!(recovered.error(), None);
        assert_eq!(recovered.ads, vec![sample_ad("a2"), sample_ad("a3")]);
    }

    #[tokio::test]
    async fn test_loading_is_observable_and_list_is_kept() {
        let repo = Arc::new(GatedRepo::default());
        let first = repo.gate_list();
        let second = repo.gate_list();
        let feed = FeedController::new(repo);

        first.send(Ok(vec![sample_ad("a1")])).unwrap();
        feed.refresh().await;

        let mut rx = feed.subscribe();
        tokio::join!(feed.refresh(), async {
            rx.changed().await.unwrap();
            let state = rx.borrow_and_update().clone();
            assert!(state.is_loading());
            assert_eq!(state.ads, vec![sample_ad("a1")]);
            second.send(Ok(vec![])).unwrap();
        });

        assert!(feed.state().is_empty());
    }

    #[tokio::test]
    async fn test_latest_refresh_wins_over_stale_response() {
        let repo = Arc::new(GatedRepo::default());
        let older = repo.gate_list();
        let newer = repo.gate_list();
        let feed = FeedController::new(repo);

        let release = async {
            tokio::task::yield_now().await;
            newer.send(Ok(vec![sample_ad("new")])).unwrap();
            tokio::task::yield_now().await;
            older
                .send(Err(AppError::FetchFailed("late failure".into())))
                .unwrap();
        };
        tokio::join!(feed.refresh(), feed.refresh(), release);

        let state = feed.state();
        assert_eq!(state.phase, FeedPhase::Loaded);
        assert_eq!(state.ads, vec![sample_ad("new")]);
    }

    #[tokio::test]
    async fn test_no_update_after_dispose() {
        let repo = Arc::new(GatedRepo::default());
        let pending: oneshot::Sender<_> = repo.gate_list();
        let feed = FeedController::new(repo);

        tokio::join!(feed.refresh(), async {
            tokio::task::yield_now().await;
            feed.dispose();
        });
        assert!(pending.send(Ok(vec![sample_ad("late")])).is_err());

        feed.refresh().await;
        let state = feed.state();
        assert_eq!(state.phase, FeedPhase::Loading);
        assert!(state.ads.is_empty());
    }

    #[test]
    fn test_format_relative_age_uses_wall_clock() {
        let feed = FeedController::new(Arc::new(MockAdRepo::new()));
        let label = feed.format_relative_age(Utc::now() - chrono::Duration::minutes(5));
        assert!(label == "5m ago" || label == "4m ago", "got {label}");
        assert_eq!(feed.format_relative_age(Utc::now()), "now");
    }
}
