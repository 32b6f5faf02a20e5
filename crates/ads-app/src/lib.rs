//! # ads-app
//!
//! Orchestration layer for Rusty-Ads: the feed, creation and detail
//! controllers plus the media uploader and repository adapter they share.
//!
//! Controllers publish their state through `tokio::sync::watch` channels and
//! never update it after `dispose`.

pub mod age;
pub mod context;
pub mod creation;
pub mod detail;
pub mod feed;
pub mod repository;
pub mod scope;
pub mod uploader;

pub use age::{format_relative_age, format_relative_age_at};
pub use context::AdsContext;
pub use creation::{AdForm, CreationController, CreationState};
pub use detail::{DetailController, DetailState};
pub use feed::{FeedController, FeedPhase, FeedState};
pub use repository::DocumentAdRepo;
pub use scope::{TaskScope, Ticket};
pub use uploader::{MediaUploader, UploadState};
