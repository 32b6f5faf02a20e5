//! # AppError
//!
//! Centralized error handling for the Rusty-Ads ecosystem.
//! Every variant carries a message that is safe to show to a user; raw
//! backend errors are logged by the component that normalizes them.

use thiserror::Error;

/// The primary error type for all ads operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// A required form field is missing or out of policy. No I/O was attempted.
    #[error("validation error: {0}")]
    ValidationFailed(String),

    /// Reading ads from the backend failed.
    #[error("fetch failed: {0}")]
    FetchFailed(String),

    /// Writing a new ad to the backend failed.
    #[error("create failed: {0}")]
    CreateFailed(String),

    /// Patching an existing ad failed.
    #[error("update failed: {0}")]
    UpdateFailed(String),

    /// Resolving or transferring media failed.
    #[error("upload failed: {0}")]
    UploadFailed(String),

    /// The backend returned a payload that does not match the expected record.
    #[error("decode failed: {0}")]
    DecodeFailed(String),

    /// The author's profile could not be loaded.
    #[error("profile load failed: {0}")]
    ProfileLoadFailed(String),

    /// The author's profile has not resolved yet.
    #[error("profile is still loading")]
    ProfilePending,

    /// The chat subsystem refused or failed to create a chat.
    #[error("chat create failed: {0}")]
    ChatCreateFailed(String),

    /// No authenticated user is available.
    #[error("unauthenticated")]
    Unauthenticated,

    /// The owning controller was disposed before the operation completed.
    #[error("controller disposed")]
    Disposed,
}

impl AppError {
    /// The user-facing message without the kind prefix.
    pub fn message(&self) -> String {
        match self {
            Self::ValidationFailed(msg)
            | Self::FetchFailed(msg)
            | Self::CreateFailed(msg)
            | Self::UpdateFailed(msg)
            | Self::UploadFailed(msg)
            | Self::DecodeFailed(msg)
            | Self::ProfileLoadFailed(msg)
            | Self::ChatCreateFailed(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// A specialized Result type for Rusty-Ads logic.
pub type Result<T> = std::result::Result<T, AppError>;
