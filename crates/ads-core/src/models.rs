//! # Domain Models
//!
//! These structs represent the core entities of Rusty-Ads.
//! Identifiers are assigned by the backend and carried as opaque strings.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Country stamped on every ad in the current market.
pub const DEFAULT_COUNTRY: &str = "Iraq";

/// Listing policy limits, counted in characters (not bytes).
pub const MAX_TITLE_CHARS: usize = 50;
pub const MAX_DESCRIPTION_CHARS: usize = 500;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Backend-assigned ad identifier.
    AdId
);
string_id!(
    /// Identifier of a user in the profile store.
    UserId
);
string_id!(
    /// Identifier of a chat handed back by the chat subsystem.
    ChatId
);
string_id!(
    /// A durable, backend-hosted address (URL) for uploaded media.
    DurableMediaRef
);
string_id!(
    /// An ephemeral reference to media on the local device (path or `file://` URI).
    LocalMediaRef
);

impl LocalMediaRef {
    /// The file's base name, i.e. everything after the last `/`.
    pub fn base_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }
}

macro_rules! closed_enum {
    ($(#[$meta:meta])* $name:ident, $label:literal { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every option, in the order a form should offer them.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(AppError::ValidationFailed(format!(
                        "unknown {}: {other}",
                        $label
                    ))),
                }
            }
        }
    };
}

closed_enum!(
    /// Listing category ("className" on the wire).
    AdCategory, "category" {
        RealEstate => "Real estate",
        WorkAndBusiness => "Work and business",
        MobileAndComputer => "Mobile and computer",
    }
);

closed_enum!(
    /// Whether the author is selling or looking to buy ("typeName" on the wire).
    AdType, "type" {
        Sale => "sale",
        Buy => "buy",
    }
);

closed_enum!(
    /// Cities served in the current market.
    City, "city" {
        Bagdad => "Bagdad",
        Babylon => "Babylon",
        Karbala => "Karbala",
    }
);

/// A persisted listing. `id` and `created_at` are assigned once by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ad {
    pub id: AdId,
    pub title: String,
    pub description: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub class_name: AdCategory,
    pub type_name: AdType,
    pub country: String,
    pub city: City,
    /// Durable reference of media uploaded alongside the ad, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<DurableMediaRef>,
}

impl Ad {
    /// The first `max_chars` characters of the description, for list rows.
    pub fn preview(&self, max_chars: usize) -> &str {
        match self.description.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.description[..idx],
            None => &self.description,
        }
    }
}

/// An ad that has not been persisted yet (no identity, no timestamp).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAd {
    pub title: String,
    pub description: String,
    pub created_by: UserId,
    pub class_name: AdCategory,
    pub type_name: AdType,
    pub country: String,
    pub city: City,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<DurableMediaRef>,
}

/// Read-only identity and display record owned by the profile subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub display_name: Option<String>,
}

impl UserProfile {
    /// Name to show next to a listing.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

/// A chat the viewer can navigate into, together with the other participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub chat_id: ChatId,
    pub other_user: UserProfile,
}
