//! # ads-core
//!
//! Everything the Rusty-Ads controllers and backends agree on: ad records
//! and their closed option sets (`models`), the storage, media, chat and
//! identity ports (`traits`) and the shared `AppError`.

pub mod error;
pub mod models;
pub mod traits;

pub use error::*;
pub use models::*;
pub use traits::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_enums_use_wire_names() {
        assert_eq!(AdCategory::from_str("Work and business").unwrap(), AdCategory::WorkAndBusiness);
        assert_eq!(AdType::from_str("sale").unwrap(), AdType::Sale);
        assert_eq!(City::Bagdad.to_string(), "Bagdad");
        assert_eq!(
            serde_json::to_value(AdCategory::RealEstate).unwrap(),
            serde_json::json!("Real estate")
        );
        assert_eq!(AdCategory::ALL.len(), 3);
    }

    #[test]
    fn test_unknown_enum_value_is_validation_error() {
        let err = City::from_str("Basra").unwrap_err();
        assert_eq!(err, AppError::ValidationFailed("unknown city: Basra".into()));
    }

    #[test]
    fn test_ad_serializes_camel_case() {
        let ad = Ad {
            id: AdId::new("a1"),
            title: "Car".into(),
            description: "Good condition".into(),
            created_by: UserId::new("u1"),
            created_at: chrono::Utc::now(),
            class_name: AdCategory::WorkAndBusiness,
            type_name: AdType::Sale,
            country: DEFAULT_COUNTRY.into(),
            city: City::Bagdad,
            media_url: None,
        };
        let value = serde_json::to_value(&ad).unwrap();
        assert_eq!(value["createdBy"], "u1");
        assert_eq!(value["className"], "Work and business");
        assert_eq!(value["typeName"], "sale");
        assert!(value.get("mediaUrl").is_none());
    }

    #[test]
    fn test_preview_counts_characters() {
        let mut description = "بيت ".repeat(20);
        description.push_str("end");
        let ad = Ad {
            id: AdId::new("a1"),
            title: "House".into(),
            description,
            created_by: UserId::new("u1"),
            created_at: chrono::Utc::now(),
            class_name: AdCategory::RealEstate,
            type_name: AdType::Buy,
            country: DEFAULT_COUNTRY.into(),
            city: City::Karbala,
            media_url: None,
        };
        assert_eq!(ad.preview(8).chars().count(), 8);
        assert_eq!(ad.preview(1000), ad.description);
    }

    #[test]
    fn test_local_media_base_name() {
        let media = LocalMediaRef::new("file:///var/mobile/tmp/IMG_0042.jpg");
        assert_eq!(media.base_name(), "IMG_0042.jpg");
        assert_eq!(LocalMediaRef::new("photo.png").base_name(), "photo.png");
    }

    #[test]
    fn test_require_user() {
        assert_eq!(require_user(&StaticIdentity::signed_in("u1")).unwrap(), UserId::new("u1"));
        assert_eq!(require_user(&StaticIdentity::anonymous()), Err(AppError::Unauthenticated));
        assert_eq!(require_user(&StaticIdentity::signed_in("  ")), Err(AppError::Unauthenticated));
    }
}
