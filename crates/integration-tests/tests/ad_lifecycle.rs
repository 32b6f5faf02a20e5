use ads_app::feed::LOAD_FAILED_MESSAGE;
use ads_app::{format_relative_age, FeedPhase};
use ads_core::{AdCategory, AdRepo, AdType, AppError, City, ADS_COLLECTION};
use chrono::Utc;
use integration_tests::{car_form, Harness};
use serde_json::json;

#[tokio::test]
async fn test_created_ad_shows_up_in_feed() {
    let h = Harness::new(Some("u1")).await.unwrap();
    let before = Utc::now();

    let creation = h.ctx.creation().unwrap();
    creation.update_form(|form| *form = car_form());
    let id = creation.submit().await.unwrap();

    let feed = h.ctx.feed();
    feed.mount().await;
    let state = feed.state();
    assert_eq!(state.phase, FeedPhase::Loaded);
    assert_eq!(state.count_label(), "1 ad");

    let ad = &state.ads[0];
    assert_eq!(ad.id, id);
    assert_eq!(ad.title, "Car");
    assert_eq!(ad.description, "Good condition");
    assert_eq!(ad.class_name, AdCategory::WorkAndBusiness);
    assert_eq!(ad.type_name, AdType::Sale);
    assert_eq!(ad.city, City::Bagdad);
    assert_eq!(ad.country, "Iraq");
    assert_eq!(ad.created_by.as_str(), "u1");
    assert_eq!(ad.media_url, None);
    assert!(ad.created_at >= before - chrono::Duration::seconds(1));
    assert_eq!(feed.format_relative_age(ad.created_at), "now");
}

#[tokio::test]
async fn test_fields_are_trimmed_before_storage() {
    let h = Harness::new(Some("u1")).await.unwrap();
    let creation = h.ctx.creation().unwrap();
    creation.update_form(|form| {
        *form = car_form();
        form.title = "  Car  ".into();
        form.city = " Karbala\n".into();
    });
    let id = creation.submit().await.unwrap();

    let ad = h.ctx.repo.get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(ad.title, "Car");
    assert_eq!(ad.city, City::Karbala);
}

#[tokio::test]
async fn test_newest_ad_is_listed_first() {
    let h = Harness::new(Some("u1")).await.unwrap();
    let creation = h.ctx.creation().unwrap();

    creation.update_form(|form| *form = car_form());
    let older = creation.submit().await.unwrap();
    creation.update_form(|form| form.title = "Flat".into());
    let newer = creation.submit().await.unwrap();

    let feed = h.ctx.feed();
    feed.refresh().await;
    let ids: Vec<_> = feed.state().ads.into_iter().map(|ad| ad.id).collect();
    assert_eq!(ids, vec![newer, older]);
}

#[tokio::test]
async fn test_incomplete_form_writes_nothing() {
    let h = Harness::new(Some("u1")).await.unwrap();
    let creation = h.ctx.creation().unwrap();
    creation.update_form(|form| {
        *form = car_form();
        form.description = "   ".into();
    });

    let err = creation.submit().await.unwrap_err();
    assert!(matches!(err, AppError::ValidationFailed(_)));
    assert!(!creation.state().is_submitting);

    let feed = h.ctx.feed();
    feed.refresh().await;
    assert!(feed.state().is_empty());
}

#[tokio::test]
async fn test_anonymous_viewer_cannot_create() {
    let h = Harness::new(None).await.unwrap();
    assert!(matches!(h.ctx.creation(), Err(AppError::Unauthenticated)));
}

#[tokio::test]
async fn test_title_and_description_updates_round_trip() {
    let h = Harness::new(Some("u1")).await.unwrap();
    let creation = h.ctx.creation().unwrap();
    creation.update_form(|form| *form = car_form());
    let id = creation.submit().await.unwrap();

    h.ctx.repo.update_title(&id, "Car, 2015").await.unwrap();
    h.ctx
        .repo
        .update_description(&id, "Low mileage")
        .await
        .unwrap();

    let ad = h.ctx.repo.get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(ad.title, "Car, 2015");
    assert_eq!(ad.description, "Low mileage");
    assert_eq!(ad.city, City::Bagdad);
}

#[tokio::test]
async fn test_malformed_document_fails_feed_with_generic_message() {
    let h = Harness::new(Some("u1")).await.unwrap();
    h.store
        .put(ADS_COLLECTION, "broken", json!({ "title": 42 }))
        .await
        .unwrap();

    let feed = h.ctx.feed();
    feed.refresh().await;
    assert_eq!(feed.state().error(), Some(LOAD_FAILED_MESSAGE));
}

#[test]
fn test_relative_age_of_old_ads_is_a_date() {
    let label = format_relative_age(Utc::now() - chrono::Duration::days(10));
    assert!(!label.ends_with("ago"), "got {label}");
    assert_eq!(label.matches('/').count(), 2);
}
