use std::sync::Arc;

use ads_app::detail::{CHAT_CREATE_FAILED_MESSAGE, PROFILE_NOT_FOUND_MESSAGE};
use ads_core::{Ad, AppError, ChatId, MockChatService, UserId};
use integration_tests::{car_form, Harness};

/// Posts the canonical ad as `seller` and returns it as the feed shows it.
async fn posted_by_seller(h: &Harness) -> Ad {
    let mut seller = h.ctx.clone();
    seller.identity = Arc::new(ads_core::StaticIdentity::signed_in("seller"));

    let creation = seller.creation().unwrap();
    creation.update_form(|form| *form = car_form());
    creation.submit().await.unwrap();

    let feed = h.ctx.feed();
    feed.refresh().await;
    feed.state().ads.remove(0)
}

#[tokio::test]
async fn test_buyer_starts_conversation_with_author() {
    let h = Harness::new(Some("buyer")).await.unwrap();
    h.add_user("seller", "ali").await.unwrap();
    let ad = posted_by_seller(&h).await;

    let detail = h.ctx.detail(ad);
    detail.mount().await;
    assert_eq!(detail.posted_label(), "now");
    assert!(detail.can_message());
    assert_eq!(detail.state().profile.unwrap().display_name(), "ali");

    let conversation = detail.start_conversation().await.unwrap();
    assert_eq!(conversation.chat_id, ChatId::new("chat-seller"));
    assert_eq!(conversation.other_user.id, UserId::new("seller"));
    assert_eq!(h.chat.participants().await, vec![UserId::new("seller")]);
}

#[tokio::test]
async fn test_unknown_author_disables_messaging() {
    let h = Harness::new(Some("buyer")).await.unwrap();
    let ad = posted_by_seller(&h).await;

    let detail = h.ctx.detail(ad);
    detail.mount().await;

    let expected = AppError::ProfileLoadFailed(PROFILE_NOT_FOUND_MESSAGE.into());
    assert_eq!(detail.state().profile_error, Some(expected.clone()));
    assert!(!detail.can_message());
    assert_eq!(detail.start_conversation().await, Err(expected));
    assert!(h.chat.participants().await.is_empty());
}

#[tokio::test]
async fn test_chat_failure_is_reported_without_navigation() {
    let mut h = Harness::new(Some("buyer")).await.unwrap();
    h.add_user("seller", "ali").await.unwrap();
    let ad = posted_by_seller(&h).await;

    let mut chat = MockChatService::new();
    chat.expect_create_chat()
        .times(1)
        .returning(|_| Err(anyhow::anyhow!("chat backend unavailable")));
    h.ctx.chat = Arc::new(chat);

    let detail = h.ctx.detail(ad);
    detail.mount().await;
    let err = detail.start_conversation().await.unwrap_err();

    assert_eq!(err, AppError::ChatCreateFailed(CHAT_CREATE_FAILED_MESSAGE.into()));
    assert_eq!(detail.state().chat_error, Some(err));
    assert!(detail.state().profile.is_some());
}

#[tokio::test]
async fn test_author_cannot_message_themselves() {
    let h = Harness::new(Some("seller")).await.unwrap();
    h.add_user("seller", "ali").await.unwrap();
    let ad = posted_by_seller(&h).await;

    let detail = h.ctx.detail(ad);
    detail.mount().await;

    assert!(detail.is_own_ad());
    assert!(!detail.can_message());
    assert!(matches!(
        detail.start_conversation().await,
        Err(AppError::ValidationFailed(_))
    ));
    assert!(h.chat.participants().await.is_empty());
}

#[tokio::test]
async fn test_anonymous_viewer_can_read_detail() {
    let h = Harness::new(None).await.unwrap();
    h.add_user("seller", "ali").await.unwrap();
    let ad = posted_by_seller(&h).await;

    let detail = h.ctx.detail(ad);
    detail.mount().await;
    assert_eq!(detail.posted_label(), "now");
    assert_eq!(detail.state().profile.unwrap().display_name(), "ali");

    assert!(!detail.can_message());
    assert_eq!(detail.start_conversation().await, Err(AppError::Unauthenticated));
    assert!(h.chat.participants().await.is_empty());
}
