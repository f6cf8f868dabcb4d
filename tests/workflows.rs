mod common;

use common::*;
use fablecraft_backend::entities::{
    ImageProviderKind, MediaKind, media_asset_entity, story_translation_entity,
};
use fablecraft_backend::error::AppError;
use fablecraft_backend::models::*;
use sea_orm::{EntityTrait, PaginatorTrait};
use std::sync::atomic::Ordering;

fn generate_request() -> GenerateStoryRequest {
    GenerateStoryRequest {
        prompt: "a shy hedgehog who joins the school choir".to_string(),
        age_group: "4-6".to_string(),
        genre: "fable".to_string(),
        moral: Some("Your voice matters.".to_string()),
        language: None,
        characters: None,
        setting: None,
    }
}

#[tokio::test]
async fn test_story_round_trip_by_id() {
    let app = TestApp::new().await;
    let user = new_user();

    let created = app
        .stories
        .create_story(
            &user,
            CreateStoryRequest {
                title: "Moon & Mole".to_string(),
                content: "Mole dug up to see the moon.\n\nThe moon waited.".to_string(),
                moral: "Patience finds the light.".to_string(),
                age_group: "7-9".to_string(),
                genre: "bedtime".to_string(),
                language: Some("en".to_string()),
                characters: None,
                setting: None,
            },
        )
        .await
        .unwrap();

    let fetched = app.stories.get_story(&user, created.id).await.unwrap();
    assert_eq!(fetched.title, "Moon & Mole");
    assert_eq!(fetched.content, "Mole dug up to see the moon.\n\nThe moon waited.");
    assert_eq!(fetched.moral, "Patience finds the light.");
    assert_eq!(fetched.author_id, user.id);
    // 手动保存不扣额度
    assert_eq!(app.credits_used(&user).await, 0);
}

#[tokio::test]
async fn test_generate_story_persists_provider_text_and_charges() {
    let app = TestApp::new().await;
    let user = new_user();

    let generated = app
        .stories
        .generate_story(&user, generate_request())
        .await
        .unwrap();

    assert_eq!(generated.story.title, "The Brave Little Owl");
    assert_eq!(generated.story.moral, "Your voice matters.");
    assert_eq!(generated.story.language, "en");
    assert_eq!(generated.usage.credits_used, 1);
    assert_eq!(app.text.calls.load(Ordering::SeqCst), 1);

    let fetched = app
        .stories
        .get_story(&user, generated.story.id)
        .await
        .unwrap();
    assert_eq!(fetched.content, generated.story.content);
}

#[tokio::test]
async fn test_generate_story_provider_failure_charges_nothing() {
    let app = TestApp::new().await;
    let user = new_user();
    app.text.fail.store(true, Ordering::SeqCst);

    let err = app
        .stories
        .generate_story(&user, generate_request())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ProviderUnavailable(_)));
    assert_eq!(app.credits_used(&user).await, 0);
    let page = app
        .stories
        .list_stories(&user, &StoryQuery { page: None, per_page: None })
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_saved_story_limit_blocks_before_provider() {
    let app = TestApp::new().await;
    let user = new_user();
    for _ in 0..3 {
        app.seed_story(&user).await;
    }

    let err = app
        .stories
        .generate_story(&user, generate_request())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::StoryLimitReached { limit: 3 }));
    assert_eq!(app.text.calls.load(Ordering::SeqCst), 0);
    assert_eq!(app.credits_used(&user).await, 0);
}

#[tokio::test]
async fn test_simultaneous_saves_at_limit_keep_one() {
    let app = TestApp::new().await;
    let user = new_user();
    for _ in 0..2 {
        app.seed_story(&user).await;
    }

    let saves = (0..2).map(|i| {
        app.stories.create_story(
            &user,
            CreateStoryRequest {
                title: format!("Draft {i}"),
                content: "Two foxes shared one lantern.".to_string(),
                moral: "Sharing makes the dark smaller.".to_string(),
                age_group: "4-6".to_string(),
                genre: "fable".to_string(),
                language: None,
                characters: None,
                setting: None,
            },
        )
    });
    let results = futures_util::future::join_all(saves).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(AppError::StoryLimitReached { limit: 3 }))));
    let page = app
        .stories
        .list_stories(&user, &StoryQuery { page: None, per_page: None })
        .await
        .unwrap();
    assert_eq!(page.total, 3);
}

#[tokio::test]
async fn test_generate_story_validates_input() {
    let app = TestApp::new().await;
    let user = new_user();
    let mut request = generate_request();
    request.prompt = "   ".to_string();

    let err = app.stories.generate_story(&user, request).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    assert_eq!(app.text.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_stories_are_private_to_their_author() {
    let app = TestApp::new().await;
    let owner = new_user();
    let stranger = new_user();
    let story = app.seed_story(&owner).await;

    assert!(matches!(
        app.stories.get_story(&stranger, story.id).await,
        Err(AppError::Forbidden)
    ));
    assert!(matches!(
        app.media
            .render_pdf(&stranger, StoryMediaRequest { story_id: story.id })
            .await,
        Err(AppError::Forbidden)
    ));
    assert!(matches!(
        app.stories.get_story(&owner, story.id + 100).await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(app.renderer.pdf_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_list_stories_paginates_newest_first() {
    let app = TestApp::new().await;
    let user = new_user();
    app.accounts.set_user_tier(user.id, 1).await.unwrap();
    let mut ids = Vec::new();
    for _ in 0..5 {
        ids.push(app.seed_story(&user).await.id);
    }

    let page = app
        .stories
        .list_stories(
            &user,
            &StoryQuery {
                page: Some(1),
                per_page: Some(2),
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].id, ids[4]);
}

#[tokio::test]
async fn test_narrate_rejects_unknown_voice() {
    let app = TestApp::new().await;
    let user = new_user();
    let story = app.seed_story(&user).await;

    let err = app
        .media
        .narrate(
            &user,
            NarrateRequest {
                story_id: story.id,
                voice: Some("darth".to_string()),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    assert_eq!(app.speech.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_video_requires_an_illustration_and_uses_latest_narration() {
    let app = TestApp::new().await;
    let user = new_user();
    app.accounts.set_user_tier(user.id, 1).await.unwrap();
    let story = app.seed_story(&user).await;

    let err = app
        .media
        .compose_video(&user, StoryMediaRequest { story_id: story.id })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    assert_eq!(app.renderer.video_calls.load(Ordering::SeqCst), 0);

    let image = app
        .media
        .illustrate(
            &user,
            IllustrateRequest {
                story_id: Some(story.id),
                prompt: "a lighthouse at dusk".to_string(),
                style: None,
            },
        )
        .await
        .unwrap()
        .asset;
    for voice in ["alloy", "nova"] {
        app.media
            .narrate(
                &user,
                NarrateRequest {
                    story_id: story.id,
                    voice: Some(voice.to_string()),
                },
            )
            .await
            .unwrap();
    }
    let assets = app.media.list_assets(&user, story.id).await.unwrap();
    let latest_audio = assets
        .iter()
        .filter(|a| a.kind == MediaKind::Audio)
        .max_by_key(|a| a.id)
        .unwrap()
        .url
        .clone();

    let video = app
        .media
        .compose_video(&user, StoryMediaRequest { story_id: story.id })
        .await
        .unwrap();
    assert_eq!(video.asset.kind, MediaKind::Video);
    assert_eq!(video.asset.credits_used, 2);
    assert!(video.asset.url.ends_with(".mp4"));

    let composition = app.renderer.last_video.lock().unwrap().clone().unwrap();
    assert_eq!(composition.image_urls, vec![image.url]);
    assert_eq!(composition.narration_url, Some(latest_audio));
    // 1 image + 2 audio + 2 video
    assert_eq!(app.credits_used(&user).await, 5);
}

#[tokio::test]
async fn test_pdf_includes_story_illustrations() {
    let app = TestApp::new().await;
    let user = new_user();
    let story = app.seed_story(&user).await;
    let image = app
        .media
        .illustrate(
            &user,
            IllustrateRequest {
                story_id: Some(story.id),
                prompt: "a gull".to_string(),
                style: Some("crayon".to_string()),
            },
        )
        .await
        .unwrap()
        .asset;

    app.media
        .render_pdf(&user, StoryMediaRequest { story_id: story.id })
        .await
        .unwrap();
    let document = app.renderer.last_pdf.lock().unwrap().clone().unwrap();
    assert_eq!(document.title, story.title);
    assert_eq!(document.image_urls, vec![image.url]);
}

#[tokio::test]
async fn test_image_provider_follows_admin_setting() {
    let app = TestApp::new().await;
    let user = new_user();
    assert_eq!(
        app.settings.image_provider().await.unwrap(),
        ImageProviderKind::OpenAi
    );

    app.settings
        .set_image_provider(ImageProviderKind::Runware)
        .await
        .unwrap();
    let generated = app
        .media
        .illustrate(
            &user,
            IllustrateRequest {
                story_id: None,
                prompt: "a fox in the snow".to_string(),
                style: None,
            },
        )
        .await
        .unwrap();

    assert!(generated.asset.url.starts_with("https://images.test/runware/"));
    assert!(generated.asset.details.unwrap().contains("runware"));
    assert_eq!(app.runware_images.calls.load(Ordering::SeqCst), 1);
    assert_eq!(app.openai_images.calls.load(Ordering::SeqCst), 0);
    // 插图由供应商托管，不上传
    assert_eq!(app.storage.object_count(), 0);
}

#[tokio::test]
async fn test_translation_is_not_idempotent() {
    let app = TestApp::new().await;
    let user = new_user();
    let story = app.seed_story(&user).await;
    let request = || TranslateRequest {
        story_id: story.id,
        target_language: "es".to_string(),
    };

    let first = app.translations.translate(&user, request()).await.unwrap();
    let second = app.translations.translate(&user, request()).await.unwrap();

    assert_ne!(first.translation.id, second.translation.id);
    assert_eq!(first.translation.title, format!("[es] {}", story.title));
    assert_eq!(second.usage.credits_used, 2);
    let listed = app
        .translations
        .list_translations(&user, story.id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn test_delete_story_cascades_and_removes_objects() {
    let app = TestApp::new().await;
    let user = new_user();
    let story = app.seed_story(&user).await;
    app.media
        .render_pdf(&user, StoryMediaRequest { story_id: story.id })
        .await
        .unwrap();
    app.translations
        .translate(
            &user,
            TranslateRequest {
                story_id: story.id,
                target_language: "fr".to_string(),
            },
        )
        .await
        .unwrap();

    app.stories.delete_story(&user, story.id).await.unwrap();

    assert!(matches!(
        app.stories.get_story(&user, story.id).await,
        Err(AppError::NotFound(_))
    ));
    let assets = media_asset_entity::Entity::find().count(&app.db).await.unwrap();
    let translations = story_translation_entity::Entity::find()
        .count(&app.db)
        .await
        .unwrap();
    assert_eq!(assets, 0);
    assert_eq!(translations, 0);
    assert_eq!(app.storage.object_count(), 0);
    assert_eq!(app.storage.removed.lock().unwrap().len(), 1);
    // 删除不退还额度
    assert_eq!(app.credits_used(&user).await, 2);
}

#[tokio::test]
async fn test_tier_admin_update_and_listing() {
    let app = TestApp::new().await;

    let tiers = app.tiers.list_tiers().await.unwrap();
    let names: Vec<_> = tiers.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["Free", "Basic", "Premium"]);
    assert_eq!(tiers[2].price_cents, 1999);

    let updated = app
        .tiers
        .update_tier(
            0,
            UpdateTierRequest {
                monthly_credits: Some(5),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.monthly_credits, 5);
    assert_eq!(updated.name, "Free");

    let user = new_user();
    assert_eq!(app.credits.usage(&user).await.unwrap().monthly_credits, 5);
    assert!(matches!(
        app.tiers.update_tier(7, UpdateTierRequest::default()).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        app.tiers
            .update_tier(
                1,
                UpdateTierRequest {
                    price_cents: Some(-1),
                    ..Default::default()
                }
            )
            .await,
        Err(AppError::ValidationError(_))
    ));
}
