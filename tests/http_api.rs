mod common;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use common::*;
use fablecraft_backend::handlers;
use fablecraft_backend::middlewares::AuthMiddleware;
use fablecraft_backend::utils::JwtService;
use serde_json::{Value, json};

macro_rules! init_app {
    ($harness:expr, $jwt:expr) => {
        test::init_service(
            App::new()
                .wrap(AuthMiddleware::new($jwt.clone()))
                .app_data(web::Data::new($harness.accounts.clone()))
                .app_data(web::Data::new($harness.tiers.clone()))
                .app_data(web::Data::new($harness.credits.clone()))
                .app_data(web::Data::new($harness.settings.clone()))
                .app_data(web::Data::new($harness.stories.clone()))
                .app_data(web::Data::new($harness.translations.clone()))
                .app_data(web::Data::new($harness.media.clone()))
                .configure(handlers::health_config)
                .service(
                    web::scope("/api/v1")
                        .configure(handlers::tier_config)
                        .configure(handlers::account_config)
                        .configure(handlers::story_config)
                        .configure(handlers::media_config)
                        .configure(handlers::admin_config),
                ),
        )
        .await
    };
}

fn bearer(jwt: &JwtService, user: &fablecraft_backend::middlewares::AuthenticatedUser) -> String {
    let token = jwt
        .generate_access_token(user.id, user.email.as_deref())
        .unwrap();
    format!("Bearer {token}")
}

#[actix_web::test]
async fn test_public_routes_need_no_token() {
    let harness = TestApp::new().await;
    let jwt = JwtService::new(&harness.config.jwt);
    let app = init_app!(harness, jwt);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/tiers").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"][1]["monthlyCredits"], 30);
}

#[actix_web::test]
async fn test_missing_or_invalid_token_is_unauthorized() {
    let harness = TestApp::new().await;
    let jwt = JwtService::new(&harness.config.jwt);
    let app = init_app!(harness, jwt);

    let req = test::TestRequest::get().uri("/api/v1/credits").to_request();
    let err = test::try_call_service(&app, req).await.unwrap_err();
    assert_eq!(
        err.as_response_error().status_code(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::get()
        .uri("/api/v1/credits")
        .insert_header(("Authorization", "Bearer not-a-jwt"))
        .to_request();
    let err = test::try_call_service(&app, req).await.unwrap_err();
    assert_eq!(
        err.as_response_error().status_code(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(harness.text.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn test_token_subject_becomes_request_identity() {
    let harness = TestApp::new().await;
    let jwt = JwtService::new(&harness.config.jwt);
    let owner = new_user();
    let other = new_user();
    let story = harness.seed_story(&owner).await;
    let app = init_app!(harness, jwt);

    let req = test::TestRequest::get()
        .uri("/api/v1/account")
        .insert_header(("Authorization", bearer(&jwt, &owner)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["userId"], owner.id.to_string());
    assert_eq!(body["data"]["email"], "parent@example.com");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/stories/{}", story.id))
        .insert_header(("Authorization", bearer(&jwt, &other)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_unlisted_paths_require_token() {
    let harness = TestApp::new().await;
    let jwt = JwtService::new(&harness.config.jwt);
    let app = init_app!(harness, jwt);

    for uri in ["/api/v1/auth/login", "/webhook/stripe", "/api/v1/credits/history"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(
            err.as_response_error().status_code(),
            StatusCode::UNAUTHORIZED,
            "{uri}"
        );
    }
}

#[actix_web::test]
async fn test_credits_endpoint_reports_usage() {
    let harness = TestApp::new().await;
    let jwt = JwtService::new(&harness.config.jwt);
    let user = new_user();
    harness.set_used(&user, 1).await;
    let app = init_app!(harness, jwt);

    let req = test::TestRequest::get()
        .uri("/api/v1/credits")
        .insert_header(("Authorization", bearer(&jwt, &user)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["creditsUsed"], 1);
    assert_eq!(body["data"]["remaining"], 2);
    assert_eq!(body["data"]["tierName"], "Free");
}

#[actix_web::test]
async fn test_generate_story_over_http() {
    let harness = TestApp::new().await;
    let jwt = JwtService::new(&harness.config.jwt);
    let user = new_user();
    let app = init_app!(harness, jwt);

    let req = test::TestRequest::post()
        .uri("/api/v1/stories/generate")
        .insert_header(("Authorization", bearer(&jwt, &user)))
        .set_json(json!({
            "prompt": "a turtle who wants to fly",
            "ageGroup": "4-6",
            "genre": "adventure"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["story"]["title"], "The Brave Little Owl");
    assert_eq!(body["data"]["usage"]["creditsUsed"], 1);

    let id = body["data"]["story"]["id"].as_i64().unwrap();
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/stories/{id}"))
        .insert_header(("Authorization", bearer(&jwt, &user)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_exhausted_allowance_returns_payment_required() {
    let harness = TestApp::new().await;
    let jwt = JwtService::new(&harness.config.jwt);
    let user = new_user();
    let story = harness.seed_story(&user).await;
    harness.set_used(&user, 3).await;
    let app = init_app!(harness, jwt);

    let req = test::TestRequest::post()
        .uri("/api/v1/media/pdf")
        .insert_header(("Authorization", bearer(&jwt, &user)))
        .set_json(json!({ "storyId": story.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYMENT_REQUIRED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "INSUFFICIENT_CREDITS");
    assert_eq!(
        harness
            .renderer
            .pdf_calls
            .load(std::sync::atomic::Ordering::SeqCst),
        0
    );
}

#[actix_web::test]
async fn test_admin_routes_require_admin_profile() {
    let harness = TestApp::new().await;
    let jwt = JwtService::new(&harness.config.jwt);
    let user = new_user();
    let admin = new_user();
    harness.make_admin(&admin).await;
    let app = init_app!(harness, jwt);

    let req = test::TestRequest::put()
        .uri("/api/v1/admin/settings/image-provider")
        .insert_header(("Authorization", bearer(&jwt, &user)))
        .set_json(json!({ "provider": "runware" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri("/api/v1/admin/settings/image-provider")
        .insert_header(("Authorization", bearer(&jwt, &admin)))
        .set_json(json!({ "provider": "runware" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["provider"], "runware");

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/admin/users/{}/usage", user.id))
        .insert_header(("Authorization", bearer(&jwt, &admin)))
        .set_json(json!({ "creditsUsed": 2 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(harness.credits_used(&user).await, 2);
}
