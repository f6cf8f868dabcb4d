use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{ImageProviderKind, MediaKind};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::tiers::list_tiers,
        handlers::account::get_account,
        handlers::account::get_credits,
        handlers::account::get_credit_history,
        handlers::stories::generate_story,
        handlers::stories::create_story,
        handlers::stories::list_stories,
        handlers::stories::get_story,
        handlers::stories::delete_story,
        handlers::stories::list_story_assets,
        handlers::stories::list_story_translations,
        handlers::media::narrate,
        handlers::media::illustrate,
        handlers::media::compose_video,
        handlers::media::render_pdf,
        handlers::media::translate,
        handlers::media::delete_asset,
        handlers::admin::update_tier,
        handlers::admin::set_user_tier,
        handlers::admin::set_user_usage,
        handlers::admin::get_image_provider,
        handlers::admin::set_image_provider,
    ),
    components(
        schemas(
            ApiError,
            ErrorResponse,
            TierResponse,
            UpdateTierRequest,
            UsageResponse,
            UsageHistoryItem,
            SetUsageRequest,
            ProfileResponse,
            SetUserTierRequest,
            ImageProviderSetting,
            ImageProviderKind,
            GenerateStoryRequest,
            CreateStoryRequest,
            StoryResponse,
            GeneratedStoryResponse,
            NarrateRequest,
            IllustrateRequest,
            StoryMediaRequest,
            TranslateRequest,
            MediaKind,
            MediaAssetResponse,
            GeneratedAssetResponse,
            TranslationResponse,
            GeneratedTranslationResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness probe"),
        (name = "tiers", description = "Subscription tier API"),
        (name = "account", description = "Account API"),
        (name = "credits", description = "Monthly credit usage API"),
        (name = "stories", description = "Story API"),
        (name = "media", description = "Audio, image, video, PDF and translation API"),
        (name = "admin", description = "Administration API"),
    ),
    info(
        title = "Fablecraft Backend API",
        version = "1.0.0",
        description = "Story and media generation REST API documentation"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
