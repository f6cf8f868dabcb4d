use crate::middlewares::AuthenticatedUser;
use crate::models::*;
use crate::services::{MediaService, StoryService, TranslationService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/v1/stories/generate",
    tag = "stories",
    request_body = GenerateStoryRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "生成故事成功", body = GeneratedStoryResponse),
        (status = 400, description = "请求参数错误"),
        (status = 401, description = "未授权"),
        (status = 402, description = "额度不足"),
        (status = 403, description = "已达到保存上限"),
        (status = 502, description = "供应商调用失败")
    )
)]
pub async fn generate_story(
    story_service: web::Data<StoryService>,
    user: AuthenticatedUser,
    request: web::Json<GenerateStoryRequest>,
) -> Result<HttpResponse> {
    match story_service.generate_story(&user, request.into_inner()).await {
        Ok(generated) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": generated
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/stories",
    tag = "stories",
    request_body = CreateStoryRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "保存故事成功", body = StoryResponse),
        (status = 400, description = "请求参数错误"),
        (status = 403, description = "已达到保存上限")
    )
)]
pub async fn create_story(
    story_service: web::Data<StoryService>,
    user: AuthenticatedUser,
    request: web::Json<CreateStoryRequest>,
) -> Result<HttpResponse> {
    match story_service.create_story(&user, request.into_inner()).await {
        Ok(story) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": story
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/stories",
    tag = "stories",
    params(
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "故事列表（分页）"),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_stories(
    story_service: web::Data<StoryService>,
    user: AuthenticatedUser,
    query: web::Query<StoryQuery>,
) -> Result<HttpResponse> {
    match story_service.list_stories(&user, &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/stories/{id}",
    tag = "stories",
    params(
        ("id" = i32, Path, description = "故事 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "故事详情", body = StoryResponse),
        (status = 403, description = "无权访问"),
        (status = 404, description = "故事不存在")
    )
)]
pub async fn get_story(
    story_service: web::Data<StoryService>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match story_service.get_story(&user, path.into_inner()).await {
        Ok(story) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": story
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/stories/{id}",
    tag = "stories",
    params(
        ("id" = i32, Path, description = "故事 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功"),
        (status = 403, description = "无权访问"),
        (status = 404, description = "故事不存在")
    )
)]
pub async fn delete_story(
    story_service: web::Data<StoryService>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match story_service.delete_story(&user, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Story deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/stories/{id}/assets",
    tag = "stories",
    params(
        ("id" = i32, Path, description = "故事 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "故事的媒体列表", body = Vec<MediaAssetResponse>),
        (status = 404, description = "故事不存在")
    )
)]
pub async fn list_story_assets(
    media_service: web::Data<MediaService>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match media_service.list_assets(&user, path.into_inner()).await {
        Ok(assets) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": assets
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/stories/{id}/translations",
    tag = "stories",
    params(
        ("id" = i32, Path, description = "故事 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "故事的译文列表", body = Vec<TranslationResponse>),
        (status = 404, description = "故事不存在")
    )
)]
pub async fn list_story_translations(
    translation_service: web::Data<TranslationService>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match translation_service
        .list_translations(&user, path.into_inner())
        .await
    {
        Ok(translations) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": translations
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn story_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/stories")
            .route("/generate", web::post().to(generate_story))
            .route("", web::post().to(create_story))
            .route("", web::get().to(list_stories))
            .route("/{id}", web::get().to(get_story))
            .route("/{id}", web::delete().to(delete_story))
            .route("/{id}/assets", web::get().to(list_story_assets))
            .route("/{id}/translations", web::get().to(list_story_translations)),
    );
}
