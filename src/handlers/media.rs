use crate::middlewares::AuthenticatedUser;
use crate::models::*;
use crate::services::{MediaService, TranslationService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/v1/media/audio",
    tag = "media",
    request_body = NarrateRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "生成朗读音频成功", body = GeneratedAssetResponse),
        (status = 400, description = "不支持的音色"),
        (status = 402, description = "额度不足"),
        (status = 502, description = "供应商调用失败")
    )
)]
pub async fn narrate(
    media_service: web::Data<MediaService>,
    user: AuthenticatedUser,
    request: web::Json<NarrateRequest>,
) -> Result<HttpResponse> {
    match media_service.narrate(&user, request.into_inner()).await {
        Ok(generated) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": generated
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/media/image",
    tag = "media",
    request_body = IllustrateRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "生成插图成功", body = GeneratedAssetResponse),
        (status = 402, description = "额度不足"),
        (status = 502, description = "供应商调用失败")
    )
)]
pub async fn illustrate(
    media_service: web::Data<MediaService>,
    user: AuthenticatedUser,
    request: web::Json<IllustrateRequest>,
) -> Result<HttpResponse> {
    match media_service.illustrate(&user, request.into_inner()).await {
        Ok(generated) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": generated
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/media/video",
    tag = "media",
    request_body = StoryMediaRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "合成视频成功", body = GeneratedAssetResponse),
        (status = 400, description = "故事还没有插图"),
        (status = 402, description = "额度不足"),
        (status = 502, description = "渲染服务调用失败")
    )
)]
pub async fn compose_video(
    media_service: web::Data<MediaService>,
    user: AuthenticatedUser,
    request: web::Json<StoryMediaRequest>,
) -> Result<HttpResponse> {
    match media_service.compose_video(&user, request.into_inner()).await {
        Ok(generated) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": generated
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/media/pdf",
    tag = "media",
    request_body = StoryMediaRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "导出 PDF 成功", body = GeneratedAssetResponse),
        (status = 402, description = "额度不足"),
        (status = 502, description = "渲染服务调用失败")
    )
)]
pub async fn render_pdf(
    media_service: web::Data<MediaService>,
    user: AuthenticatedUser,
    request: web::Json<StoryMediaRequest>,
) -> Result<HttpResponse> {
    match media_service.render_pdf(&user, request.into_inner()).await {
        Ok(generated) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": generated
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/media/translate",
    tag = "media",
    request_body = TranslateRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "翻译成功", body = GeneratedTranslationResponse),
        (status = 402, description = "额度不足"),
        (status = 502, description = "供应商调用失败")
    )
)]
pub async fn translate(
    translation_service: web::Data<TranslationService>,
    user: AuthenticatedUser,
    request: web::Json<TranslateRequest>,
) -> Result<HttpResponse> {
    match translation_service.translate(&user, request.into_inner()).await {
        Ok(generated) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": generated
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/media/assets/{id}",
    tag = "media",
    params(
        ("id" = i32, Path, description = "媒体 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功"),
        (status = 403, description = "无权访问"),
        (status = 404, description = "媒体不存在")
    )
)]
pub async fn delete_asset(
    media_service: web::Data<MediaService>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match media_service.delete_asset(&user, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Asset deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn media_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/media")
            .route("/audio", web::post().to(narrate))
            .route("/image", web::post().to(illustrate))
            .route("/video", web::post().to(compose_video))
            .route("/pdf", web::post().to(render_pdf))
            .route("/translate", web::post().to(translate))
            .route("/assets/{id}", web::delete().to(delete_asset)),
    );
}
