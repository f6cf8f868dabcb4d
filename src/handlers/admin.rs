use crate::middlewares::AuthenticatedUser;
use crate::models::*;
use crate::services::{AccountService, CreditService, SettingsService, TierService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

#[utoipa::path(
    put,
    path = "/api/v1/admin/tiers/{level}",
    tag = "admin",
    params(
        ("level" = i32, Path, description = "套餐等级")
    ),
    request_body = UpdateTierRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新套餐成功", body = TierResponse),
        (status = 403, description = "需要管理员权限"),
        (status = 404, description = "套餐不存在")
    )
)]
pub async fn update_tier(
    account_service: web::Data<AccountService>,
    tier_service: web::Data<TierService>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    request: web::Json<UpdateTierRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = account_service.require_admin(&user).await {
        return Ok(e.error_response());
    }
    match tier_service
        .update_tier(path.into_inner(), request.into_inner())
        .await
    {
        Ok(tier) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": tier
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}/tier",
    tag = "admin",
    params(
        ("id" = Uuid, Path, description = "用户 ID")
    ),
    request_body = SetUserTierRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "修改用户套餐成功", body = ProfileResponse),
        (status = 400, description = "套餐等级不存在"),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn set_user_tier(
    account_service: web::Data<AccountService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    request: web::Json<SetUserTierRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = account_service.require_admin(&user).await {
        return Ok(e.error_response());
    }
    match account_service
        .set_user_tier(path.into_inner(), request.level)
        .await
    {
        Ok(profile) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": profile
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}/usage",
    tag = "admin",
    params(
        ("id" = Uuid, Path, description = "用户 ID")
    ),
    request_body = SetUsageRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "修改当月用量成功", body = UsageResponse),
        (status = 400, description = "请求参数错误"),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn set_user_usage(
    account_service: web::Data<AccountService>,
    credit_service: web::Data<CreditService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    request: web::Json<SetUsageRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = account_service.require_admin(&user).await {
        return Ok(e.error_response());
    }
    match credit_service
        .set_usage(path.into_inner(), request.credits_used)
        .await
    {
        Ok(usage) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": usage
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/settings/image-provider",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前图片后端", body = ImageProviderSetting),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn get_image_provider(
    account_service: web::Data<AccountService>,
    settings_service: web::Data<SettingsService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    if let Err(e) = account_service.require_admin(&user).await {
        return Ok(e.error_response());
    }
    match settings_service.image_provider().await {
        Ok(provider) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": ImageProviderSetting { provider }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/settings/image-provider",
    tag = "admin",
    request_body = ImageProviderSetting,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "切换图片后端成功", body = ImageProviderSetting),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn set_image_provider(
    account_service: web::Data<AccountService>,
    settings_service: web::Data<SettingsService>,
    user: AuthenticatedUser,
    request: web::Json<ImageProviderSetting>,
) -> Result<HttpResponse> {
    if let Err(e) = account_service.require_admin(&user).await {
        return Ok(e.error_response());
    }
    match settings_service.set_image_provider(request.provider).await {
        Ok(provider) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": ImageProviderSetting { provider }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/tiers/{level}", web::put().to(update_tier))
            .route("/users/{id}/tier", web::put().to(set_user_tier))
            .route("/users/{id}/usage", web::put().to(set_user_usage))
            .route("/settings/image-provider", web::get().to(get_image_provider))
            .route("/settings/image-provider", web::put().to(set_image_provider)),
    );
}
