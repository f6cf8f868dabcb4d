use crate::middlewares::AuthenticatedUser;
use crate::models::UsageHistoryItem;
use crate::services::{AccountService, CreditService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/v1/account",
    tag = "account",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "用户资料、套餐与当月用量", body = crate::models::ProfileResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_account(
    account_service: web::Data<AccountService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    match account_service.get_profile(&user).await {
        Ok(profile) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": profile
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/credits",
    tag = "credits",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当月额度用量", body = crate::models::UsageResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_credits(
    credit_service: web::Data<CreditService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    match credit_service.usage(&user).await {
        Ok(usage) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": usage
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/credits/history",
    tag = "credits",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "历史月份用量", body = Vec<UsageHistoryItem>),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_credit_history(
    credit_service: web::Data<CreditService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    match credit_service.history(&user).await {
        Ok(history) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": history
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn account_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/account", web::get().to(get_account)).service(
        web::scope("/credits")
            .route("", web::get().to(get_credits))
            .route("/history", web::get().to(get_credit_history)),
    );
}
