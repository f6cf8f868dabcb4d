use crate::models::TierResponse;
use crate::services::TierService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/v1/tiers",
    tag = "tiers",
    responses(
        (status = 200, description = "套餐列表", body = Vec<TierResponse>)
    )
)]
pub async fn list_tiers(tier_service: web::Data<TierService>) -> Result<HttpResponse> {
    match tier_service.list_tiers().await {
        Ok(tiers) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": tiers
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn tier_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/tiers", web::get().to(list_tiers));
}
