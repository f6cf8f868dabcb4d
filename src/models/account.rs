use crate::entities::ImageProviderKind;
use crate::models::{TierResponse, UsageResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub is_admin: bool,
    pub tier: TierResponse,
    pub usage: UsageResponse,
    pub saved_stories: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetUserTierRequest {
    pub level: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageProviderSetting {
    pub provider: ImageProviderKind,
}
