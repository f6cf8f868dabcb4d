use crate::entities::usage_counter_entity;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 当月用量快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    #[schema(example = "2025-09")]
    pub month_key: String,
    pub credits_used: i32,
    pub monthly_credits: i32,
    pub remaining: i32,
    pub tier_level: i32,
    pub tier_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsageHistoryItem {
    pub month_key: String,
    pub credits_used: i32,
}

impl From<usage_counter_entity::Model> for UsageHistoryItem {
    fn from(m: usage_counter_entity::Model) -> Self {
        Self {
            month_key: m.month_key,
            credits_used: m.credits_used,
        }
    }
}

/// 管理员覆盖当月用量
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetUsageRequest {
    pub credits_used: i32,
}
