use crate::entities::subscription_tier_entity;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierResponse {
    pub level: i32,
    pub name: String,
    pub monthly_credits: i32,
    pub saved_stories_limit: i32,
    /// 月费（美分）
    pub price_cents: i32,
}

impl From<subscription_tier_entity::Model> for TierResponse {
    fn from(m: subscription_tier_entity::Model) -> Self {
        Self {
            level: m.level,
            name: m.name,
            monthly_credits: m.monthly_credits,
            saved_stories_limit: m.saved_stories_limit,
            price_cents: m.price_cents,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTierRequest {
    pub name: Option<String>,
    pub monthly_credits: Option<i32>,
    pub saved_stories_limit: Option<i32>,
    pub price_cents: Option<i32>,
}
