use crate::entities::subscription_tier_entity as tiers;
use crate::error::{AppError, AppResult};
use crate::models::{TierResponse, UpdateTierRequest};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryOrder, Set};

#[derive(Clone)]
pub struct TierService {
    pool: DatabaseConnection,
}

impl TierService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list_tiers(&self) -> AppResult<Vec<TierResponse>> {
        let list = tiers::Entity::find()
            .order_by_asc(tiers::Column::Level)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    /// 管理员：修改套餐额度与价格，只更新传入的字段
    pub async fn update_tier(&self, level: i32, req: UpdateTierRequest) -> AppResult<TierResponse> {
        let tier = tiers::Entity::find_by_id(level)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Subscription tier {level} not found")))?;

        for (field, value) in [
            ("monthlyCredits", req.monthly_credits),
            ("savedStoriesLimit", req.saved_stories_limit),
            ("priceCents", req.price_cents),
        ] {
            if value.is_some_and(|v| v < 0) {
                return Err(AppError::ValidationError(format!(
                    "{field} must not be negative"
                )));
            }
        }

        let mut am = tier.into_active_model();
        if let Some(name) = req.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::ValidationError("Tier name must not be empty".into()));
            }
            am.name = Set(name);
        }
        if let Some(v) = req.monthly_credits {
            am.monthly_credits = Set(v);
        }
        if let Some(v) = req.saved_stories_limit {
            am.saved_stories_limit = Set(v);
        }
        if let Some(v) = req.price_cents {
            am.price_cents = Set(v);
        }
        am.updated_at = Set(Some(Utc::now()));
        let updated = am.update(&self.pool).await?;

        log::info!("Subscription tier {level} updated");
        Ok(updated.into())
    }
}
