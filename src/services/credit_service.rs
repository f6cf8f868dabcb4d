use crate::config::CreditCosts;
use crate::entities::usage_counter_entity as usage;
use crate::error::{AppError, AppResult};
use crate::middlewares::AuthenticatedUser;
use crate::models::{UsageHistoryItem, UsageResponse};
use crate::services::AccountService;
use crate::utils::current_month_key;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    UpdateResult,
};
use uuid::Uuid;

/// 月度额度闸门
///
/// 规则: `credits_used + cost > monthly_credits` 时拒绝。扣费是一条带条件的
/// 原子 UPDATE，在调用方事务中与产物写入一起提交。
#[derive(Clone)]
pub struct CreditService {
    pool: DatabaseConnection,
    costs: CreditCosts,
}

impl CreditService {
    pub fn new(pool: DatabaseConnection, costs: CreditCosts) -> Self {
        Self { pool, costs }
    }

    pub fn costs(&self) -> &CreditCosts {
        &self.costs
    }

    pub async fn usage(&self, user: &AuthenticatedUser) -> AppResult<UsageResponse> {
        Self::snapshot(&self.pool, user.id).await
    }

    /// 当月用量快照，本月尚无计数行时按 0 计算
    pub async fn snapshot<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<UsageResponse> {
        let tier = AccountService::tier_for_user(conn, user_id).await?;
        let month_key = current_month_key();
        let credits_used = Self::credits_used(conn, user_id, &month_key).await?;

        Ok(UsageResponse {
            month_key,
            credits_used,
            monthly_credits: tier.monthly_credits,
            remaining: (tier.monthly_credits - credits_used).max(0),
            tier_level: tier.level,
            tier_name: tier.name,
        })
    }

    /// 调用供应商之前的只读预检
    pub async fn ensure_available(&self, user: &AuthenticatedUser, cost: i32) -> AppResult<()> {
        let snapshot = Self::snapshot(&self.pool, user.id).await?;
        if snapshot.credits_used + cost > snapshot.monthly_credits {
            log::warn!(
                "User {} rejected: {} credits required, {} of {} used",
                user.id,
                cost,
                snapshot.credits_used,
                snapshot.monthly_credits
            );
            return Err(AppError::InsufficientCredits {
                required: cost,
                remaining: snapshot.remaining,
            });
        }
        Ok(())
    }

    /// 原子扣费，返回扣费后的已用额度
    ///
    /// 1. 不存在本月计数行时插入 0 (ON CONFLICT DO NOTHING)
    /// 2. `UPDATE ... SET credits_used = credits_used + cost WHERE credits_used <= allowance - cost`
    /// 3. 影响行数为 0 说明额度已被其它请求用掉
    pub async fn charge<C: ConnectionTrait>(conn: &C, user_id: Uuid, cost: i32) -> AppResult<i32> {
        if cost < 0 {
            return Err(AppError::InternalError(format!("Negative credit cost {cost}")));
        }
        let tier = AccountService::tier_for_user(conn, user_id).await?;
        let month_key = current_month_key();

        usage::Entity::insert(usage::ActiveModel {
            user_id: Set(user_id),
            month_key: Set(month_key.clone()),
            credits_used: Set(0),
            updated_at: Set(Some(Utc::now())),
        })
        .on_conflict(
            OnConflict::columns([usage::Column::UserId, usage::Column::MonthKey])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

        let update_result: UpdateResult = usage::Entity::update_many()
            .col_expr(
                usage::Column::CreditsUsed,
                Expr::col(usage::Column::CreditsUsed).add(cost),
            )
            .col_expr(usage::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(usage::Column::UserId.eq(user_id))
            .filter(usage::Column::MonthKey.eq(month_key.as_str()))
            .filter(usage::Column::CreditsUsed.lte(tier.monthly_credits - cost))
            .exec(conn)
            .await?;

        let credits_used = Self::credits_used(conn, user_id, &month_key).await?;
        if update_result.rows_affected != 1 {
            log::warn!(
                "User {user_id} charge of {cost} rejected at {credits_used}/{}",
                tier.monthly_credits
            );
            return Err(AppError::InsufficientCredits {
                required: cost,
                remaining: (tier.monthly_credits - credits_used).max(0),
            });
        }
        Ok(credits_used)
    }

    /// 历史月份用量，最新的在前
    pub async fn history(&self, user: &AuthenticatedUser) -> AppResult<Vec<UsageHistoryItem>> {
        let list = usage::Entity::find()
            .filter(usage::Column::UserId.eq(user.id))
            .order_by_desc(usage::Column::MonthKey)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    /// 管理员：直接设置用户当月已用额度
    pub async fn set_usage(&self, user_id: Uuid, credits_used: i32) -> AppResult<UsageResponse> {
        if credits_used < 0 {
            return Err(AppError::ValidationError(
                "creditsUsed must not be negative".into(),
            ));
        }
        AccountService::ensure_profile(&self.pool, user_id).await?;

        usage::Entity::insert(usage::ActiveModel {
            user_id: Set(user_id),
            month_key: Set(current_month_key()),
            credits_used: Set(credits_used),
            updated_at: Set(Some(Utc::now())),
        })
        .on_conflict(
            OnConflict::columns([usage::Column::UserId, usage::Column::MonthKey])
                .update_columns([usage::Column::CreditsUsed, usage::Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(&self.pool)
        .await?;

        log::info!("Admin set usage of user {user_id} to {credits_used}");
        Self::snapshot(&self.pool, user_id).await
    }

    async fn credits_used<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        month_key: &str,
    ) -> AppResult<i32> {
        let row = usage::Entity::find_by_id((user_id, month_key.to_string()))
            .one(conn)
            .await?;
        Ok(row.map(|r| r.credits_used).unwrap_or(0))
    }
}
