use crate::entities::{profile_entity as profiles, story_entity as stories, subscription_tier_entity as tiers};
use crate::error::{AppError, AppResult};
use crate::middlewares::AuthenticatedUser;
use crate::models::{ProfileResponse, TierResponse};
use crate::services::CreditService;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QuerySelect, Select, Set,
};
use uuid::Uuid;

/// 新用户的默认套餐等级 (Free)
pub const DEFAULT_TIER_LEVEL: i32 = 0;

#[derive(Clone)]
pub struct AccountService {
    pool: DatabaseConnection,
}

impl AccountService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 读取用户资料，不存在时以 Free 等级创建
    pub async fn ensure_profile<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
    ) -> AppResult<profiles::Model> {
        let now = Utc::now();
        profiles::Entity::insert(profiles::ActiveModel {
            user_id: Set(user_id),
            subscription_level: Set(DEFAULT_TIER_LEVEL),
            is_admin: Set(false),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        })
        .on_conflict(
            OnConflict::column(profiles::Column::UserId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

        profiles::Entity::find_by_id(user_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::InternalError(format!("Profile {user_id} missing after insert")))
    }

    /// 在事务内锁住用户资料行 (SELECT ... FOR UPDATE)，同一用户的写入按顺序进行
    pub async fn lock_profile<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
    ) -> AppResult<profiles::Model> {
        Self::ensure_profile(conn, user_id).await?;
        locked_profile_query(user_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::InternalError(format!("Profile {user_id} missing after insert")))
    }

    pub async fn tier_for_level<C: ConnectionTrait>(conn: &C, level: i32) -> AppResult<tiers::Model> {
        tiers::Entity::find_by_id(level)
            .one(conn)
            .await?
            .ok_or_else(|| {
                AppError::InternalError(format!("Subscription tier {level} is not configured"))
            })
    }

    /// 用户当前套餐
    pub async fn tier_for_user<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
    ) -> AppResult<tiers::Model> {
        let profile = Self::ensure_profile(conn, user_id).await?;
        Self::tier_for_level(conn, profile.subscription_level).await
    }

    pub async fn get_profile(&self, user: &AuthenticatedUser) -> AppResult<ProfileResponse> {
        let profile = Self::ensure_profile(&self.pool, user.id).await?;
        let tier = Self::tier_for_user(&self.pool, user.id).await?;
        let usage = CreditService::snapshot(&self.pool, user.id).await?;
        let saved_stories = stories::Entity::find()
            .filter(stories::Column::AuthorId.eq(user.id))
            .count(&self.pool)
            .await?;

        Ok(ProfileResponse {
            user_id: user.id,
            email: user.email.clone(),
            is_admin: profile.is_admin,
            tier: TierResponse::from(tier),
            usage,
            saved_stories,
        })
    }

    /// 非管理员返回 Forbidden
    pub async fn require_admin(&self, user: &AuthenticatedUser) -> AppResult<()> {
        let profile = Self::ensure_profile(&self.pool, user.id).await?;
        if !profile.is_admin {
            log::warn!("User {} attempted an admin operation", user.id);
            return Err(AppError::Forbidden);
        }
        Ok(())
    }

    /// 管理员：修改用户套餐等级
    pub async fn set_user_tier(&self, user_id: Uuid, level: i32) -> AppResult<ProfileResponse> {
        if tiers::Entity::find_by_id(level).one(&self.pool).await?.is_none() {
            return Err(AppError::ValidationError(format!(
                "Unknown subscription level {level}"
            )));
        }

        let profile = Self::ensure_profile(&self.pool, user_id).await?;
        let mut am = profile.into_active_model();
        am.subscription_level = Set(level);
        am.updated_at = Set(Some(Utc::now()));
        am.update(&self.pool).await?;

        log::info!("User {user_id} moved to subscription level {level}");
        self.get_profile(&AuthenticatedUser {
            id: user_id,
            email: None,
        })
        .await
    }
}

// SQLite 没有行锁，查询构建器会省略 FOR UPDATE
fn locked_profile_query(user_id: Uuid) -> Select<profiles::Entity> {
    profiles::Entity::find_by_id(user_id).lock_exclusive()
}
