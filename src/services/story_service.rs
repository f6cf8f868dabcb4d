use crate::entities::{
    media_asset_entity as assets, story_entity as stories, story_translation_entity as translations,
};
use crate::error::{AppError, AppResult};
use crate::external::{ArtifactStore, Providers, StoryRequest};
use crate::middlewares::AuthenticatedUser;
use crate::models::{
    CreateStoryRequest, GenerateStoryRequest, GeneratedStoryResponse, PaginatedResponse,
    PaginationParams, StoryQuery, StoryResponse,
};
use crate::services::{AccountService, CreditService};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

const DEFAULT_LANGUAGE: &str = "en";

#[derive(Clone)]
pub struct StoryService {
    pool: DatabaseConnection,
    credit_service: CreditService,
    providers: Providers,
}

impl StoryService {
    pub fn new(pool: DatabaseConnection, credit_service: CreditService, providers: Providers) -> Self {
        Self {
            pool,
            credit_service,
            providers,
        }
    }

    /// 生成故事
    ///
    /// 逻辑:
    /// 1. 校验保存数量上限与剩余额度（不满足时不调用供应商）
    /// 2. 调用文本供应商
    /// 3. 同一事务内扣费并写入故事
    pub async fn generate_story(
        &self,
        user: &AuthenticatedUser,
        req: GenerateStoryRequest,
    ) -> AppResult<GeneratedStoryResponse> {
        let prompt = required("prompt", &req.prompt)?;
        let age_group = required("ageGroup", &req.age_group)?;
        let genre = required("genre", &req.genre)?;
        let language = language_or_default(req.language.as_deref());

        Self::ensure_story_capacity(&self.pool, user.id).await?;
        let cost = self.credit_service.costs().story;
        self.credit_service.ensure_available(user, cost).await?;

        let request = StoryRequest {
            prompt: prompt.clone(),
            age_group: age_group.clone(),
            genre: genre.clone(),
            moral: optional(req.moral),
            language: language.clone(),
            characters: optional(req.characters),
            setting: optional(req.setting),
        };
        let text = self.providers.text.generate_story(&request).await?;

        let txn = self.pool.begin().await?;
        Self::ensure_story_capacity(&txn, user.id).await?;
        CreditService::charge(&txn, user.id, cost).await?;
        let story = stories::ActiveModel {
            author_id: Set(user.id),
            title: Set(text.title),
            content: Set(text.content),
            moral: Set(text.moral),
            age_group: Set(age_group),
            genre: Set(genre),
            language: Set(language),
            characters: Set(request.characters),
            setting: Set(request.setting),
            prompt: Set(Some(prompt)),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        let usage = CreditService::snapshot(&txn, user.id).await?;
        txn.commit().await?;

        log::info!("User {} generated story {}", user.id, story.id);
        Ok(GeneratedStoryResponse {
            story: story.into(),
            usage,
        })
    }

    /// 手动保存故事，不扣额度，但受保存数量上限约束
    pub async fn create_story(
        &self,
        user: &AuthenticatedUser,
        req: CreateStoryRequest,
    ) -> AppResult<StoryResponse> {
        let title = required("title", &req.title)?;
        let content = required("content", &req.content)?;
        let age_group = required("ageGroup", &req.age_group)?;
        let genre = required("genre", &req.genre)?;

        let txn = self.pool.begin().await?;
        Self::ensure_story_capacity(&txn, user.id).await?;
        let story = stories::ActiveModel {
            author_id: Set(user.id),
            title: Set(title),
            content: Set(content),
            moral: Set(req.moral),
            age_group: Set(age_group),
            genre: Set(genre),
            language: Set(language_or_default(req.language.as_deref())),
            characters: Set(optional(req.characters)),
            setting: Set(optional(req.setting)),
            prompt: Set(None),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        log::info!("User {} saved story {}", user.id, story.id);
        Ok(story.into())
    }

    pub async fn get_story(&self, user: &AuthenticatedUser, story_id: i32) -> AppResult<StoryResponse> {
        let story = Self::find_owned(&self.pool, user.id, story_id).await?;
        Ok(story.into())
    }

    pub async fn list_stories(
        &self,
        user: &AuthenticatedUser,
        query: &StoryQuery,
    ) -> AppResult<PaginatedResponse<StoryResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let base_query = stories::Entity::find().filter(stories::Column::AuthorId.eq(user.id));

        let total = base_query.clone().count(&self.pool).await?;
        let items = base_query
            .order_by_desc(stories::Column::CreatedAt)
            .order_by_desc(stories::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            items.into_iter().map(Into::into).collect(),
            &params,
            total,
        ))
    }

    /// 删除故事及其媒体与译文；对象存储中的文件尽力删除，不退还额度
    pub async fn delete_story(&self, user: &AuthenticatedUser, story_id: i32) -> AppResult<()> {
        let story = Self::find_owned(&self.pool, user.id, story_id).await?;

        let txn = self.pool.begin().await?;
        let stored: Vec<String> = assets::Entity::find()
            .filter(assets::Column::StoryId.eq(story_id))
            .all(&txn)
            .await?
            .into_iter()
            .filter_map(|a| a.storage_path)
            .collect();
        assets::Entity::delete_many()
            .filter(assets::Column::StoryId.eq(story_id))
            .exec(&txn)
            .await?;
        translations::Entity::delete_many()
            .filter(translations::Column::StoryId.eq(story_id))
            .exec(&txn)
            .await?;
        story.delete(&txn).await?;
        txn.commit().await?;

        for storage_path in &stored {
            remove_stored_object(self.providers.storage.as_ref(), storage_path).await;
        }
        log::info!("User {} deleted story {story_id}", user.id);
        Ok(())
    }

    /// 读取属于该用户的故事：不存在返回 NotFound，不属于该用户返回 Forbidden
    pub async fn find_owned<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        story_id: i32,
    ) -> AppResult<stories::Model> {
        let story = stories::Entity::find_by_id(story_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Story {story_id} not found")))?;
        if story.author_id != user_id {
            return Err(AppError::Forbidden);
        }
        Ok(story)
    }

    /// 在事务内调用时先锁住资料行，并发保存不会越过上限
    async fn ensure_story_capacity<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<()> {
        let profile = AccountService::lock_profile(conn, user_id).await?;
        let tier = AccountService::tier_for_level(conn, profile.subscription_level).await?;
        let saved = stories::Entity::find()
            .filter(stories::Column::AuthorId.eq(user_id))
            .count(conn)
            .await?;
        if saved >= tier.saved_stories_limit.max(0) as u64 {
            log::warn!(
                "User {user_id} reached the saved story limit of {}",
                tier.saved_stories_limit
            );
            return Err(AppError::StoryLimitReached {
                limit: tier.saved_stories_limit,
            });
        }
        Ok(())
    }
}

/// 删除 `bucket/path` 形式的存储对象，失败只记录日志
pub(crate) async fn remove_stored_object(storage: &dyn ArtifactStore, storage_path: &str) {
    let Some((bucket, path)) = storage_path.split_once('/') else {
        log::warn!("Malformed storage path {storage_path}");
        return;
    };
    if let Err(e) = storage.remove(bucket, path).await {
        log::warn!("Failed to remove stored object {storage_path}: {e}");
    }
}

/// 非空校验，原样返回（故事正文按用户提交的内容保存）
fn required(field: &str, value: &str) -> AppResult<String> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn language_or_default(language: Option<&str>) -> String {
    language
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LANGUAGE)
        .to_string()
}
