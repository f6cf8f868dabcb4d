use crate::entities::story_translation_entity as translations;
use crate::error::{AppError, AppResult};
use crate::external::{Providers, StoryText};
use crate::middlewares::AuthenticatedUser;
use crate::models::{GeneratedTranslationResponse, TranslateRequest, TranslationResponse};
use crate::services::{CreditService, StoryService};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

const MAX_LANGUAGE_LEN: usize = 32;

#[derive(Clone)]
pub struct TranslationService {
    pool: DatabaseConnection,
    credit_service: CreditService,
    providers: Providers,
}

impl TranslationService {
    pub fn new(pool: DatabaseConnection, credit_service: CreditService, providers: Providers) -> Self {
        Self {
            pool,
            credit_service,
            providers,
        }
    }

    /// 翻译故事。每次调用都会生成新的译文并扣费，不做去重
    pub async fn translate(
        &self,
        user: &AuthenticatedUser,
        req: TranslateRequest,
    ) -> AppResult<GeneratedTranslationResponse> {
        let language = req.target_language.trim().to_string();
        if language.is_empty() || language.chars().count() > MAX_LANGUAGE_LEN {
            return Err(AppError::ValidationError(
                "targetLanguage must be between 1 and 32 characters".into(),
            ));
        }

        let story = StoryService::find_owned(&self.pool, user.id, req.story_id).await?;
        let cost = self.credit_service.costs().translation;
        self.credit_service.ensure_available(user, cost).await?;

        let source = StoryText {
            title: story.title,
            content: story.content,
            moral: story.moral,
        };
        let translated = self
            .providers
            .text
            .translate_story(&source, &language)
            .await?;

        let txn = self.pool.begin().await?;
        CreditService::charge(&txn, user.id, cost).await?;
        let translation = translations::ActiveModel {
            story_id: Set(story.id),
            user_id: Set(user.id),
            language: Set(language),
            title: Set(translated.title),
            content: Set(translated.content),
            moral: Set(translated.moral),
            credits_used: Set(cost),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        let usage = CreditService::snapshot(&txn, user.id).await?;
        txn.commit().await?;

        log::info!(
            "User {} translated story {} to {}",
            user.id,
            story.id,
            translation.language
        );
        Ok(GeneratedTranslationResponse {
            translation: translation.into(),
            usage,
        })
    }

    pub async fn list_translations(
        &self,
        user: &AuthenticatedUser,
        story_id: i32,
    ) -> AppResult<Vec<TranslationResponse>> {
        StoryService::find_owned(&self.pool, user.id, story_id).await?;
        let list = translations::Entity::find()
            .filter(translations::Column::StoryId.eq(story_id))
            .order_by_asc(translations::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }
}
