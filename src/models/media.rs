use crate::entities::{MediaKind, media_asset_entity, story_translation_entity};
use crate::models::UsageResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NarrateRequest {
    pub story_id: i32,
    /// 默认 alloy
    #[schema(example = "nova")]
    pub voice: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IllustrateRequest {
    pub story_id: Option<i32>,
    #[schema(example = "a hedgehog singing on a stage")]
    pub prompt: String,
    #[schema(example = "watercolor")]
    pub style: Option<String>,
}

/// 视频 / PDF 只需要故事 ID
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoryMediaRequest {
    pub story_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    pub story_id: i32,
    #[schema(example = "es")]
    pub target_language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaAssetResponse {
    pub id: i32,
    pub story_id: Option<i32>,
    pub kind: MediaKind,
    pub url: String,
    pub details: Option<String>,
    pub credits_used: i32,
    pub created_at: DateTime<Utc>,
}

impl From<media_asset_entity::Model> for MediaAssetResponse {
    fn from(m: media_asset_entity::Model) -> Self {
        Self {
            id: m.id,
            story_id: m.story_id,
            kind: m.kind,
            url: m.url,
            details: m.details,
            credits_used: m.credits_used,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedAssetResponse {
    pub asset: MediaAssetResponse,
    pub usage: UsageResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResponse {
    pub id: i32,
    pub story_id: i32,
    pub language: String,
    pub title: String,
    pub content: String,
    pub moral: String,
    pub credits_used: i32,
    pub created_at: DateTime<Utc>,
}

impl From<story_translation_entity::Model> for TranslationResponse {
    fn from(m: story_translation_entity::Model) -> Self {
        Self {
            id: m.id,
            story_id: m.story_id,
            language: m.language,
            title: m.title,
            content: m.content,
            moral: m.moral,
            credits_used: m.credits_used,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTranslationResponse {
    pub translation: TranslationResponse,
    pub usage: UsageResponse,
}
