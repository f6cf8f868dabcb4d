use crate::entities::story_entity;
use crate::models::UsageResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateStoryRequest {
    #[schema(example = "a shy hedgehog who joins the school choir")]
    pub prompt: String,
    #[schema(example = "4-6")]
    pub age_group: String,
    #[schema(example = "fable")]
    pub genre: String,
    pub moral: Option<String>,
    #[schema(example = "en")]
    pub language: Option<String>,
    pub characters: Option<String>,
    pub setting: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoryRequest {
    pub title: String,
    pub content: String,
    pub moral: String,
    pub age_group: String,
    pub genre: String,
    pub language: Option<String>,
    pub characters: Option<String>,
    pub setting: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoryResponse {
    pub id: i32,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub moral: String,
    pub age_group: String,
    pub genre: String,
    pub language: String,
    pub characters: Option<String>,
    pub setting: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<story_entity::Model> for StoryResponse {
    fn from(m: story_entity::Model) -> Self {
        Self {
            id: m.id,
            author_id: m.author_id,
            title: m.title,
            content: m.content,
            moral: m.moral,
            age_group: m.age_group,
            genre: m.genre,
            language: m.language,
            characters: m.characters,
            setting: m.setting,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedStoryResponse {
    pub story: StoryResponse,
    pub usage: UsageResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoryQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
