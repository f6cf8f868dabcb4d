use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const IMAGE_PROVIDER_KEY: &str = "image_provider";

/// 图片生成后端
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImageProviderKind {
    #[default]
    OpenAi,
    Runware,
}

impl ImageProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageProviderKind::OpenAi => "openai",
            ImageProviderKind::Runware => "runware",
        }
    }
}

impl std::fmt::Display for ImageProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ImageProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ImageProviderKind::OpenAi),
            "runware" => Ok(ImageProviderKind::Runware),
            other => Err(format!("Unknown image provider: {other}")),
        }
    }
}

/// 管理员可修改的全局配置 (key/value)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "app_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    #[sea_orm(column_type = "Text")]
    pub value: String,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
