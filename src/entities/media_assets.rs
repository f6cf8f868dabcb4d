use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    #[sea_orm(string_value = "audio")]
    Audio,
    #[sea_orm(string_value = "image")]
    Image,
    #[sea_orm(string_value = "video")]
    Video,
    #[sea_orm(string_value = "pdf")]
    Pdf,
}

impl MediaKind {
    /// 上传到对象存储时使用的扩展名与 Content-Type；图片由供应商托管，不上传
    pub fn file_format(&self) -> Option<(&'static str, &'static str)> {
        match self {
            MediaKind::Audio => Some(("mp3", "audio/mpeg")),
            MediaKind::Video => Some(("mp4", "video/mp4")),
            MediaKind::Pdf => Some(("pdf", "application/pdf")),
            MediaKind::Image => None,
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::Pdf => write!(f, "pdf"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "media_assets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub story_id: Option<i32>,
    pub user_id: Uuid,
    pub kind: MediaKind,
    #[sea_orm(column_type = "Text")]
    pub url: String,
    /// 对象存储中的路径 (bucket/path)，供应商托管的图片为空
    pub storage_path: Option<String>,
    /// 生成参数（voice / style / prompt）
    pub details: Option<String>,
    pub credits_used: i32,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
