use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 月度用量计数器，(user_id, month_key) 唯一
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "usage_counters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    /// UTC 月份, 格式 YYYY-MM
    #[sea_orm(primary_key, auto_increment = false)]
    pub month_key: String,
    pub credits_used: i32,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
