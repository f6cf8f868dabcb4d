use crate::entities::{IMAGE_PROVIDER_KEY, ImageProviderKind, app_setting_entity as settings};
use crate::error::AppResult;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

#[derive(Clone)]
pub struct SettingsService {
    pool: DatabaseConnection,
    default_image_provider: ImageProviderKind,
}

impl SettingsService {
    pub fn new(pool: DatabaseConnection, default_image_provider: ImageProviderKind) -> Self {
        Self {
            pool,
            default_image_provider,
        }
    }

    /// 当前图片后端；未设置或值无法识别时使用配置文件中的默认值
    pub async fn image_provider(&self) -> AppResult<ImageProviderKind> {
        let row = settings::Entity::find_by_id(IMAGE_PROVIDER_KEY.to_string())
            .one(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(self.default_image_provider);
        };
        match row.value.parse() {
            Ok(kind) => Ok(kind),
            Err(e) => {
                log::warn!("Ignoring stored image provider setting: {e}");
                Ok(self.default_image_provider)
            }
        }
    }

    pub async fn set_image_provider(&self, kind: ImageProviderKind) -> AppResult<ImageProviderKind> {
        settings::Entity::insert(settings::ActiveModel {
            key: Set(IMAGE_PROVIDER_KEY.to_string()),
            value: Set(kind.as_str().to_string()),
            updated_at: Set(Some(Utc::now())),
        })
        .on_conflict(
            OnConflict::column(settings::Column::Key)
                .update_columns([settings::Column::Value, settings::Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(&self.pool)
        .await?;

        log::info!("Image provider set to {kind}");
        Ok(kind)
    }
}
