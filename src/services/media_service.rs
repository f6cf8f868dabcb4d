use crate::config::StorageConfig;
use crate::entities::{MediaKind, media_asset_entity as assets, story_entity as stories};
use crate::error::{AppError, AppResult};
use crate::external::{PdfDocument, Providers, SUPPORTED_VOICES, StoryText, VideoComposition};
use crate::middlewares::AuthenticatedUser;
use crate::models::{
    GeneratedAssetResponse, IllustrateRequest, MediaAssetResponse, NarrateRequest,
    StoryMediaRequest,
};
use crate::services::story_service::remove_stored_object;
use crate::services::{CreditService, SettingsService, StoryService};
use crate::utils::prompt::{image_prompt, narration_text};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

pub const DEFAULT_VOICE: &str = "alloy";

/// 待写入的媒体记录
struct PendingAsset {
    story_id: Option<i32>,
    kind: MediaKind,
    details: Option<String>,
    cost: i32,
}

#[derive(Clone)]
pub struct MediaService {
    pool: DatabaseConnection,
    credit_service: CreditService,
    settings_service: SettingsService,
    providers: Providers,
    storage: StorageConfig,
}

impl MediaService {
    pub fn new(
        pool: DatabaseConnection,
        credit_service: CreditService,
        settings_service: SettingsService,
        providers: Providers,
        storage: StorageConfig,
    ) -> Self {
        Self {
            pool,
            credit_service,
            settings_service,
            providers,
            storage,
        }
    }

    /// 朗读故事，生成 MP3
    pub async fn narrate(
        &self,
        user: &AuthenticatedUser,
        req: NarrateRequest,
    ) -> AppResult<GeneratedAssetResponse> {
        let voice = match req.voice.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            None => DEFAULT_VOICE.to_string(),
            Some(v) => {
                let v = v.to_ascii_lowercase();
                if !SUPPORTED_VOICES.contains(&v.as_str()) {
                    return Err(AppError::ValidationError(format!(
                        "Unsupported voice {v}, expected one of {}",
                        SUPPORTED_VOICES.join(", ")
                    )));
                }
                v
            }
        };

        let story = StoryService::find_owned(&self.pool, user.id, req.story_id).await?;
        let cost = self.credit_service.costs().audio;
        self.credit_service.ensure_available(user, cost).await?;

        let text = narration_text(&story_text(&story));
        let audio = self.providers.speech.synthesize(&text, &voice).await?;

        let pending = PendingAsset {
            story_id: Some(story.id),
            kind: MediaKind::Audio,
            details: Some(json!({ "voice": voice }).to_string()),
            cost,
        };
        self.persist_upload(user, pending, &self.storage.audio_bucket, audio)
            .await
    }

    /// 生成插图。图片由供应商托管，直接保存 URL
    pub async fn illustrate(
        &self,
        user: &AuthenticatedUser,
        req: IllustrateRequest,
    ) -> AppResult<GeneratedAssetResponse> {
        if req.prompt.trim().is_empty() {
            return Err(AppError::ValidationError("prompt is required".into()));
        }
        if let Some(story_id) = req.story_id {
            StoryService::find_owned(&self.pool, user.id, story_id).await?;
        }
        let cost = self.credit_service.costs().image;
        self.credit_service.ensure_available(user, cost).await?;

        // 每个请求只读取一次后端配置
        let provider_kind = self.settings_service.image_provider().await?;
        let generator = self.providers.images.select(provider_kind);
        let prompt = image_prompt(&req.prompt, req.style.as_deref());
        let url = generator.generate_image(&prompt).await?;

        let pending = PendingAsset {
            story_id: req.story_id,
            kind: MediaKind::Image,
            details: Some(
                json!({
                    "provider": generator.kind().as_str(),
                    "prompt": req.prompt,
                    "style": req.style,
                })
                .to_string(),
            ),
            cost,
        };
        self.record_asset(user, &pending, url, None).await
    }

    /// 合成视频：至少需要一张插图，有朗读音频时使用最新的一条
    pub async fn compose_video(
        &self,
        user: &AuthenticatedUser,
        req: StoryMediaRequest,
    ) -> AppResult<GeneratedAssetResponse> {
        let story = StoryService::find_owned(&self.pool, user.id, req.story_id).await?;
        let image_urls = self.image_urls(story.id).await?;
        if image_urls.is_empty() {
            return Err(AppError::ValidationError(
                "Story needs at least one illustration before a video can be composed".into(),
            ));
        }
        let narration_url = assets::Entity::find()
            .filter(assets::Column::StoryId.eq(story.id))
            .filter(assets::Column::Kind.eq(MediaKind::Audio))
            .order_by_desc(assets::Column::Id)
            .one(&self.pool)
            .await?
            .map(|a| a.url);

        let cost = self.credit_service.costs().video;
        self.credit_service.ensure_available(user, cost).await?;

        let composition = VideoComposition {
            story_id: story.id,
            title: story.title.clone(),
            text: narration_text(&story_text(&story)),
            image_urls,
            narration_url,
        };
        let video = self.providers.renderer.compose_video(&composition).await?;

        let pending = PendingAsset {
            story_id: Some(story.id),
            kind: MediaKind::Video,
            details: Some(
                json!({
                    "images": composition.image_urls.len(),
                    "narrated": composition.narration_url.is_some(),
                })
                .to_string(),
            ),
            cost,
        };
        self.persist_upload(user, pending, &self.storage.video_bucket, video)
            .await
    }

    /// 导出 PDF，包含故事已有的插图
    pub async fn render_pdf(
        &self,
        user: &AuthenticatedUser,
        req: StoryMediaRequest,
    ) -> AppResult<GeneratedAssetResponse> {
        let story = StoryService::find_owned(&self.pool, user.id, req.story_id).await?;
        let image_urls = self.image_urls(story.id).await?;

        let cost = self.credit_service.costs().pdf;
        self.credit_service.ensure_available(user, cost).await?;

        let document = PdfDocument {
            story_id: story.id,
            title: story.title,
            content: story.content,
            moral: story.moral,
            age_group: story.age_group,
            image_urls,
        };
        let pdf = self.providers.renderer.render_pdf(&document).await?;

        let pending = PendingAsset {
            story_id: Some(document.story_id),
            kind: MediaKind::Pdf,
            details: None,
            cost,
        };
        self.persist_upload(user, pending, &self.storage.pdf_bucket, pdf)
            .await
    }

    pub async fn list_assets(
        &self,
        user: &AuthenticatedUser,
        story_id: i32,
    ) -> AppResult<Vec<MediaAssetResponse>> {
        StoryService::find_owned(&self.pool, user.id, story_id).await?;
        let list = assets::Entity::find()
            .filter(assets::Column::StoryId.eq(story_id))
            .order_by_asc(assets::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    /// 删除媒体，不退还额度
    pub async fn delete_asset(&self, user: &AuthenticatedUser, asset_id: i32) -> AppResult<()> {
        let asset = assets::Entity::find_by_id(asset_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset {asset_id} not found")))?;
        if asset.user_id != user.id {
            return Err(AppError::Forbidden);
        }

        let storage_path = asset.storage_path.clone();
        asset.delete(&self.pool).await?;
        if let Some(storage_path) = storage_path {
            remove_stored_object(self.providers.storage.as_ref(), &storage_path).await;
        }
        log::info!("User {} deleted asset {asset_id}", user.id);
        Ok(())
    }

    async fn image_urls(&self, story_id: i32) -> AppResult<Vec<String>> {
        let images = assets::Entity::find()
            .filter(assets::Column::StoryId.eq(story_id))
            .filter(assets::Column::Kind.eq(MediaKind::Image))
            .order_by_asc(assets::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(images.into_iter().map(|a| a.url).collect())
    }

    /// 先上传，再在事务中扣费并写记录；事务失败时尽力删除已上传的对象
    async fn persist_upload(
        &self,
        user: &AuthenticatedUser,
        pending: PendingAsset,
        bucket: &str,
        bytes: Vec<u8>,
    ) -> AppResult<GeneratedAssetResponse> {
        let (extension, content_type) = pending.kind.file_format().ok_or_else(|| {
            AppError::InternalError(format!("{} assets are not uploaded", pending.kind))
        })?;
        let story_segment = pending
            .story_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "unassigned".to_string());
        let path = format!("{}/{story_segment}/{}.{extension}", user.id, Uuid::new_v4());

        let url = self
            .providers
            .storage
            .upload(bucket, &path, content_type, bytes)
            .await?;

        let storage_path = format!("{bucket}/{path}");
        match self
            .record_asset(user, &pending, url, Some(storage_path.clone()))
            .await
        {
            Ok(response) => Ok(response),
            Err(e) => {
                log::warn!("Discarding uploaded object {storage_path}: {e}");
                remove_stored_object(self.providers.storage.as_ref(), &storage_path).await;
                Err(e)
            }
        }
    }

    async fn record_asset(
        &self,
        user: &AuthenticatedUser,
        pending: &PendingAsset,
        url: String,
        storage_path: Option<String>,
    ) -> AppResult<GeneratedAssetResponse> {
        let txn = self.pool.begin().await?;
        CreditService::charge(&txn, user.id, pending.cost).await?;
        let asset = assets::ActiveModel {
            story_id: Set(pending.story_id),
            user_id: Set(user.id),
            kind: Set(pending.kind),
            url: Set(url),
            storage_path: Set(storage_path),
            details: Set(pending.details.clone()),
            credits_used: Set(pending.cost),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        let usage = CreditService::snapshot(&txn, user.id).await?;
        txn.commit().await?;

        log::info!(
            "User {} created {} asset {} for {} credits",
            user.id,
            asset.kind,
            asset.id,
            pending.cost
        );
        Ok(GeneratedAssetResponse {
            asset: asset.into(),
            usage,
        })
    }
}

fn story_text(story: &stories::Model) -> StoryText {
    StoryText {
        title: story.title.clone(),
        content: story.content.clone(),
        moral: story.moral.clone(),
    }
}
