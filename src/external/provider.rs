//! Provider seams. Each workflow talks to these traits; the concrete HTTP
//! clients live in the sibling modules.

use crate::entities::ImageProviderKind;
use crate::error::AppResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 生成故事的输入
#[derive(Debug, Clone)]
pub struct StoryRequest {
    pub prompt: String,
    pub age_group: String,
    pub genre: String,
    pub moral: Option<String>,
    pub language: String,
    pub characters: Option<String>,
    pub setting: Option<String>,
}

/// 文本供应商返回的故事正文（也用于翻译的输入输出）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryText {
    pub title: String,
    pub content: String,
    pub moral: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoComposition {
    pub story_id: i32,
    pub title: String,
    pub text: String,
    pub image_urls: Vec<String>,
    pub narration_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PdfDocument {
    pub story_id: i32,
    pub title: String,
    pub content: String,
    pub moral: String,
    pub age_group: String,
    pub image_urls: Vec<String>,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_story(&self, request: &StoryRequest) -> AppResult<StoryText>;
    async fn translate_story(&self, story: &StoryText, target_language: &str)
    -> AppResult<StoryText>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    fn kind(&self) -> ImageProviderKind;
    /// 返回供应商托管的图片 URL
    async fn generate_image(&self, prompt: &str) -> AppResult<String>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// 返回 MP3 字节
    async fn synthesize(&self, text: &str, voice: &str) -> AppResult<Vec<u8>>;
}

#[async_trait]
pub trait MediaRenderer: Send + Sync {
    /// 返回 MP4 字节
    async fn compose_video(&self, composition: &VideoComposition) -> AppResult<Vec<u8>>;
    /// 返回 PDF 字节
    async fn render_pdf(&self, document: &PdfDocument) -> AppResult<Vec<u8>>;
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// 上传对象并返回公开访问 URL
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> AppResult<String>;
    async fn remove(&self, bucket: &str, path: &str) -> AppResult<()>;
}

/// 两个图片后端，按请求从配置中选择其一
#[derive(Clone)]
pub struct ImageProviders {
    openai: Arc<dyn ImageGenerator>,
    runware: Arc<dyn ImageGenerator>,
}

impl ImageProviders {
    pub fn new(openai: Arc<dyn ImageGenerator>, runware: Arc<dyn ImageGenerator>) -> Self {
        Self { openai, runware }
    }

    pub fn select(&self, kind: ImageProviderKind) -> Arc<dyn ImageGenerator> {
        match kind {
            ImageProviderKind::OpenAi => self.openai.clone(),
            ImageProviderKind::Runware => self.runware.clone(),
        }
    }
}

/// 所有外部供应商的句柄
#[derive(Clone)]
pub struct Providers {
    pub text: Arc<dyn TextGenerator>,
    pub images: ImageProviders,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub renderer: Arc<dyn MediaRenderer>,
    pub storage: Arc<dyn ArtifactStore>,
}
