use super::{MediaRenderer, PdfDocument, VideoComposition, check_status, read_bytes};
use crate::config::RendererConfig;
use crate::error::AppResult;
use crate::utils::RetryPolicy;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

const PROVIDER: &str = "Media renderer";

/// 外部视频 / PDF 合成服务 (`POST /video`, `POST /pdf`)，返回二进制文件
#[derive(Clone)]
pub struct RendererClient {
    http: Client,
    config: RendererConfig,
    retry: RetryPolicy,
}

impl RendererClient {
    pub fn new(config: RendererConfig, retry: RetryPolicy) -> Self {
        Self {
            http: Client::new(),
            config,
            retry,
        }
    }

    async fn render<T: Serialize + Sync>(&self, label: &str, path: &str, payload: &T) -> AppResult<Vec<u8>> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        let url = url.as_str();

        self.retry
            .run(label, move || async move {
                let mut request = self.http.post(url).json(payload);
                if let Some(key) = self.config.api_key.as_deref() {
                    request = request.bearer_auth(key);
                }
                let response = check_status(PROVIDER, request.send().await?).await?;
                read_bytes(PROVIDER, response).await
            })
            .await
    }
}

#[async_trait]
impl MediaRenderer for RendererClient {
    async fn compose_video(&self, composition: &VideoComposition) -> AppResult<Vec<u8>> {
        self.render("Video composition", "video", composition).await
    }

    async fn render_pdf(&self, document: &PdfDocument) -> AppResult<Vec<u8>> {
        self.render("PDF rendering", "pdf", document).await
    }
}
