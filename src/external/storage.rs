use super::{ArtifactStore, check_status};
use crate::config::StorageConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;

/// 托管平台的对象存储 REST 接口
#[derive(Clone)]
pub struct ObjectStorageClient {
    http: Client,
    config: StorageConfig,
}

impl ObjectStorageClient {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{bucket}/{path}", self.base())
    }
}

#[async_trait]
impl ArtifactStore for ObjectStorageClient {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> AppResult<String> {
        let url = format!("{}/storage/v1/object/{bucket}/{path}", self.base());
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.service_key)
            .header("Content-Type", content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::StorageError(format!("upload to {bucket}/{path} failed: {e}")))?;
        check_status("Object storage", response)
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))?;
        Ok(self.public_url(bucket, path))
    }

    async fn remove(&self, bucket: &str, path: &str) -> AppResult<()> {
        let url = format!("{}/storage/v1/object/{bucket}/{path}", self.base());
        let response = self
            .http
            .delete(&url)
            .bearer_auth(&self.config.service_key)
            .send()
            .await
            .map_err(|e| AppError::StorageError(format!("delete of {bucket}/{path} failed: {e}")))?;
        check_status("Object storage", response)
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))?;
        Ok(())
    }
}
