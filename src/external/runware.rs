use super::{ImageGenerator, check_status, read_json};
use crate::config::RunwareConfig;
use crate::entities::ImageProviderKind;
use crate::error::{AppError, AppResult};
use crate::utils::RetryPolicy;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

const PROVIDER: &str = "Runware";

#[derive(Debug, Deserialize)]
struct RunwareResponse {
    #[serde(default)]
    data: Vec<RunwareImage>,
    #[serde(default)]
    errors: Vec<RunwareError>,
}

#[derive(Debug, Deserialize)]
struct RunwareImage {
    #[serde(rename = "taskUUID")]
    task_uuid: Option<String>,
    #[serde(rename = "imageURL")]
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunwareError {
    #[serde(default)]
    message: String,
}

/// Runware `imageInference` 任务
#[derive(Clone)]
pub struct RunwareClient {
    http: Client,
    config: RunwareConfig,
    retry: RetryPolicy,
}

impl RunwareClient {
    pub fn new(config: RunwareConfig, retry: RetryPolicy) -> Self {
        Self {
            http: Client::new(),
            config,
            retry,
        }
    }
}

#[async_trait]
impl ImageGenerator for RunwareClient {
    fn kind(&self) -> ImageProviderKind {
        ImageProviderKind::Runware
    }

    async fn generate_image(&self, prompt: &str) -> AppResult<String> {
        let task_uuid = Uuid::new_v4().to_string();
        let body = json!([{
            "taskType": "imageInference",
            "taskUUID": task_uuid,
            "positivePrompt": prompt,
            "model": self.config.model,
            "width": 1024,
            "height": 1024,
            "numberResults": 1,
            "outputType": "URL",
        }]);
        let body = &body;

        let result: RunwareResponse = self
            .retry
            .run("Runware image inference", move || async move {
                let response = self
                    .http
                    .post(&self.config.base_url)
                    .bearer_auth(&self.config.api_key)
                    .json(body)
                    .send()
                    .await?;
                let response = check_status(PROVIDER, response).await?;
                read_json(PROVIDER, response).await
            })
            .await?;

        extract_image_url(result, &task_uuid)
    }
}

fn extract_image_url(result: RunwareResponse, task_uuid: &str) -> AppResult<String> {
    if !result.errors.is_empty() {
        let messages: Vec<String> = result.errors.into_iter().map(|e| e.message).collect();
        return Err(AppError::ProviderError(format!(
            "{PROVIDER} rejected the task: {}",
            messages.join("; ")
        )));
    }
    result
        .data
        .into_iter()
        .filter(|img| img.task_uuid.as_deref().is_none_or(|id| id == task_uuid))
        .find_map(|img| img.image_url)
        .ok_or_else(|| AppError::ProviderError(format!("{PROVIDER} returned no image URL")))
}
