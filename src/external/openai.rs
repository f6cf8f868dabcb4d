use super::{ImageGenerator, SpeechSynthesizer, StoryRequest, StoryText, TextGenerator};
use super::{check_status, read_bytes, read_json};
use crate::config::OpenAiConfig;
use crate::entities::ImageProviderKind;
use crate::error::{AppError, AppResult};
use crate::utils::RetryPolicy;
use crate::utils::prompt::{
    STORY_SYSTEM_PROMPT, TRANSLATION_SYSTEM_PROMPT, story_prompt, translation_prompt,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

const PROVIDER: &str = "OpenAI";

/// `/audio/speech` 支持的音色
pub const SUPPORTED_VOICES: &[&str] = &["alloy", "echo", "fable", "onyx", "nova", "shimmer"];

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}

/// OpenAI 兼容接口：chat completions / images / speech
#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    config: OpenAiConfig,
    retry: RetryPolicy,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig, retry: RetryPolicy) -> Self {
        Self {
            http: Client::new(),
            config,
            retry,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn chat_json(&self, system: &str, user: String) -> AppResult<StoryText> {
        let url = self.url("chat/completions");
        let body = json!({
            "model": self.config.chat_model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.8,
        });
        let (url, body) = (url.as_str(), &body);

        let completion: ChatCompletion = self
            .retry
            .run("OpenAI chat completion", move || async move {
                let response = self
                    .http
                    .post(url)
                    .bearer_auth(&self.config.api_key)
                    .json(body)
                    .send()
                    .await?;
                let response = check_status(PROVIDER, response).await?;
                read_json(PROVIDER, response).await
            })
            .await?;

        parse_story_text(completion)
    }
}

fn parse_story_text(completion: ChatCompletion) -> AppResult<StoryText> {
    let content = completion
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| AppError::ProviderError(format!("{PROVIDER} returned no choices")))?;

    let story: StoryText = serde_json::from_str(&content).map_err(|e| {
        AppError::ProviderError(format!("{PROVIDER} returned a malformed story: {e}"))
    })?;

    if story.title.trim().is_empty() || story.content.trim().is_empty() {
        return Err(AppError::ProviderError(format!(
            "{PROVIDER} returned an empty story"
        )));
    }
    Ok(story)
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate_story(&self, request: &StoryRequest) -> AppResult<StoryText> {
        self.chat_json(STORY_SYSTEM_PROMPT, story_prompt(request)).await
    }

    async fn translate_story(
        &self,
        story: &StoryText,
        target_language: &str,
    ) -> AppResult<StoryText> {
        self.chat_json(
            TRANSLATION_SYSTEM_PROMPT,
            translation_prompt(story, target_language),
        )
        .await
    }
}

#[async_trait]
impl ImageGenerator for OpenAiClient {
    fn kind(&self) -> ImageProviderKind {
        ImageProviderKind::OpenAi
    }

    async fn generate_image(&self, prompt: &str) -> AppResult<String> {
        let url = self.url("images/generations");
        let body = json!({
            "model": self.config.image_model,
            "prompt": prompt,
            "n": 1,
            "size": "1024x1024",
            "response_format": "url",
        });
        let (url, body) = (url.as_str(), &body);

        let images: ImagesResponse = self
            .retry
            .run("OpenAI image generation", move || async move {
                let response = self
                    .http
                    .post(url)
                    .bearer_auth(&self.config.api_key)
                    .json(body)
                    .send()
                    .await?;
                let response = check_status(PROVIDER, response).await?;
                read_json(PROVIDER, response).await
            })
            .await?;

        images
            .data
            .into_iter()
            .find_map(|d| d.url)
            .ok_or_else(|| AppError::ProviderError(format!("{PROVIDER} returned no image URL")))
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiClient {
    async fn synthesize(&self, text: &str, voice: &str) -> AppResult<Vec<u8>> {
        let url = self.url("audio/speech");
        let body = json!({
            "model": self.config.tts_model,
            "input": text,
            "voice": voice,
            "response_format": "mp3",
        });
        let (url, body) = (url.as_str(), &body);

        self.retry
            .run("OpenAI speech synthesis", move || async move {
                let response = self
                    .http
                    .post(url)
                    .bearer_auth(&self.config.api_key)
                    .json(body)
                    .send()
                    .await?;
                let response = check_status(PROVIDER, response).await?;
                read_bytes(PROVIDER, response).await
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completion(content: Option<&str>) -> ChatCompletion {
        ChatCompletion {
            choices: vec![ChatChoice {
                message: ChatMessage {
                    content: content.map(str::to_string),
                },
            }],
        }
    }

    #[test]
    fn test_parse_story_text() {
        let story = parse_story_text(completion(Some(
            r#"{"title":"The Kind Fox","content":"Once upon a time...","moral":"Share."}"#,
        )))
        .unwrap();
        assert_eq!(story.title, "The Kind Fox");
        assert_eq!(story.moral, "Share.");
    }

    #[test]
    fn test_malformed_story_is_provider_error() {
        let err = parse_story_text(completion(Some("not json"))).unwrap_err();
        assert!(matches!(err, AppError::ProviderError(_)));
        let err = parse_story_text(completion(None)).unwrap_err();
        assert!(matches!(err, AppError::ProviderError(_)));
        let err = parse_story_text(completion(Some(
            r#"{"title":" ","content":"","moral":""}"#,
        )))
        .unwrap_err();
        assert!(matches!(err, AppError::ProviderError(_)));
    }
}
