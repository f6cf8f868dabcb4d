#![allow(dead_code)]

use async_trait::async_trait;
use fablecraft_backend::config::{Config, CreditCosts};
use fablecraft_backend::entities::{ImageProviderKind, profile_entity};
use fablecraft_backend::error::{AppError, AppResult};
use fablecraft_backend::external::*;
use fablecraft_backend::middlewares::AuthenticatedUser;
use fablecraft_backend::models::{CreateStoryRequest, StoryResponse};
use fablecraft_backend::services::*;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, IntoActiveModel, Set};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const TEST_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 8080

[database]
url = "sqlite::memory:"
max_connections = 1

[jwt]
secret = "test-secret"

[storage]
base_url = "https://storage.test"
service_key = "service-key"

[openai]
api_key = "sk-test"

[renderer]
base_url = "https://renderer.test"
"#;

pub fn test_config() -> Config {
    Config::parse(TEST_CONFIG).expect("test config should parse")
}

/// 单连接的内存 SQLite，所有查询共享同一个数据库
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("failed to open sqlite");
    Migrator::up(&db, None)
        .await
        .expect("failed to run migrations");
    db
}

pub fn new_user() -> AuthenticatedUser {
    AuthenticatedUser {
        id: Uuid::new_v4(),
        email: Some("parent@example.com".to_string()),
    }
}

fn unavailable(provider: &str) -> AppError {
    AppError::ProviderUnavailable(format!("{provider} returned HTTP 500: upstream down"))
}

#[derive(Default)]
pub struct FakeText {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

#[async_trait]
impl TextGenerator for FakeText {
    async fn generate_story(&self, request: &StoryRequest) -> AppResult<StoryText> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable("text"));
        }
        Ok(StoryText {
            title: "The Brave Little Owl".to_string(),
            content: format!("Once upon a time, {}.", request.prompt),
            moral: request
                .moral
                .clone()
                .unwrap_or_else(|| "Courage grows when shared.".to_string()),
        })
    }

    async fn translate_story(
        &self,
        story: &StoryText,
        target_language: &str,
    ) -> AppResult<StoryText> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable("text"));
        }
        Ok(StoryText {
            title: format!("[{target_language}] {}", story.title),
            content: format!("[{target_language}] {}", story.content),
            moral: format!("[{target_language}] {}", story.moral),
        })
    }
}

pub struct FakeImages {
    pub kind: ImageProviderKind,
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

impl FakeImages {
    pub fn new(kind: ImageProviderKind) -> Self {
        Self {
            kind,
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl ImageGenerator for FakeImages {
    fn kind(&self) -> ImageProviderKind {
        self.kind
    }

    async fn generate_image(&self, _prompt: &str) -> AppResult<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable("image"));
        }
        Ok(format!("https://images.test/{}/{n}.png", self.kind))
    }
}

/// 合成语音；设置 `exhaust_during_call` 后会在调用期间把用户额度用光，模拟并发请求
#[derive(Default)]
pub struct FakeSpeech {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
    pub exhaust_during_call: Mutex<Option<(CreditService, Uuid, i32)>>,
}

#[async_trait]
impl SpeechSynthesizer for FakeSpeech {
    async fn synthesize(&self, _text: &str, _voice: &str) -> AppResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable("speech"));
        }
        let exhaust = self.exhaust_during_call.lock().unwrap().take();
        if let Some((credit_service, user_id, credits)) = exhaust {
            credit_service.set_usage(user_id, credits).await?;
        }
        Ok(b"ID3-fake-mp3".to_vec())
    }
}

#[derive(Default)]
pub struct FakeRenderer {
    pub video_calls: AtomicUsize,
    pub pdf_calls: AtomicUsize,
    pub fail: AtomicBool,
    pub last_video: Mutex<Option<VideoComposition>>,
    pub last_pdf: Mutex<Option<PdfDocument>>,
}

#[async_trait]
impl MediaRenderer for FakeRenderer {
    async fn compose_video(&self, composition: &VideoComposition) -> AppResult<Vec<u8>> {
        self.video_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable("renderer"));
        }
        *self.last_video.lock().unwrap() = Some(composition.clone());
        Ok(b"fake-mp4".to_vec())
    }

    async fn render_pdf(&self, document: &PdfDocument) -> AppResult<Vec<u8>> {
        self.pdf_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable("renderer"));
        }
        *self.last_pdf.lock().unwrap() = Some(document.clone());
        Ok(b"%PDF-1.7 fake".to_vec())
    }
}

/// 内存对象存储，key 为 `bucket/path`
#[derive(Default)]
pub struct FakeStorage {
    pub objects: Mutex<HashMap<String, Vec<u8>>>,
    pub removed: Mutex<Vec<String>>,
    pub fail_uploads: AtomicBool,
}

impl FakeStorage {
    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ArtifactStore for FakeStorage {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> AppResult<String> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(AppError::StorageError("bucket unavailable".to_string()));
        }
        let key = format!("{bucket}/{path}");
        self.objects.lock().unwrap().insert(key.clone(), bytes);
        Ok(format!("https://storage.test/storage/v1/object/public/{key}"))
    }

    async fn remove(&self, bucket: &str, path: &str) -> AppResult<()> {
        let key = format!("{bucket}/{path}");
        self.objects.lock().unwrap().remove(&key);
        self.removed.lock().unwrap().push(key);
        Ok(())
    }
}

pub struct TestApp {
    pub db: DatabaseConnection,
    pub config: Config,
    pub text: Arc<FakeText>,
    pub openai_images: Arc<FakeImages>,
    pub runware_images: Arc<FakeImages>,
    pub speech: Arc<FakeSpeech>,
    pub renderer: Arc<FakeRenderer>,
    pub storage: Arc<FakeStorage>,
    pub accounts: AccountService,
    pub tiers: TierService,
    pub credits: CreditService,
    pub settings: SettingsService,
    pub stories: StoryService,
    pub translations: TranslationService,
    pub media: MediaService,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_costs(CreditCosts::default()).await
    }

    pub async fn with_costs(costs: CreditCosts) -> Self {
        let db = setup_db().await;
        let mut config = test_config();
        config.credits = costs;

        let text = Arc::new(FakeText::default());
        let openai_images = Arc::new(FakeImages::new(ImageProviderKind::OpenAi));
        let runware_images = Arc::new(FakeImages::new(ImageProviderKind::Runware));
        let speech = Arc::new(FakeSpeech::default());
        let renderer = Arc::new(FakeRenderer::default());
        let storage = Arc::new(FakeStorage::default());

        let providers = Providers {
            text: text.clone(),
            images: ImageProviders::new(openai_images.clone(), runware_images.clone()),
            speech: speech.clone(),
            renderer: renderer.clone(),
            storage: storage.clone(),
        };

        let accounts = AccountService::new(db.clone());
        let tiers = TierService::new(db.clone());
        let credits = CreditService::new(db.clone(), config.credits.clone());
        let settings = SettingsService::new(db.clone(), config.image_provider);
        let stories = StoryService::new(db.clone(), credits.clone(), providers.clone());
        let translations = TranslationService::new(db.clone(), credits.clone(), providers.clone());
        let media = MediaService::new(
            db.clone(),
            credits.clone(),
            settings.clone(),
            providers,
            config.storage.clone(),
        );

        Self {
            db,
            config,
            text,
            openai_images,
            runware_images,
            speech,
            renderer,
            storage,
            accounts,
            tiers,
            credits,
            settings,
            stories,
            translations,
            media,
        }
    }

    pub async fn credits_used(&self, user: &AuthenticatedUser) -> i32 {
        self.credits.usage(user).await.unwrap().credits_used
    }

    pub async fn set_used(&self, user: &AuthenticatedUser, credits_used: i32) {
        self.credits.set_usage(user.id, credits_used).await.unwrap();
    }

    /// 手动保存一个故事（不扣额度）
    pub async fn seed_story(&self, user: &AuthenticatedUser) -> StoryResponse {
        self.stories
            .create_story(
                user,
                CreateStoryRequest {
                    title: "The Quiet Lighthouse".to_string(),
                    content: "A lighthouse learned to listen to the sea.".to_string(),
                    moral: "Listening is a kind of light.".to_string(),
                    age_group: "4-6".to_string(),
                    genre: "fable".to_string(),
                    language: None,
                    characters: Some("Lighthouse, Gull".to_string()),
                    setting: Some("A rocky coast".to_string()),
                },
            )
            .await
            .unwrap()
    }

    pub async fn make_admin(&self, user: &AuthenticatedUser) {
        let profile = AccountService::ensure_profile(&self.db, user.id).await.unwrap();
        let mut am: profile_entity::ActiveModel = profile.into_active_model();
        am.is_admin = Set(true);
        am.update(&self.db).await.unwrap();
    }
}
