use crate::entities::ImageProviderKind;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub runware: RunwareConfig,
    pub renderer: RendererConfig,
    #[serde(default)]
    pub credits: CreditCosts,
    #[serde(default)]
    pub retry: RetryConfig,
    /// `app_settings` 中没有 image_provider 行时使用
    #[serde(default)]
    pub image_provider: ImageProviderKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 允许跨域的前端域名，为空时允许任意来源
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// 认证平台签发的 JWT（HS256）校验参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_audience")]
    pub audience: String,
    #[serde(default = "default_token_expires_in")]
    pub access_token_expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub base_url: String,
    pub service_key: String,
    #[serde(default = "default_audio_bucket")]
    pub audio_bucket: String,
    #[serde(default = "default_video_bucket")]
    pub video_bucket: String,
    #[serde(default = "default_pdf_bucket")]
    pub pdf_bucket: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_image_model")]
    pub image_model: String,
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunwareConfig {
    pub api_key: String,
    #[serde(default = "default_runware_base_url")]
    pub base_url: String,
    #[serde(default = "default_runware_model")]
    pub model: String,
}

impl Default for RunwareConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_runware_base_url(),
            model: default_runware_model(),
        }
    }
}

/// 外部视频/PDF 合成服务
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// 每种操作消耗的额度
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditCosts {
    pub story: i32,
    pub image: i32,
    pub audio: i32,
    pub video: i32,
    pub pdf: i32,
    pub translation: i32,
}

impl Default for CreditCosts {
    fn default() -> Self {
        Self {
            story: 1,
            image: 1,
            audio: 1,
            video: 2,
            pdf: 1,
            translation: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 8_000,
        }
    }
}

fn default_audience() -> String {
    "authenticated".to_string()
}

fn default_token_expires_in() -> i64 {
    3600
}

fn default_audio_bucket() -> String {
    "story-audio".to_string()
}

fn default_video_bucket() -> String {
    "story-videos".to_string()
}

fn default_pdf_bucket() -> String {
    "story-pdfs".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_tts_model() -> String {
    "tts-1".to_string()
}

fn default_runware_base_url() -> String {
    "https://api.runware.ai/v1".to_string()
}

fn default_runware_model() -> String {
    "runware:100@1".to_string()
}

fn get_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::parse(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::from_env_defaults()?,
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn parse(config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        toml::from_str(config_str).map_err(|e| format!("Failed to parse config file: {e}").into())
    }

    fn from_env_defaults() -> Result<Self, Box<dyn std::error::Error>> {
        // 数据库 URL 在无配置文件时必须提供
        let database_url = get_env("DATABASE_URL")
            .ok_or("DATABASE_URL is not set and no config.toml was found")?;

        Ok(Config {
            server: ServerConfig {
                host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: get_env_parse("SERVER_PORT", 8080u16),
                cors_origins: get_env("CORS_ORIGINS")
                    .map(|v| parse_list(&v))
                    .unwrap_or_default(),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
            },
            jwt: JwtConfig {
                secret: get_env("JWT_SECRET")
                    .unwrap_or_else(|| "change-me-in-production".to_string()),
                audience: get_env("JWT_AUDIENCE").unwrap_or_else(default_audience),
                access_token_expires_in: get_env_parse(
                    "JWT_ACCESS_EXPIRES_IN",
                    default_token_expires_in(),
                ),
            },
            storage: StorageConfig {
                base_url: get_env("STORAGE_BASE_URL").unwrap_or_default(),
                service_key: get_env("STORAGE_SERVICE_KEY").unwrap_or_default(),
                audio_bucket: get_env("STORAGE_AUDIO_BUCKET").unwrap_or_else(default_audio_bucket),
                video_bucket: get_env("STORAGE_VIDEO_BUCKET").unwrap_or_else(default_video_bucket),
                pdf_bucket: get_env("STORAGE_PDF_BUCKET").unwrap_or_else(default_pdf_bucket),
            },
            openai: OpenAiConfig {
                api_key: get_env("OPENAI_API_KEY").unwrap_or_default(),
                base_url: get_env("OPENAI_BASE_URL").unwrap_or_else(default_openai_base_url),
                chat_model: get_env("OPENAI_CHAT_MODEL").unwrap_or_else(default_chat_model),
                image_model: get_env("OPENAI_IMAGE_MODEL").unwrap_or_else(default_image_model),
                tts_model: get_env("OPENAI_TTS_MODEL").unwrap_or_else(default_tts_model),
            },
            runware: RunwareConfig {
                api_key: get_env("RUNWARE_API_KEY").unwrap_or_default(),
                base_url: get_env("RUNWARE_BASE_URL").unwrap_or_else(default_runware_base_url),
                model: get_env("RUNWARE_MODEL").unwrap_or_else(default_runware_model),
            },
            renderer: RendererConfig {
                base_url: get_env("RENDERER_BASE_URL")
                    .unwrap_or_else(|| "http://localhost:8000".to_string()),
                api_key: get_env("RENDERER_API_KEY"),
            },
            credits: CreditCosts::default(),
            retry: RetryConfig::default(),
            image_provider: get_env("IMAGE_PROVIDER")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.server.cors_origins = parse_list(&v);
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_AUDIENCE") {
            self.jwt.audience = v;
        }
        if let Ok(v) = env::var("STORAGE_BASE_URL") {
            self.storage.base_url = v;
        }
        if let Ok(v) = env::var("STORAGE_SERVICE_KEY") {
            self.storage.service_key = v;
        }
        if let Ok(v) = env::var("OPENAI_API_KEY") {
            self.openai.api_key = v;
        }
        if let Ok(v) = env::var("OPENAI_BASE_URL") {
            self.openai.base_url = v;
        }
        if let Ok(v) = env::var("RUNWARE_API_KEY") {
            self.runware.api_key = v;
        }
        if let Ok(v) = env::var("RUNWARE_BASE_URL") {
            self.runware.base_url = v;
        }
        if let Ok(v) = env::var("RENDERER_BASE_URL") {
            self.renderer.base_url = v;
        }
        if let Ok(v) = env::var("RENDERER_API_KEY") {
            self.renderer.api_key = Some(v);
        }
        if let Ok(v) = env::var("IMAGE_PROVIDER")
            && let Ok(kind) = v.parse()
        {
            self.image_provider = kind;
        }
        if let Ok(v) = env::var("PROVIDER_MAX_ATTEMPTS")
            && let Ok(n) = v.parse()
        {
            self.retry.max_attempts = n;
        }
    }
}
