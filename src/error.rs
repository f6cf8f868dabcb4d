use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Insufficient credits: {required} required, {remaining} remaining")]
    InsufficientCredits { required: i32, remaining: i32 },

    #[error("Saved story limit of {limit} reached")]
    StoryLimitReached { limit: i32 },

    /// 上游返回 4xx 或者响应格式不正确，重试无意义
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// 上游 5xx / 429，可重试
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),
}

impl AppError {
    /// 是否属于暂时性的上游故障
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::ProviderUnavailable(_) => true,
            AppError::ReqwestError(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) | AppError::JwtError(_) => "AUTH_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Forbidden => "FORBIDDEN",
            AppError::InsufficientCredits { .. } => "INSUFFICIENT_CREDITS",
            AppError::StoryLimitReached { .. } => "STORY_LIMIT_REACHED",
            AppError::ProviderError(_)
            | AppError::ProviderUnavailable(_)
            | AppError::ReqwestError(_) => "PROVIDER_ERROR",
            AppError::StorageError(_) => "STORAGE_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden | AppError::StoryLimitReached { .. } => StatusCode::FORBIDDEN,
            AppError::InsufficientCredits { .. } => StatusCode::PAYMENT_REQUIRED,
            AppError::ProviderError(_)
            | AppError::ProviderUnavailable(_)
            | AppError::ReqwestError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                msg.clone()
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                msg.clone()
            }
            AppError::JwtError(err) => {
                log::warn!("Token rejected: {err}");
                "Invalid access token".to_string()
            }
            AppError::NotFound(msg) => msg.clone(),
            AppError::Forbidden => {
                log::warn!("Forbidden access");
                "Forbidden".to_string()
            }
            AppError::InsufficientCredits { .. } | AppError::StoryLimitReached { .. } => {
                log::warn!("Entitlement rejected: {self}");
                self.to_string()
            }
            AppError::ProviderError(msg) | AppError::ProviderUnavailable(msg) => {
                log::error!("Provider error: {msg}");
                msg.clone()
            }
            AppError::ReqwestError(err) => {
                log::error!("Provider request failed: {err}");
                "Provider request failed".to_string()
            }
            AppError::StorageError(msg) => {
                log::error!("Storage error: {msg}");
                "Failed to store generated media".to_string()
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                "Database error".to_string()
            }
            _ => {
                log::error!("Internal error: {self}");
                "Internal server error".to_string()
            }
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": {
                "code": self.code(),
                "message": message
            }
        }))
    }
}
