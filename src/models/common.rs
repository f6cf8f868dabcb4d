use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 错误响应体 `{"success": false, "error": {...}}` 中的 error 字段
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ApiError,
}
