pub mod openai;
pub mod provider;
pub mod renderer;
pub mod runware;
pub mod storage;

pub use openai::*;
pub use provider::*;
pub use renderer::*;
pub use runware::*;
pub use storage::*;

use crate::error::{AppError, AppResult};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

const MAX_ERROR_BODY_CHARS: usize = 300;

/// 非 2xx 映射为供应商错误：5xx / 429 可重试，其余不可重试
pub(crate) async fn check_status(provider: &str, response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    let message = format!("{provider} returned HTTP {}: {body}", status.as_u16());
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        Err(AppError::ProviderUnavailable(message))
    } else {
        Err(AppError::ProviderError(message))
    }
}

pub(crate) async fn read_json<T: DeserializeOwned>(provider: &str, response: Response) -> AppResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| AppError::ProviderError(format!("{provider} returned a malformed response: {e}")))
}

pub(crate) async fn read_bytes(provider: &str, response: Response) -> AppResult<Vec<u8>> {
    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Err(AppError::ProviderError(format!(
            "{provider} returned an empty body"
        )));
    }
    Ok(bytes.to_vec())
}
