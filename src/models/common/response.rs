use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

use crate::errors::HWSystemError;
use crate::models::ErrorCode;

// 统一的API响应结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: Some(data),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error_empty(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }

    /// 将业务错误映射为 HTTP 响应
    pub fn from_error(err: &HWSystemError) -> HttpResponse {
        let body = Self::error_empty(ErrorCode::from(err), err.format_simple());
        match err {
            HWSystemError::Validation(_) => HttpResponse::BadRequest().json(body),
            HWSystemError::NotFound(_) => HttpResponse::NotFound().json(body),
            HWSystemError::Conflict(_) | HWSystemError::InvalidTransition(_) => {
                HttpResponse::Conflict().json(body)
            }
            _ => HttpResponse::InternalServerError().json(body),
        }
    }
}
