//! 统一错误处理
//!
//! 提供 `ApiError` 枚举实现 `IntoResponse`，以及流水线内部的 `RunError` 分类

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// 流水线错误分类
///
/// 处理期的失败在状态机边界被捕获，写入 run 的 error 字段，
/// 不会回传给提交者（提交调用早已返回）
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RunError {
    /// 提交参数非法 - 同步拒绝，不创建任何记录
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// 处理时引用的扫描已不存在
    #[error("missing input: {0}")]
    MissingInput(String),
    /// 外部计算引擎失败（不可达 / 错误载荷 / 输出不可解析 / 退出码异常 / 超时）
    #[error("computation failed: {0}")]
    ComputationFailed(String),
    /// 记录存储拒绝了进行中的状态迁移
    #[error("persistence unavailable: {0}")]
    Persistence(String),
}

/// API 错误响应结构
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }
}

/// 统一 API 错误类型
#[derive(Debug)]
pub enum ApiError {
    /// 404 - 资源未找到
    NotFound(String),
    /// 400 - 请求无效
    BadRequest(String),
    /// 500 - 内部错误
    Internal(String),
}

impl ApiError {
    /// 创建未找到错误
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    /// 创建请求无效错误
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<RunError> for ApiError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::InvalidRequest(msg) => ApiError::BadRequest(msg),
            RunError::MissingInput(msg) => ApiError::NotFound(msg),
            RunError::ComputationFailed(msg) | RunError::Persistence(msg) => {
                ApiError::Internal(msg)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("{} not found", resource),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorResponse::new(error_type, message);
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NotFound(r) => write!(f, "Not found: {}", r),
            ApiError::BadRequest(m) => write!(f, "Bad request: {}", m),
            ApiError::Internal(m) => write!(f, "Internal error: {}", m),
        }
    }
}

impl std::error::Error for ApiError {}

/// 便捷类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_new() {
        let resp = ErrorResponse::new("test_error", "Test message");
        assert_eq!(resp.error, "test_error");
        assert_eq!(resp.message, "Test message");
        assert!(resp.details.is_none());
    }

    #[test]
    fn test_run_error_display() {
        let err = RunError::ComputationFailed("engine exited with code 3".to_string());
        assert_eq!(
            err.to_string(),
            "computation failed: engine exited with code 3"
        );
    }

    #[test]
    fn test_run_error_to_api_error() {
        let api: ApiError = RunError::InvalidRequest("t1 and t2 must differ".to_string()).into();
        assert!(matches!(api, ApiError::BadRequest(_)));

        let api: ApiError = RunError::MissingInput("scan s1".to_string()).into();
        assert!(matches!(api, ApiError::NotFound(_)));
    }
}
