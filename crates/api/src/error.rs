use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use notifier_core::NotifierError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("引擎错误: {0}")]
    Engine(#[from] NotifierError),

    #[error("请求参数错误: {0}")]
    BadRequest(String),

    #[error("未找到资源")]
    NotFound,

    #[error("内部服务器错误: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, error_type) = match &self {
            ApiError::Engine(NotifierError::TriggerNotFound { id }) => (
                StatusCode::NOT_FOUND,
                format!("触发器 ID {id} 不存在"),
                "TRIGGER_NOT_FOUND",
            ),
            ApiError::Engine(NotifierError::NotificationNotFound { id }) => (
                StatusCode::NOT_FOUND,
                format!("定时通知 ID {id} 不存在"),
                "NOTIFICATION_NOT_FOUND",
            ),
            ApiError::Engine(NotifierError::TemplateNotFound(id)) => (
                StatusCode::BAD_REQUEST,
                format!("消息模板 '{id}' 不存在"),
                "TEMPLATE_NOT_FOUND",
            ),
            ApiError::Engine(NotifierError::InvalidCron { expr, message }) => (
                StatusCode::BAD_REQUEST,
                format!("CRON表达式 '{expr}' 无效: {message}"),
                "INVALID_CRON_EXPRESSION",
            ),
            ApiError::Engine(NotifierError::UnknownAudience(name)) => (
                StatusCode::BAD_REQUEST,
                format!("未知的受众类别: {name}"),
                "UNKNOWN_AUDIENCE",
            ),
            ApiError::Engine(NotifierError::MissingSchedule { id }) => (
                StatusCode::BAD_REQUEST,
                format!("触发器 {id} 缺少CRON表达式"),
                "MISSING_SCHEDULE",
            ),
            ApiError::Engine(NotifierError::ScheduleInPast) => (
                StatusCode::BAD_REQUEST,
                "计划发送时间必须晚于当前时间".to_string(),
                "SCHEDULE_IN_PAST",
            ),
            ApiError::Engine(NotifierError::AlreadySent { id }) => (
                StatusCode::CONFLICT,
                format!("定时通知 {id} 已发送，不能再修改"),
                "ALREADY_SENT",
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                format!("请求参数错误: {msg}"),
                "BAD_REQUEST",
            ),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                "请求的资源不存在".to_string(),
                "NOT_FOUND",
            ),
            ApiError::Engine(e) => {
                tracing::error!("处理请求时发生内部错误: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "系统内部错误".to_string(),
                    "INTERNAL_ERROR",
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("处理请求时发生内部错误: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "系统内部错误".to_string(),
                    "INTERNAL_ERROR",
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": error_type,
                "code": status.as_u16(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
