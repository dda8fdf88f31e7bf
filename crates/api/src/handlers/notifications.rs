use std::str::FromStr;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use notifier_core::NotifierError;
use notifier_domain::{
    AudienceClass, NewScheduledNotification, NotificationCategory, NotificationPriority,
};

use crate::{
    error::{ApiError, ApiResult},
    response::{created, no_content, success},
    routes::AppState,
};

/// 定时通知创建请求
#[derive(Debug, Deserialize)]
pub struct CreateScheduledRequest {
    pub title: String,
    pub body: String,
    pub category: NotificationCategory,
    pub priority: Option<NotificationPriority>,
    pub audience: String,
    pub scheduled_for: DateTime<Utc>,
    pub created_by: i64,
}

/// 改期请求
#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    pub scheduled_for: DateTime<Utc>,
}

/// 创建定时通知
pub async fn create_scheduled(
    State(state): State<AppState>,
    Json(request): Json<CreateScheduledRequest>,
) -> ApiResult<impl axum::response::IntoResponse> {
    if request.title.trim().is_empty() || request.body.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "通知标题和正文不能为空".to_string(),
        ));
    }
    let audience = AudienceClass::from_str(&request.audience)
        .map_err(|_| NotifierError::UnknownAudience(request.audience.clone()))?;

    let notification = state
        .processor
        .create(NewScheduledNotification {
            title: request.title,
            body: request.body,
            category: request.category,
            priority: request.priority.unwrap_or(NotificationPriority::Normal),
            audience,
            scheduled_for: request.scheduled_for,
            created_by: request.created_by,
        })
        .await?;

    Ok(created(notification))
}

/// 获取定时通知列表
pub async fn list_scheduled(
    State(state): State<AppState>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let notifications = state.notifications.list().await?;
    Ok(success(notifications))
}

/// 获取单个定时通知
pub async fn get_scheduled(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let notification = state
        .notifications
        .get_by_id(id)
        .await?
        .ok_or(NotifierError::NotificationNotFound { id })?;
    Ok(success(notification))
}

/// 取消未发送的定时通知
pub async fn cancel_scheduled(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl axum::response::IntoResponse> {
    state.processor.cancel(id).await?;
    Ok(no_content())
}

/// 未发送的定时通知改期
pub async fn reschedule_scheduled(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<RescheduleRequest>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let notification = state
        .processor
        .reschedule(id, request.scheduled_for)
        .await?;
    Ok(success(notification))
}
