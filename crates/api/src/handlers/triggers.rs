use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use notifier_core::NotifierError;
use notifier_domain::{AudienceClass, NewTrigger};

use crate::{
    error::{ApiError, ApiResult},
    response::{created, no_content, success, ApiResponse, PaginatedResponse},
    routes::AppState,
};

/// 触发器创建请求
#[derive(Debug, Deserialize)]
pub struct CreateTriggerRequest {
    pub name: String,
    pub schedule: String,
    pub template_id: String,
    pub audience: String,
    pub enabled: Option<bool>,
}

/// 执行台账查询参数
#[derive(Debug, Deserialize)]
pub struct ExecutionQueryParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

const MAX_PAGE_SIZE: i64 = 100;

/// 创建触发器
pub async fn create_trigger(
    State(state): State<AppState>,
    Json(request): Json<CreateTriggerRequest>,
) -> ApiResult<impl axum::response::IntoResponse> {
    if request.name.trim().is_empty() {
        return Err(ApiError::BadRequest("触发器名称不能为空".to_string()));
    }
    let audience = AudienceClass::from_str(&request.audience)
        .map_err(|_| NotifierError::UnknownAudience(request.audience.clone()))?;

    let trigger = state
        .scheduler
        .create_trigger(NewTrigger {
            name: request.name,
            schedule: request.schedule,
            template_id: request.template_id,
            audience,
            enabled: request.enabled.unwrap_or(true),
        })
        .await?;

    Ok(created(trigger))
}

/// 获取触发器列表
pub async fn list_triggers(
    State(state): State<AppState>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let triggers = state.triggers.list().await?;
    Ok(success(triggers))
}

/// 获取单个触发器
pub async fn get_trigger(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let trigger = state
        .triggers
        .get_by_id(id)
        .await?
        .ok_or(NotifierError::TriggerNotFound { id })?;
    Ok(success(trigger))
}

/// 启用触发器
pub async fn enable_trigger(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl axum::response::IntoResponse> {
    state.triggers.set_enabled(id, true).await?;
    Ok(ApiResponse::success_empty())
}

/// 停用触发器
pub async fn disable_trigger(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl axum::response::IntoResponse> {
    state.triggers.set_enabled(id, false).await?;
    Ok(ApiResponse::success_empty())
}

/// 删除触发器
pub async fn delete_trigger(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl axum::response::IntoResponse> {
    state.triggers.delete(id).await?;
    Ok(no_content())
}

/// 手动立即执行触发器
pub async fn run_trigger(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let execution = state.scheduler.run_now(id).await?;
    Ok(success(execution))
}

/// 分页查询触发器的执行台账
pub async fn get_trigger_executions(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<ExecutionQueryParams>,
) -> ApiResult<impl axum::response::IntoResponse> {
    state
        .triggers
        .get_by_id(id)
        .await?
        .ok_or(NotifierError::TriggerNotFound { id })?;

    let page = params.page.unwrap_or(1).max(1);
    let page_size = params.page_size.unwrap_or(20).clamp(1, MAX_PAGE_SIZE);
    let offset = (page - 1) * page_size;

    let executions = state.executions.list_by_trigger(id, page_size, offset).await?;
    Ok(success(PaginatedResponse::new(executions, page, page_size)))
}
