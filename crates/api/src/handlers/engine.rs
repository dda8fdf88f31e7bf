use axum::extract::State;
use serde_json::json;

use crate::{error::ApiResult, response::success, routes::AppState};

/// 完整的一轮评估：先评估触发器，再处理到期的定时通知
pub async fn tick(State(state): State<AppState>) -> ApiResult<impl axum::response::IntoResponse> {
    let triggers = state.scheduler.evaluate_triggers().await?;
    let notifications = state.processor.process_due().await?;

    Ok(success(json!({
        "triggers": triggers,
        "notifications": notifications,
    })))
}

/// 只评估触发器
pub async fn evaluate_triggers(
    State(state): State<AppState>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let report = state.scheduler.evaluate_triggers().await?;
    Ok(success(report))
}

/// 只处理到期的定时通知
pub async fn process_due(
    State(state): State<AppState>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let report = state.processor.process_due().await?;
    Ok(success(report))
}
