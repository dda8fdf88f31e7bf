use serde_json::json;

use crate::{error::ApiResult, response::success};

/// 健康检查
pub async fn health_check() -> ApiResult<impl axum::response::IntoResponse> {
    Ok(success(json!({
        "status": "ok",
        "service": "notifier",
    })))
}
