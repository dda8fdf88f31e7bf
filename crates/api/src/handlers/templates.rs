use axum::extract::State;
use serde_json::json;

use crate::{error::ApiResult, response::success, routes::AppState};

/// 列出内置消息模板
pub async fn list_templates(
    State(state): State<AppState>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let templates: Vec<_> = state
        .catalog
        .ids()
        .into_iter()
        .filter_map(|id| state.catalog.get(id))
        .map(|t| {
            json!({
                "id": t.id,
                "title": t.title,
                "category": t.category.as_str(),
                "priority": t.priority.as_str(),
            })
        })
        .collect();

    Ok(success(templates))
}
