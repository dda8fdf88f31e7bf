use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use notifier_core::ApiConfig;
use notifier_dispatcher::{ScheduledProcessor, TriggerScheduler};
use notifier_domain::{
    repositories::{ScheduledNotificationRepository, TriggerExecutionRepository, TriggerRepository},
    TemplateCatalog,
};

use crate::handlers::{
    engine::{evaluate_triggers, process_due, tick},
    health::health_check,
    notifications::{
        cancel_scheduled, create_scheduled, get_scheduled, list_scheduled, reschedule_scheduled,
    },
    templates::list_templates,
    triggers::{
        create_trigger, delete_trigger, disable_trigger, enable_trigger, get_trigger,
        get_trigger_executions, list_triggers, run_trigger,
    },
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub triggers: Arc<dyn TriggerRepository>,
    pub notifications: Arc<dyn ScheduledNotificationRepository>,
    pub executions: Arc<dyn TriggerExecutionRepository>,
    pub scheduler: Arc<TriggerScheduler>,
    pub processor: Arc<ScheduledProcessor>,
    pub catalog: Arc<TemplateCatalog>,
}

/// 创建API路由
pub fn create_routes(state: AppState, config: &ApiConfig) -> Router {
    let mut router = Router::new()
        // 健康检查
        .route("/health", get(health_check))
        // 触发器管理API
        .route("/api/triggers", get(list_triggers).post(create_trigger))
        .route("/api/triggers/{id}", get(get_trigger))
        .route("/api/triggers/{id}/enable", post(enable_trigger))
        .route("/api/triggers/{id}/disable", post(disable_trigger))
        .route("/api/triggers/{id}/delete", post(delete_trigger))
        .route("/api/triggers/{id}/run", post(run_trigger))
        .route("/api/triggers/{id}/executions", get(get_trigger_executions))
        // 定时通知管理API
        .route(
            "/api/notifications/scheduled",
            get(list_scheduled).post(create_scheduled),
        )
        .route("/api/notifications/scheduled/{id}", get(get_scheduled))
        .route(
            "/api/notifications/scheduled/{id}/cancel",
            post(cancel_scheduled),
        )
        .route(
            "/api/notifications/scheduled/{id}/reschedule",
            post(reschedule_scheduled),
        )
        // 模板目录
        .route("/api/templates", get(list_templates))
        // 引擎评估入口（外部cron调用）
        .route("/api/engine/tick", post(tick))
        .route("/api/engine/evaluate", post(evaluate_triggers))
        .route("/api/engine/process-due", post(process_due))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.cors_enabled {
        let cors = if config.cors_origins.iter().any(|o| o == "*") {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<HeaderValue> = config
                .cors_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        };
        router = router.layer(cors);
    }

    router
}
