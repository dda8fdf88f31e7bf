use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::info;

use notifier_api::{create_routes, AppState};
use notifier_core::NotifierConfig;
use notifier_dispatcher::{
    AudienceResolver, DeliveryDispatcher, ScheduledProcessor, TriggerScheduler,
};
use notifier_domain::TemplateCatalog;
use notifier_infrastructure::{
    build_email_transport, DatabaseManager, SqliteInboxSink, SqliteNotificationRepository,
    SqliteStudentRepository, SqliteTriggerExecutionRepository, SqliteTriggerRepository,
};

/// 应用实例：装配数据库、仓储、派发器和API状态
pub struct Application {
    config: NotifierConfig,
    db: DatabaseManager,
    state: AppState,
}

impl Application {
    pub async fn new(config: NotifierConfig) -> Result<Self> {
        let db = DatabaseManager::new(&config.database)
            .await
            .context("连接数据库失败")?;
        db.migrate().await.context("数据库迁移失败")?;

        let pool = db.pool().clone();
        let triggers = Arc::new(SqliteTriggerRepository::new(pool.clone()));
        let notifications = Arc::new(SqliteNotificationRepository::new(pool.clone()));
        let executions = Arc::new(SqliteTriggerExecutionRepository::new(pool.clone()));
        let students = Arc::new(SqliteStudentRepository::new(pool.clone()));

        let inbox = Arc::new(SqliteInboxSink::new(pool));
        let email = build_email_transport(&config.email).context("构造邮件传输失败")?;

        let dispatcher = Arc::new(DeliveryDispatcher::new(
            AudienceResolver::new(students.clone()),
            inbox,
            email,
            config.engine.max_concurrent_deliveries,
            Duration::from_secs(config.engine.delivery_timeout_seconds),
        ));

        let catalog = Arc::new(TemplateCatalog::builtin());
        let scheduler = Arc::new(TriggerScheduler::new(
            triggers.clone(),
            executions.clone(),
            students.clone(),
            catalog.clone(),
            dispatcher.clone(),
            chrono::Duration::minutes(config.engine.dedup_window_minutes),
        ));
        let processor = Arc::new(ScheduledProcessor::new(
            notifications.clone(),
            students,
            dispatcher,
        ));

        let state = AppState {
            triggers,
            notifications,
            executions,
            scheduler,
            processor,
            catalog,
        };

        Ok(Self { config, db, state })
    }

    /// 启动API服务并阻塞到收到关闭信号
    pub async fn serve(&self) -> Result<()> {
        let router = create_routes(self.state.clone(), &self.config.api);
        let listener = tokio::net::TcpListener::bind(&self.config.api.bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {}", self.config.api.bind_address))?;

        info!("API服务已启动: {}", self.config.api.bind_address);
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("API服务异常退出")?;

        info!("API服务已关闭");
        self.db.close().await;
        Ok(())
    }

    /// 执行一轮完整评估后退出（外部cron的调用入口）
    pub async fn tick(&self) -> Result<()> {
        let triggers = self.state.scheduler.evaluate_triggers().await?;
        let notifications = self.state.processor.process_due().await?;

        info!(
            "本轮评估汇总: 触发器(检查={} 执行={} 失败={}) 定时通知(到期={} 发送={} 失败={})",
            triggers.evaluated,
            triggers.executed,
            triggers.failed,
            notifications.processed,
            notifications.sent,
            notifications.failed
        );

        self.db.close().await;
        Ok(())
    }
}

/// 等待关闭信号
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("安装Ctrl+C信号处理器失败");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("安装SIGTERM信号处理器失败")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("收到Ctrl+C信号");
        },
        _ = terminate => {
            info!("收到SIGTERM信号");
        },
    }
}
