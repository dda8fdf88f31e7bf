pub mod sqlite_notification_repository;
pub mod sqlite_student_repository;
pub mod sqlite_trigger_execution_repository;
pub mod sqlite_trigger_repository;

pub use sqlite_notification_repository::SqliteNotificationRepository;
pub use sqlite_student_repository::SqliteStudentRepository;
pub use sqlite_trigger_execution_repository::SqliteTriggerExecutionRepository;
pub use sqlite_trigger_repository::SqliteTriggerRepository;

use sqlx::SqlitePool;
use tracing::debug;

use notifier_core::NotifierResult;

/// 运行数据库迁移
///
/// users 和 achievement_records 归门户所有，这里建表只是为了
/// 嵌入式部署和测试能自给自足；生产环境共享门户的数据库文件。
pub async fn run_migrations(pool: &SqlitePool) -> NotifierResult<()> {
    debug!("开始运行SQLite数据库迁移");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS triggers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            kind TEXT NOT NULL DEFAULT 'SCHEDULED',
            schedule TEXT,
            template_id TEXT NOT NULL,
            audience TEXT NOT NULL,
            enabled INTEGER NOT NULL DEFAULT 1,
            last_run DATETIME,
            next_run DATETIME,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS scheduled_notifications (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            body TEXT NOT NULL,
            category TEXT NOT NULL,
            priority TEXT NOT NULL DEFAULT 'NORMAL',
            audience TEXT NOT NULL,
            scheduled_for DATETIME NOT NULL,
            sent INTEGER NOT NULL DEFAULT 0,
            sent_at DATETIME,
            created_by INTEGER NOT NULL,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS trigger_executions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            trigger_id INTEGER NOT NULL,
            executed_at DATETIME NOT NULL,
            success INTEGER NOT NULL,
            sent_count INTEGER NOT NULL DEFAULT 0,
            failed_count INTEGER NOT NULL DEFAULT 0,
            error TEXT,
            FOREIGN KEY (trigger_id) REFERENCES triggers(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notifications (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            body TEXT NOT NULL,
            category TEXT NOT NULL,
            link TEXT,
            read INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            role TEXT NOT NULL DEFAULT 'student',
            email_enabled INTEGER NOT NULL DEFAULT 1,
            digest_frequency TEXT NOT NULL DEFAULT 'INSTANT',
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS achievement_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            points INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'PENDING',
            submitted_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_triggers_enabled ON triggers(enabled)",
        "CREATE INDEX IF NOT EXISTS idx_triggers_last_run ON triggers(last_run)",
        "CREATE INDEX IF NOT EXISTS idx_scheduled_notifications_due ON scheduled_notifications(sent, scheduled_for)",
        "CREATE INDEX IF NOT EXISTS idx_trigger_executions_trigger_id ON trigger_executions(trigger_id)",
        "CREATE INDEX IF NOT EXISTS idx_notifications_user_id ON notifications(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_users_role ON users(role)",
        "CREATE INDEX IF NOT EXISTS idx_achievement_records_user_id ON achievement_records(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_achievement_records_status ON achievement_records(status)",
    ];

    for index_sql in indexes {
        sqlx::query(index_sql).execute(pool).await?;
    }

    debug!("SQLite数据库迁移完成");
    Ok(())
}
