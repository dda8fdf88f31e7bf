pub mod sqlite;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite, SqlitePool};
use tracing::debug;

use notifier_core::{DatabaseConfig, NotifierResult};

pub type DbPool = Pool<Sqlite>;

/// 嵌入式SQLite数据库管理器
pub struct DatabaseManager {
    pool: SqlitePool,
}

impl DatabaseManager {
    /// 建立连接池，启用外键约束和WAL模式
    pub async fn new(config: &DatabaseConfig) -> NotifierResult<Self> {
        debug!("连接数据库: {}", config.url);

        let connect_options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .connect_with(connect_options)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> NotifierResult<()> {
        sqlite::run_migrations(&self.pool).await
    }

    pub async fn health_check(&self) -> NotifierResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
