use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use notifier_core::NotifierResult;
use notifier_domain::{ports::InboxSink, NotificationCategory};

/// 站内信收件箱的SQLite实现，直接写门户的 notifications 表
pub struct SqliteInboxSink {
    pool: SqlitePool,
}

impl SqliteInboxSink {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InboxSink for SqliteInboxSink {
    async fn create_notification(
        &self,
        recipient: i64,
        title: &str,
        body: &str,
        category: NotificationCategory,
        link: Option<&str>,
    ) -> NotifierResult<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO notifications (user_id, title, body, category, link)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(recipient)
        .bind(title)
        .bind(body)
        .bind(category)
        .bind(link)
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = row.try_get("id")?;
        debug!("站内信已写入: 收件人 {}, 通知ID {}", recipient, id);
        Ok(id)
    }
}
