use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

use notifier_core::{NotifierError, NotifierResult};
use notifier_domain::{repositories::ScheduledNotificationRepository, ScheduledNotification};

const NOTIFICATION_COLUMNS: &str = "id, title, body, category, priority, audience, \
                                    scheduled_for, sent, sent_at, created_by, created_at";

pub struct SqliteNotificationRepository {
    pool: SqlitePool,
}

impl SqliteNotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_notification(row: &sqlx::sqlite::SqliteRow) -> NotifierResult<ScheduledNotification> {
        Ok(ScheduledNotification {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            body: row.try_get("body")?,
            category: row.try_get("category")?,
            priority: row.try_get("priority")?,
            audience: row.try_get("audience")?,
            scheduled_for: row.try_get("scheduled_for")?,
            sent: row.try_get("sent")?,
            sent_at: row.try_get("sent_at")?,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl ScheduledNotificationRepository for SqliteNotificationRepository {
    #[instrument(skip(self, notification), fields(title = %notification.title))]
    async fn create(
        &self,
        notification: &ScheduledNotification,
    ) -> NotifierResult<ScheduledNotification> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO scheduled_notifications
                (title, body, category, priority, audience, scheduled_for, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {NOTIFICATION_COLUMNS}
            "#,
        ))
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(notification.category)
        .bind(notification.priority)
        .bind(notification.audience)
        .bind(notification.scheduled_for)
        .bind(notification.created_by)
        .fetch_one(&self.pool)
        .await?;

        let created = Self::row_to_notification(&row)?;
        debug!(
            "创建定时通知成功: ID {}, 计划时间 {}",
            created.id, created.scheduled_for
        );
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> NotifierResult<Option<ScheduledNotification>> {
        let row = sqlx::query(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM scheduled_notifications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_notification).transpose()
    }

    async fn list(&self) -> NotifierResult<Vec<ScheduledNotification>> {
        let rows = sqlx::query(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM scheduled_notifications ORDER BY scheduled_for"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_notification).collect()
    }

    async fn list_due(&self, now: DateTime<Utc>) -> NotifierResult<Vec<ScheduledNotification>> {
        let rows = sqlx::query(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM scheduled_notifications \
             WHERE sent = 0 AND scheduled_for <= $1 ORDER BY scheduled_for"
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_notification).collect()
    }

    async fn mark_sent(&self, id: i64, sent_at: DateTime<Utc>) -> NotifierResult<bool> {
        // sent = 0 条件即原子认领，重叠的处理轮只有一个赢家
        let result = sqlx::query(
            "UPDATE scheduled_notifications SET sent = 1, sent_at = $2 \
             WHERE id = $1 AND sent = 0",
        )
        .bind(id)
        .bind(sent_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn revert_sent(&self, id: i64) -> NotifierResult<()> {
        sqlx::query("UPDATE scheduled_notifications SET sent = 0, sent_at = NULL WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn reschedule(&self, id: i64, scheduled_for: DateTime<Utc>) -> NotifierResult<bool> {
        let exists = sqlx::query("SELECT 1 FROM scheduled_notifications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(NotifierError::NotificationNotFound { id });
        }

        let result = sqlx::query(
            "UPDATE scheduled_notifications SET scheduled_for = $2 WHERE id = $1 AND sent = 0",
        )
        .bind(id)
        .bind(scheduled_for)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_unsent(&self, id: i64) -> NotifierResult<bool> {
        let exists = sqlx::query("SELECT 1 FROM scheduled_notifications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(NotifierError::NotificationNotFound { id });
        }

        let result = sqlx::query("DELETE FROM scheduled_notifications WHERE id = $1 AND sent = 0")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
