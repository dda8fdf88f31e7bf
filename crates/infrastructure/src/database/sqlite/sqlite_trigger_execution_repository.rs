use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use notifier_core::NotifierResult;
use notifier_domain::{repositories::TriggerExecutionRepository, TriggerExecution};

pub struct SqliteTriggerExecutionRepository {
    pool: SqlitePool,
}

impl SqliteTriggerExecutionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_execution(row: &sqlx::sqlite::SqliteRow) -> NotifierResult<TriggerExecution> {
        Ok(TriggerExecution {
            id: row.try_get("id")?,
            trigger_id: row.try_get("trigger_id")?,
            executed_at: row.try_get("executed_at")?,
            success: row.try_get("success")?,
            sent_count: row.try_get("sent_count")?,
            failed_count: row.try_get("failed_count")?,
            error: row.try_get("error")?,
        })
    }
}

#[async_trait]
impl TriggerExecutionRepository for SqliteTriggerExecutionRepository {
    async fn append(&self, execution: &TriggerExecution) -> NotifierResult<TriggerExecution> {
        let row = sqlx::query(
            r#"
            INSERT INTO trigger_executions
                (trigger_id, executed_at, success, sent_count, failed_count, error)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, trigger_id, executed_at, success, sent_count, failed_count, error
            "#,
        )
        .bind(execution.trigger_id)
        .bind(execution.executed_at)
        .bind(execution.success)
        .bind(execution.sent_count)
        .bind(execution.failed_count)
        .bind(&execution.error)
        .fetch_one(&self.pool)
        .await?;

        let appended = Self::row_to_execution(&row)?;
        debug!(
            "台账追加: 触发器 {} 执行{} (发送 {}, 失败 {})",
            appended.trigger_id,
            if appended.success { "成功" } else { "失败" },
            appended.sent_count,
            appended.failed_count
        );
        Ok(appended)
    }

    async fn list_by_trigger(
        &self,
        trigger_id: i64,
        limit: i64,
        offset: i64,
    ) -> NotifierResult<Vec<TriggerExecution>> {
        let rows = sqlx::query(
            "SELECT id, trigger_id, executed_at, success, sent_count, failed_count, error \
             FROM trigger_executions WHERE trigger_id = $1 \
             ORDER BY executed_at DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(trigger_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_execution).collect()
    }
}
