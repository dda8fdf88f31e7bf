use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

use notifier_core::{NotifierError, NotifierResult};
use notifier_domain::{repositories::TriggerRepository, Trigger};

const TRIGGER_COLUMNS: &str = "id, name, kind, schedule, template_id, audience, enabled, \
                               last_run, next_run, created_at, updated_at";

pub struct SqliteTriggerRepository {
    pool: SqlitePool,
}

impl SqliteTriggerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_trigger(row: &sqlx::sqlite::SqliteRow) -> NotifierResult<Trigger> {
        Ok(Trigger {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            kind: row.try_get("kind")?,
            schedule: row.try_get("schedule")?,
            template_id: row.try_get("template_id")?,
            audience: row.try_get("audience")?,
            enabled: row.try_get("enabled")?,
            last_run: row.try_get("last_run")?,
            next_run: row.try_get("next_run")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl TriggerRepository for SqliteTriggerRepository {
    #[instrument(skip(self, trigger), fields(trigger_name = %trigger.name))]
    async fn create(&self, trigger: &Trigger) -> NotifierResult<Trigger> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO triggers (name, kind, schedule, template_id, audience, enabled, next_run)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TRIGGER_COLUMNS}
            "#,
        ))
        .bind(&trigger.name)
        .bind(trigger.kind)
        .bind(&trigger.schedule)
        .bind(&trigger.template_id)
        .bind(trigger.audience)
        .bind(trigger.enabled)
        .bind(trigger.next_run)
        .fetch_one(&self.pool)
        .await?;

        let created = Self::row_to_trigger(&row)?;
        debug!("创建触发器成功: {}", created.entity_description());
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: i64) -> NotifierResult<Option<Trigger>> {
        let row = sqlx::query(&format!(
            "SELECT {TRIGGER_COLUMNS} FROM triggers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_trigger).transpose()
    }

    async fn list(&self) -> NotifierResult<Vec<Trigger>> {
        let rows = sqlx::query(&format!(
            "SELECT {TRIGGER_COLUMNS} FROM triggers ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_trigger).collect()
    }

    async fn list_evaluable(&self) -> NotifierResult<Vec<Trigger>> {
        let rows = sqlx::query(&format!(
            "SELECT {TRIGGER_COLUMNS} FROM triggers \
             WHERE enabled = 1 AND kind = 'SCHEDULED' AND schedule IS NOT NULL \
             ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_trigger).collect()
    }

    #[instrument(skip(self))]
    async fn set_enabled(&self, id: i64, enabled: bool) -> NotifierResult<()> {
        let result = sqlx::query(
            "UPDATE triggers SET enabled = $2, updated_at = datetime('now') WHERE id = $1",
        )
        .bind(id)
        .bind(enabled)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(NotifierError::TriggerNotFound { id });
        }
        debug!("触发器 {} enabled 置为 {}", id, enabled);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> NotifierResult<()> {
        let result = sqlx::query("DELETE FROM triggers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(NotifierError::TriggerNotFound { id });
        }
        debug!("触发器 {} 已删除", id);
        Ok(())
    }

    async fn claim_due(
        &self,
        id: i64,
        now: DateTime<Utc>,
        window_start: DateTime<Utc>,
    ) -> NotifierResult<bool> {
        // 条件更新即原子认领：同一窗口内第二个到达的评估轮
        // rows_affected 为0
        let result = sqlx::query(
            r#"
            UPDATE triggers
            SET last_run = $2, updated_at = $2
            WHERE id = $1 AND enabled = 1
              AND (last_run IS NULL OR last_run <= $3)
            "#,
        )
        .bind(id)
        .bind(now)
        .bind(window_start)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn restore_last_run(
        &self,
        id: i64,
        previous: Option<DateTime<Utc>>,
    ) -> NotifierResult<()> {
        sqlx::query("UPDATE triggers SET last_run = $2 WHERE id = $1")
            .bind(id)
            .bind(previous)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn record_run(
        &self,
        id: i64,
        last_run: DateTime<Utc>,
        next_run: Option<DateTime<Utc>>,
    ) -> NotifierResult<()> {
        let result = sqlx::query(
            "UPDATE triggers SET last_run = $2, next_run = $3, updated_at = datetime('now') \
             WHERE id = $1",
        )
        .bind(id)
        .bind(last_run)
        .bind(next_run)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(NotifierError::TriggerNotFound { id });
        }
        Ok(())
    }

    async fn update_next_run(
        &self,
        id: i64,
        next_run: Option<DateTime<Utc>>,
    ) -> NotifierResult<()> {
        sqlx::query("UPDATE triggers SET next_run = $2 WHERE id = $1")
            .bind(id)
            .bind(next_run)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
