use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use notifier_core::NotifierResult;
use notifier_domain::{repositories::StudentRepository, AchievementStats, StudentProfile};

/// 门户用户和成就记录的只读视图
pub struct SqliteStudentRepository {
    pool: SqlitePool,
}

impl SqliteStudentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentRepository for SqliteStudentRepository {
    async fn list_students(&self) -> NotifierResult<Vec<StudentProfile>> {
        let rows = sqlx::query(
            "SELECT id, name, email, created_at, email_enabled, digest_frequency \
             FROM users WHERE role = 'student' ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let students = rows
            .iter()
            .map(|row| {
                Ok(StudentProfile {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    email: row.try_get("email")?,
                    created_at: row.try_get("created_at")?,
                    email_enabled: row.try_get("email_enabled")?,
                    digest: row.try_get("digest_frequency")?,
                })
            })
            .collect::<NotifierResult<Vec<_>>>()?;

        debug!("查询到 {} 个学生档案", students.len());
        Ok(students)
    }

    async fn achievement_stats(&self) -> NotifierResult<Vec<AchievementStats>> {
        let rows = sqlx::query(
            r#"
            SELECT user_id,
                   COUNT(*) AS record_count,
                   COALESCE(SUM(CASE WHEN status = 'APPROVED' THEN 1 ELSE 0 END), 0)
                       AS approved_count,
                   COALESCE(SUM(CASE WHEN status = 'APPROVED' THEN points ELSE 0 END), 0)
                       AS approved_points,
                   MAX(submitted_at) AS last_submission
            FROM achievement_records
            GROUP BY user_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(AchievementStats {
                    user_id: row.try_get("user_id")?,
                    record_count: row.try_get("record_count")?,
                    approved_count: row.try_get("approved_count")?,
                    approved_points: row.try_get("approved_points")?,
                    last_submission: row.try_get("last_submission")?,
                })
            })
            .collect()
    }

    async fn total_approved_points(&self) -> NotifierResult<i64> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(points), 0) AS total \
             FROM achievement_records WHERE status = 'APPROVED'",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("total")?)
    }
}
