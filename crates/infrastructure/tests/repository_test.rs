#[cfg(test)]
mod repository_tests {
    use chrono::{Duration, Utc};
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    use notifier_core::NotifierError;
    use notifier_domain::{
        ports::InboxSink,
        repositories::{
            ScheduledNotificationRepository, StudentRepository, TriggerExecutionRepository,
            TriggerRepository,
        },
        AudienceClass, DigestFrequency, NewScheduledNotification, NewTrigger,
        NotificationCategory, NotificationPriority, TriggerExecution,
    };
    use notifier_infrastructure::{
        database::sqlite::run_migrations, SqliteInboxSink, SqliteNotificationRepository,
        SqliteStudentRepository, SqliteTriggerExecutionRepository, SqliteTriggerRepository,
    };

    // 内存库必须单连接，多个连接各自是独立的空库
    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    fn new_trigger(name: &str) -> notifier_domain::Trigger {
        NewTrigger {
            name: name.to_string(),
            schedule: "0 9 * * 1".to_string(),
            template_id: "weekly_digest".to_string(),
            audience: AudienceClass::All,
            enabled: true,
        }
        .into_trigger(Some(Utc::now() + Duration::days(1)))
    }

    async fn seed_student(pool: &SqlitePool, name: &str, digest: &str, enabled: bool) -> i64 {
        sqlx::query(
            "INSERT INTO users (name, email, role, email_enabled, digest_frequency) \
             VALUES ($1, $2, 'student', $3, $4) RETURNING id",
        )
        .bind(name)
        .bind(format!("{name}@example.com"))
        .bind(enabled)
        .bind(digest)
        .fetch_one(pool)
        .await
        .map(|row| sqlx::Row::try_get(&row, "id").unwrap())
        .unwrap()
    }

    async fn seed_record(pool: &SqlitePool, user_id: i64, points: i64, status: &str) {
        sqlx::query(
            "INSERT INTO achievement_records (user_id, points, status, submitted_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(user_id)
        .bind(points)
        .bind(status)
        .bind(Utc::now())
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_trigger_crud() {
        let pool = test_pool().await;
        let repo = SqliteTriggerRepository::new(pool);

        let created = repo.create(&new_trigger("weekly")).await.unwrap();
        assert!(created.id > 0);
        assert!(created.enabled);

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "weekly");
        assert_eq!(fetched.audience, AudienceClass::All);
        assert_eq!(fetched.schedule.as_deref(), Some("0 9 * * 1"));

        repo.set_enabled(created.id, false).await.unwrap();
        assert!(repo.list_evaluable().await.unwrap().is_empty());
        assert_eq!(repo.list().await.unwrap().len(), 1);

        repo.delete(created.id).await.unwrap();
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(created.id).await.unwrap_err(),
            NotifierError::TriggerNotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_trigger_claim_is_atomic_within_window() {
        let pool = test_pool().await;
        let repo = SqliteTriggerRepository::new(pool);
        let t = repo.create(&new_trigger("weekly")).await.unwrap();

        let now = Utc::now();
        let window_start = now - Duration::minutes(60);

        // 从未执行过的触发器第一次认领成功
        assert!(repo.claim_due(t.id, now, window_start).await.unwrap());
        // 窗口内第二次认领失败
        assert!(!repo.claim_due(t.id, now, window_start).await.unwrap());

        // 窗口过后重新到期
        let later = now + Duration::minutes(61);
        assert!(repo
            .claim_due(t.id, later, later - Duration::minutes(60))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_trigger_claim_respects_enabled() {
        let pool = test_pool().await;
        let repo = SqliteTriggerRepository::new(pool);
        let t = repo.create(&new_trigger("weekly")).await.unwrap();
        repo.set_enabled(t.id, false).await.unwrap();

        let now = Utc::now();
        assert!(!repo
            .claim_due(t.id, now, now - Duration::minutes(60))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_trigger_restore_last_run() {
        let pool = test_pool().await;
        let repo = SqliteTriggerRepository::new(pool);
        let t = repo.create(&new_trigger("weekly")).await.unwrap();

        let now = Utc::now();
        assert!(repo
            .claim_due(t.id, now, now - Duration::minutes(60))
            .await
            .unwrap());
        repo.restore_last_run(t.id, None).await.unwrap();

        // 回滚后立即重新到期
        assert!(repo
            .claim_due(t.id, now, now - Duration::minutes(60))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_notification_mark_sent_is_atomic() {
        let pool = test_pool().await;
        let repo = SqliteNotificationRepository::new(pool);

        let n = repo
            .create(
                &NewScheduledNotification {
                    title: "公告".to_string(),
                    body: "正文".to_string(),
                    category: NotificationCategory::Announcement,
                    priority: NotificationPriority::Normal,
                    audience: AudienceClass::All,
                    scheduled_for: Utc::now() - Duration::minutes(1),
                    created_by: 1,
                }
                .into_notification(),
            )
            .await
            .unwrap();

        assert_eq!(repo.list_due(Utc::now()).await.unwrap().len(), 1);

        assert!(repo.mark_sent(n.id, Utc::now()).await.unwrap());
        assert!(!repo.mark_sent(n.id, Utc::now()).await.unwrap());
        assert!(repo.list_due(Utc::now()).await.unwrap().is_empty());

        // 已发送的不能改期也不能删除
        assert!(!repo
            .reschedule(n.id, Utc::now() + Duration::hours(1))
            .await
            .unwrap());
        assert!(!repo.delete_unsent(n.id).await.unwrap());

        // 撤销后重新到期
        repo.revert_sent(n.id).await.unwrap();
        assert_eq!(repo.list_due(Utc::now()).await.unwrap().len(), 1);
        assert!(repo.delete_unsent(n.id).await.unwrap());
        assert!(matches!(
            repo.delete_unsent(n.id).await.unwrap_err(),
            NotifierError::NotificationNotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_execution_ledger_pagination() {
        let pool = test_pool().await;
        let triggers = SqliteTriggerRepository::new(pool.clone());
        let repo = SqliteTriggerExecutionRepository::new(pool);
        let t = triggers.create(&new_trigger("weekly")).await.unwrap();

        for i in 0..5 {
            let mut e = TriggerExecution::succeeded(t.id, i, 0);
            e.executed_at = Utc::now() - Duration::minutes(5 - i);
            repo.append(&e).await.unwrap();
        }

        // 倒序分页：最新的在前
        let page = repo.list_by_trigger(t.id, 2, 0).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].sent_count, 4);
        assert_eq!(page[1].sent_count, 3);

        let page = repo.list_by_trigger(t.id, 2, 4).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].sent_count, 0);
    }

    #[tokio::test]
    async fn test_student_queries() {
        let pool = test_pool().await;
        let repo = SqliteStudentRepository::new(pool.clone());

        let alice = seed_student(&pool, "alice", "INSTANT", true).await;
        let bob = seed_student(&pool, "bob", "DAILY", false).await;
        // 非学生角色不出现在受众里
        sqlx::query("INSERT INTO users (name, email, role) VALUES ('admin', 'admin@example.com', 'admin')")
            .execute(&pool)
            .await
            .unwrap();

        seed_record(&pool, alice, 10, "APPROVED").await;
        seed_record(&pool, alice, 20, "APPROVED").await;
        seed_record(&pool, alice, 99, "PENDING").await;
        seed_record(&pool, bob, 7, "REJECTED").await;

        let students = repo.list_students().await.unwrap();
        assert_eq!(students.len(), 2);
        assert_eq!(students[0].digest, DigestFrequency::Instant);
        assert!(!students[1].email_enabled);

        let stats = repo.achievement_stats().await.unwrap();
        let alice_stats = stats.iter().find(|s| s.user_id == alice).unwrap();
        assert_eq!(alice_stats.record_count, 3);
        assert_eq!(alice_stats.approved_count, 2);
        assert_eq!(alice_stats.approved_points, 30);
        assert!(alice_stats.last_submission.is_some());

        let bob_stats = stats.iter().find(|s| s.user_id == bob).unwrap();
        assert_eq!(bob_stats.approved_count, 0);
        assert_eq!(bob_stats.approved_points, 0);

        // 待审和驳回的积分不计入全站总分
        assert_eq!(repo.total_approved_points().await.unwrap(), 30);
    }

    #[tokio::test]
    async fn test_inbox_sink_writes_notification() {
        let pool = test_pool().await;
        let alice = seed_student(&pool, "alice", "INSTANT", true).await;
        let sink = SqliteInboxSink::new(pool.clone());

        let id = sink
            .create_notification(
                alice,
                "标题",
                "正文",
                NotificationCategory::Reminder,
                Some("/achievements"),
            )
            .await
            .unwrap();
        assert!(id > 0);

        let row = sqlx::query("SELECT user_id, category, link, read FROM notifications WHERE id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
        use sqlx::Row;
        assert_eq!(row.try_get::<i64, _>("user_id").unwrap(), alice);
        assert_eq!(row.try_get::<String, _>("category").unwrap(), "REMINDER");
        assert_eq!(
            row.try_get::<String, _>("link").unwrap(),
            "/achievements"
        );
        assert!(!row.try_get::<bool, _>("read").unwrap());
    }
}
