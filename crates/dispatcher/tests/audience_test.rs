mod common;

#[cfg(test)]
mod audience_tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use notifier_dispatcher::AudienceResolver;
    use notifier_domain::{AchievementStats, AudienceClass};

    use crate::common::{stats, stats_last_submitted, student, InMemoryStudentRepo};

    fn resolver(repo: InMemoryStudentRepo) -> AudienceResolver {
        AudienceResolver::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn test_all_includes_everyone() {
        let repo = InMemoryStudentRepo::new(
            vec![student(1, 100), student(2, 5), student(3, 400)],
            vec![],
        );
        let ids = resolver(repo).resolve(AudienceClass::All).await.unwrap();
        assert_eq!(ids, [1, 2, 3].into_iter().collect());
    }

    #[tokio::test]
    async fn test_empty_student_table_resolves_empty() {
        let ids = resolver(InMemoryStudentRepo::empty())
            .resolve(AudienceClass::All)
            .await
            .unwrap();
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_top_performers_ceiling() {
        // 7个学生，ceil(7 * 0.2) = 2
        let students = (1..=7).map(|i| student(i, 100)).collect();
        let stats = (1..=7).map(|i| stats(i, 1, i * 10)).collect();
        let repo = InMemoryStudentRepo::new(students, stats);

        let ids = resolver(repo)
            .resolve(AudienceClass::TopPerformers)
            .await
            .unwrap();
        assert_eq!(ids, [7, 6].into_iter().collect());
    }

    #[tokio::test]
    async fn test_top_performers_at_least_one() {
        // 单个学生也要选出1个
        let repo = InMemoryStudentRepo::new(vec![student(1, 100)], vec![stats(1, 1, 10)]);
        let ids = resolver(repo)
            .resolve(AudienceClass::TopPerformers)
            .await
            .unwrap();
        assert_eq!(ids, [1].into_iter().collect());
    }

    #[tokio::test]
    async fn test_top_performers_tie_breaks_by_id() {
        // 5个学生积分全部相同，ceil(5 * 0.2) = 1，并列取ID最小的
        let students = (1..=5).map(|i| student(i, 100)).collect();
        let stats = (1..=5).map(|i| stats(i, 1, 50)).collect();
        let repo = InMemoryStudentRepo::new(students, stats);

        let ids = resolver(repo)
            .resolve(AudienceClass::TopPerformers)
            .await
            .unwrap();
        assert_eq!(ids, [1].into_iter().collect());
    }

    #[tokio::test]
    async fn test_new_students_window() {
        let repo = InMemoryStudentRepo::new(
            vec![student(1, 10), student(2, 29), student(3, 31), student(4, 365)],
            vec![],
        );
        let ids = resolver(repo)
            .resolve(AudienceClass::NewStudents)
            .await
            .unwrap();
        assert_eq!(ids, [1, 2].into_iter().collect());
    }

    #[tokio::test]
    async fn test_inactive_includes_zero_record_students() {
        // 学生2没有任何成就记录，也算不活跃
        let repo = InMemoryStudentRepo::new(
            vec![student(1, 100), student(2, 100), student(3, 100)],
            vec![stats_last_submitted(1, 45), stats_last_submitted(3, 2)],
        );
        let ids = resolver(repo)
            .resolve(AudienceClass::Inactive)
            .await
            .unwrap();
        assert_eq!(ids, [1, 2].into_iter().collect());
    }

    #[tokio::test]
    async fn test_inactive_30_day_boundary() {
        // 29天前提交过的还算活跃，31天前的算不活跃
        let repo = InMemoryStudentRepo::new(
            vec![student(1, 100), student(2, 100)],
            vec![stats_last_submitted(1, 29), stats_last_submitted(2, 31)],
        );
        let ids = resolver(repo)
            .resolve(AudienceClass::Inactive)
            .await
            .unwrap();
        assert_eq!(ids, [2].into_iter().collect());
    }

    #[tokio::test]
    async fn test_inactive_with_records_but_no_submission_time() {
        let repo = InMemoryStudentRepo::new(
            vec![student(1, 100)],
            vec![AchievementStats {
                user_id: 1,
                record_count: 0,
                approved_count: 0,
                approved_points: 0,
                last_submission: None,
            }],
        );
        let ids = resolver(repo)
            .resolve(AudienceClass::Inactive)
            .await
            .unwrap();
        assert_eq!(ids, [1].into_iter().collect());
    }

    #[tokio::test]
    async fn test_high_achievers_threshold() {
        // 门槛是已批准记录数 >= 5，和积分无关
        let repo = InMemoryStudentRepo::new(
            vec![student(1, 100), student(2, 100), student(3, 100)],
            vec![stats(1, 5, 0), stats(2, 4, 9999), stats(3, 12, 30)],
        );
        let ids = resolver(repo)
            .resolve(AudienceClass::HighAchievers)
            .await
            .unwrap();
        assert_eq!(ids, [1, 3].into_iter().collect());
    }

    #[tokio::test]
    async fn test_membership_reflects_current_state() {
        // 无缓存：同一个解析器两次解析之间状态变化要体现出来
        let fresh = student(1, 1);
        let mut old = student(1, 1);
        old.created_at = Utc::now() - Duration::days(60);

        let r1 = resolver(InMemoryStudentRepo::new(vec![fresh], vec![]));
        assert_eq!(
            r1.resolve(AudienceClass::NewStudents).await.unwrap().len(),
            1
        );

        let r2 = resolver(InMemoryStudentRepo::new(vec![old], vec![]));
        assert!(r2.resolve(AudienceClass::NewStudents).await.unwrap().is_empty());
    }
}
