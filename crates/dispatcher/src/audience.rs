use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use notifier_core::NotifierResult;
use notifier_domain::{
    repositories::StudentRepository, AchievementStats, AudienceClass, StudentProfile,
};

/// 新注册/不活跃判定的时间窗口（天）
const ACTIVITY_WINDOW_DAYS: i64 = 30;
/// 积分榜头部比例
const TOP_PERFORMER_RATIO: f64 = 0.2;
/// 高成就学生的已批准记录门槛
const HIGH_ACHIEVER_MIN_APPROVED: i64 = 5;

/// 受众解析器
///
/// 纯读操作：每次解析都重新计算，受众成员资格始终反映
/// 记录存储的当前状态，不做任何缓存。存储错误原样向上传播。
pub struct AudienceResolver {
    students: Arc<dyn StudentRepository>,
}

impl AudienceResolver {
    pub fn new(students: Arc<dyn StudentRepository>) -> Self {
        Self { students }
    }

    /// 解析受众类别为收件人ID集合
    pub async fn resolve(&self, class: AudienceClass) -> NotifierResult<HashSet<i64>> {
        let profiles = self.resolve_profiles(class).await?;
        Ok(profiles.into_iter().map(|p| p.id).collect())
    }

    /// 解析受众类别为收件人档案（派发器需要邮件偏好）
    pub async fn resolve_profiles(
        &self,
        class: AudienceClass,
    ) -> NotifierResult<Vec<StudentProfile>> {
        let students = self.students.list_students().await?;
        let now = Utc::now();

        let selected = match class {
            AudienceClass::All => students,
            AudienceClass::TopPerformers => {
                let stats = self.stats_by_user().await?;
                select_top_performers(students, &stats)
            }
            AudienceClass::NewStudents => {
                let cutoff = now - Duration::days(ACTIVITY_WINDOW_DAYS);
                students
                    .into_iter()
                    .filter(|s| s.created_at >= cutoff)
                    .collect()
            }
            AudienceClass::Inactive => {
                let stats = self.stats_by_user().await?;
                let cutoff = now - Duration::days(ACTIVITY_WINDOW_DAYS);
                students
                    .into_iter()
                    .filter(|s| is_inactive(stats.get(&s.id), cutoff))
                    .collect()
            }
            AudienceClass::HighAchievers => {
                let stats = self.stats_by_user().await?;
                students
                    .into_iter()
                    .filter(|s| {
                        stats
                            .get(&s.id)
                            .map(|st| st.approved_count >= HIGH_ACHIEVER_MIN_APPROVED)
                            .unwrap_or(false)
                    })
                    .collect()
            }
        };

        debug!(
            "受众 {} 解析出 {} 个收件人",
            class.as_str(),
            selected.len()
        );
        Ok(selected)
    }

    async fn stats_by_user(&self) -> NotifierResult<HashMap<i64, AchievementStats>> {
        let stats = self.students.achievement_stats().await?;
        Ok(stats.into_iter().map(|s| (s.user_id, s)).collect())
    }
}

/// 按已批准积分降序取前 ceil(20%)
///
/// 并列积分按用户ID升序稳定排序：原始查询的附带顺序依赖存储引擎，
/// 这里固定一个确定性的次级排序键。
fn select_top_performers(
    mut students: Vec<StudentProfile>,
    stats: &HashMap<i64, AchievementStats>,
) -> Vec<StudentProfile> {
    if students.is_empty() {
        return students;
    }

    let points_of = |id: i64| stats.get(&id).map(|s| s.approved_points).unwrap_or(0);
    students.sort_by(|a, b| {
        points_of(b.id)
            .cmp(&points_of(a.id))
            .then_with(|| a.id.cmp(&b.id))
    });

    let take = ((students.len() as f64) * TOP_PERFORMER_RATIO).ceil() as usize;
    students.truncate(take.max(1));
    students
}

/// 不活跃：没有任何记录，或最近一次提交早于窗口起点
fn is_inactive(stats: Option<&AchievementStats>, cutoff: DateTime<Utc>) -> bool {
    match stats {
        None => true,
        Some(st) => {
            if st.record_count == 0 {
                return true;
            }
            match st.last_submission {
                None => true,
                Some(last) => last < cutoff,
            }
        }
    }
}
