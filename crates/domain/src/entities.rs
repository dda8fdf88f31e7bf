use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::values::{
    AudienceClass, DigestFrequency, NotificationCategory, NotificationPriority, TriggerKind,
};

/// 周期性通知触发器
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trigger {
    pub id: i64,
    pub name: String,
    pub kind: TriggerKind,
    /// 标准5段CRON表达式，kind为Scheduled时必填且在创建时校验
    pub schedule: Option<String>,
    pub template_id: String,
    pub audience: AudienceClass,
    pub enabled: bool,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trigger {
    pub fn is_evaluable(&self) -> bool {
        self.enabled && matches!(self.kind, TriggerKind::Scheduled) && self.schedule.is_some()
    }

    pub fn entity_description(&self) -> String {
        format!(
            "触发器 '{}' (ID: {}, 受众: {})",
            self.name, self.id, self.audience
        )
    }
}

/// 触发器创建参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTrigger {
    pub name: String,
    pub schedule: String,
    pub template_id: String,
    pub audience: AudienceClass,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl NewTrigger {
    pub fn into_trigger(self, next_run: Option<DateTime<Utc>>) -> Trigger {
        let now = Utc::now();
        Trigger {
            id: 0, // 将由数据库生成
            name: self.name,
            kind: TriggerKind::Scheduled,
            schedule: Some(self.schedule),
            template_id: self.template_id,
            audience: self.audience,
            enabled: self.enabled,
            last_run: None,
            next_run,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 一次性定时通知
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledNotification {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub category: NotificationCategory,
    pub priority: NotificationPriority,
    pub audience: AudienceClass,
    pub scheduled_for: DateTime<Utc>,
    pub sent: bool,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

impl ScheduledNotification {
    /// 到期判定：未发送且计划时间已过
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.sent && self.scheduled_for <= now
    }
}

/// 定时通知创建参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewScheduledNotification {
    pub title: String,
    pub body: String,
    pub category: NotificationCategory,
    pub priority: NotificationPriority,
    pub audience: AudienceClass,
    pub scheduled_for: DateTime<Utc>,
    pub created_by: i64,
}

impl NewScheduledNotification {
    pub fn into_notification(self) -> ScheduledNotification {
        ScheduledNotification {
            id: 0, // 将由数据库生成
            title: self.title,
            body: self.body,
            category: self.category,
            priority: self.priority,
            audience: self.audience,
            scheduled_for: self.scheduled_for,
            sent: false,
            sent_at: None,
            created_by: self.created_by,
            created_at: Utc::now(),
        }
    }
}

/// 触发器执行台账，只追加不修改
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerExecution {
    pub id: i64,
    pub trigger_id: i64,
    pub executed_at: DateTime<Utc>,
    pub success: bool,
    pub sent_count: i64,
    pub failed_count: i64,
    pub error: Option<String>,
}

impl TriggerExecution {
    pub fn succeeded(trigger_id: i64, sent_count: i64, failed_count: i64) -> Self {
        Self {
            id: 0,
            trigger_id,
            executed_at: Utc::now(),
            success: true,
            sent_count,
            failed_count,
            error: None,
        }
    }

    pub fn failed(trigger_id: i64, error: String) -> Self {
        Self {
            id: 0,
            trigger_id,
            executed_at: Utc::now(),
            success: false,
            sent_count: 0,
            failed_count: 0,
            error: Some(error),
        }
    }
}

/// 学生档案读模型（外部用户记录，只读）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub email_enabled: bool,
    pub digest: DigestFrequency,
}

impl StudentProfile {
    /// 只有开启邮件且偏好为即时的收件人才走邮件渠道
    pub fn wants_instant_email(&self) -> bool {
        self.email_enabled && matches!(self.digest, DigestFrequency::Instant)
    }
}

/// 学生的成就记录聚合读模型
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementStats {
    pub user_id: i64,
    /// 全部记录数（不区分状态）
    pub record_count: i64,
    /// 已批准记录数
    pub approved_count: i64,
    /// 已批准记录的积分总和
    pub approved_points: i64,
    /// 最近一次提交时间（不区分状态）
    pub last_submission: Option<DateTime<Utc>>,
}
