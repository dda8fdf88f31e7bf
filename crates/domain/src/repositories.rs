//! 领域仓储抽象
//!
//! 定义数据访问的抽象接口，遵循依赖倒置原则。
//! 触发器的去重判定和定时通知的发送标记都必须是
//! 条件更新（compare-and-set），避免两次评估重叠时重复发送。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use notifier_core::NotifierResult;

use crate::entities::{
    AchievementStats, ScheduledNotification, StudentProfile, Trigger, TriggerExecution,
};

/// 触发器仓储抽象
#[async_trait]
pub trait TriggerRepository: Send + Sync {
    async fn create(&self, trigger: &Trigger) -> NotifierResult<Trigger>;
    async fn get_by_id(&self, id: i64) -> NotifierResult<Option<Trigger>>;
    async fn list(&self) -> NotifierResult<Vec<Trigger>>;
    /// 所有 enabled 且 kind = SCHEDULED 的触发器，调度器每轮扫描的输入
    async fn list_evaluable(&self) -> NotifierResult<Vec<Trigger>>;
    async fn set_enabled(&self, id: i64, enabled: bool) -> NotifierResult<()>;
    async fn delete(&self, id: i64) -> NotifierResult<()>;

    /// 原子认领：仅当触发器仍然启用且 last_run 为空或早于窗口起点时，
    /// 把 last_run 置为 now。返回 false 表示已被并发的另一轮认领。
    async fn claim_due(
        &self,
        id: i64,
        now: DateTime<Utc>,
        window_start: DateTime<Utc>,
    ) -> NotifierResult<bool>;

    /// 执行失败后回滚 last_run，让触发器在下一轮重新到期
    async fn restore_last_run(
        &self,
        id: i64,
        previous: Option<DateTime<Utc>>,
    ) -> NotifierResult<()>;

    /// 无条件记录一次执行的时间簿记（手动执行路径）
    async fn record_run(
        &self,
        id: i64,
        last_run: DateTime<Utc>,
        next_run: Option<DateTime<Utc>>,
    ) -> NotifierResult<()>;

    /// 更新下次理论触发时间（成功执行后的簿记）
    async fn update_next_run(
        &self,
        id: i64,
        next_run: Option<DateTime<Utc>>,
    ) -> NotifierResult<()>;
}

/// 定时通知仓储抽象
#[async_trait]
pub trait ScheduledNotificationRepository: Send + Sync {
    async fn create(&self, notification: &ScheduledNotification)
        -> NotifierResult<ScheduledNotification>;
    async fn get_by_id(&self, id: i64) -> NotifierResult<Option<ScheduledNotification>>;
    async fn list(&self) -> NotifierResult<Vec<ScheduledNotification>>;
    /// sent = false 且 scheduled_for <= now 的通知
    async fn list_due(&self, now: DateTime<Utc>) -> NotifierResult<Vec<ScheduledNotification>>;

    /// 原子标记发送：仅当 sent = false 时置为已发送。
    /// 返回 false 表示已被并发的另一轮标记。
    async fn mark_sent(&self, id: i64, sent_at: DateTime<Utc>) -> NotifierResult<bool>;

    /// 派发失败后撤销发送标记，让通知在下一轮重试
    async fn revert_sent(&self, id: i64) -> NotifierResult<()>;

    /// 改期，仅未发送时允许。返回 false 表示通知已发送。
    async fn reschedule(&self, id: i64, scheduled_for: DateTime<Utc>) -> NotifierResult<bool>;

    /// 取消（删除），仅未发送时允许。返回 false 表示通知已发送。
    async fn delete_unsent(&self, id: i64) -> NotifierResult<bool>;
}

/// 执行台账仓储抽象，只追加
#[async_trait]
pub trait TriggerExecutionRepository: Send + Sync {
    async fn append(&self, execution: &TriggerExecution) -> NotifierResult<TriggerExecution>;
    /// 按执行时间倒序分页
    async fn list_by_trigger(
        &self,
        trigger_id: i64,
        limit: i64,
        offset: i64,
    ) -> NotifierResult<Vec<TriggerExecution>>;
}

/// 学生记录读模型抽象（用户与成就记录归门户所有，这里只读）
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// 所有 student 角色的档案
    async fn list_students(&self) -> NotifierResult<Vec<StudentProfile>>;
    /// 每个学生的成就记录聚合
    async fn achievement_stats(&self) -> NotifierResult<Vec<AchievementStats>>;
    /// 全站已批准记录的积分总和（模板变量）
    async fn total_approved_points(&self) -> NotifierResult<i64>;
}
