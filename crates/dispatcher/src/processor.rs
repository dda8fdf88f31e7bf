use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};

use notifier_core::{NotifierError, NotifierResult};
use notifier_domain::{
    repositories::{ScheduledNotificationRepository, StudentRepository},
    NewScheduledNotification, ScheduledNotification,
};

use crate::delivery::DeliveryDispatcher;
use crate::renderer::{render, ContentSource, RenderVars};

/// 一轮定时通知处理的汇总
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ProcessReport {
    pub processed: i64,
    pub sent: i64,
    pub failed: i64,
}

/// 定时通知处理器
///
/// 操作员创建的一次性通知在到期后由外部调用方驱动的处理轮次
/// 派发。每条通知至多成功发送一次：发送标记是条件更新，派发
/// 失败则撤销标记，留给下一轮重试。
pub struct ScheduledProcessor {
    notifications: Arc<dyn ScheduledNotificationRepository>,
    students: Arc<dyn StudentRepository>,
    dispatcher: Arc<DeliveryDispatcher>,
}

impl ScheduledProcessor {
    pub fn new(
        notifications: Arc<dyn ScheduledNotificationRepository>,
        students: Arc<dyn StudentRepository>,
        dispatcher: Arc<DeliveryDispatcher>,
    ) -> Self {
        Self {
            notifications,
            students,
            dispatcher,
        }
    }

    /// 创建定时通知，计划时间必须在未来
    pub async fn create(
        &self,
        new: NewScheduledNotification,
    ) -> NotifierResult<ScheduledNotification> {
        if new.scheduled_for <= Utc::now() {
            return Err(NotifierError::ScheduleInPast);
        }
        let notification = self.notifications.create(&new.into_notification()).await?;
        info!(
            "定时通知 {} 已创建，计划于 {} 发送",
            notification.id, notification.scheduled_for
        );
        Ok(notification)
    }

    /// 处理所有到期未发送的通知
    ///
    /// 单条通知的失败折算进汇总计数，绝不中断本轮其余通知。
    pub async fn process_due(&self) -> NotifierResult<ProcessReport> {
        let now = Utc::now();
        let due = self.notifications.list_due(now).await?;
        let mut report = ProcessReport::default();

        for notification in due {
            report.processed += 1;
            match self.process_one(&notification).await {
                Ok(true) => report.sent += 1,
                Ok(false) => {}
                Err(e) => {
                    error!("定时通知 {} 派发失败: {}", notification.id, e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "本轮处理完成: 到期={} 发送={} 失败={}",
            report.processed, report.sent, report.failed
        );
        Ok(report)
    }

    /// 处理单条通知，返回是否发送
    async fn process_one(&self, notification: &ScheduledNotification) -> NotifierResult<bool> {
        // 变量在认领之前取：读取失败时通知保持未发送，下一轮重试
        let total_points = self.students.total_approved_points().await?;

        // 先认领再派发：并发轮次重叠时只有一个赢家
        if !self
            .notifications
            .mark_sent(notification.id, Utc::now())
            .await?
        {
            return Ok(false);
        }

        let message = render(
            ContentSource::Custom {
                title: &notification.title,
                body: &notification.body,
            },
            &RenderVars { total_points },
        );

        match self
            .dispatcher
            .dispatch(
                &message,
                notification.category,
                notification.priority,
                notification.audience,
                None,
            )
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                // 撤销发送标记让通知重新到期；撤销本身失败只能记日志
                if let Err(revert_err) = self.notifications.revert_sent(notification.id).await {
                    warn!(
                        "定时通知 {} 撤销发送标记失败: {}",
                        notification.id, revert_err
                    );
                }
                Err(e)
            }
        }
    }

    /// 取消未发送的通知
    pub async fn cancel(&self, id: i64) -> NotifierResult<()> {
        self.ensure_exists(id).await?;
        if !self.notifications.delete_unsent(id).await? {
            return Err(NotifierError::AlreadySent { id });
        }
        info!("定时通知 {} 已取消", id);
        Ok(())
    }

    /// 未发送的通知改期到新的未来时间
    pub async fn reschedule(
        &self,
        id: i64,
        scheduled_for: chrono::DateTime<Utc>,
    ) -> NotifierResult<ScheduledNotification> {
        if scheduled_for <= Utc::now() {
            return Err(NotifierError::ScheduleInPast);
        }
        self.ensure_exists(id).await?;
        if !self.notifications.reschedule(id, scheduled_for).await? {
            return Err(NotifierError::AlreadySent { id });
        }
        self.notifications
            .get_by_id(id)
            .await?
            .ok_or(NotifierError::NotificationNotFound { id })
    }

    async fn ensure_exists(&self, id: i64) -> NotifierResult<()> {
        self.notifications
            .get_by_id(id)
            .await?
            .map(|_| ())
            .ok_or(NotifierError::NotificationNotFound { id })
    }
}
