use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use notifier_core::NotifierResult;
use notifier_domain::{
    ports::{EmailMessage, EmailTransport, InboxSink},
    AudienceClass, NotificationCategory, NotificationPriority, StudentProfile,
};

use crate::audience::AudienceResolver;
use crate::renderer::RenderedMessage;

/// 一次派发的统计结果
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DeliveryReport {
    pub sent: i64,
    pub failed: i64,
    pub emails_sent: i64,
}

#[derive(Debug, Clone, Copy, Default)]
struct RecipientOutcome {
    delivered: bool,
    emailed: bool,
}

/// 投递派发器
///
/// 逐收件人独立投递：站内信写入成功计入 sent，失败计入 failed；
/// 邮件只在收件人偏好允许时追加尝试，失败只体现为 emails_sent
/// 不增加。单个收件人的失败绝不中断其余收件人的处理。
pub struct DeliveryDispatcher {
    resolver: AudienceResolver,
    inbox: Arc<dyn InboxSink>,
    email: Arc<dyn EmailTransport>,
    /// 并行投递的收件人上限，防止对存储和邮件通道的无界扇出
    max_concurrent: usize,
    /// 单个收件人的投递超时，超时计为失败
    per_recipient_timeout: Duration,
}

impl DeliveryDispatcher {
    pub fn new(
        resolver: AudienceResolver,
        inbox: Arc<dyn InboxSink>,
        email: Arc<dyn EmailTransport>,
        max_concurrent: usize,
        per_recipient_timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            inbox,
            email,
            max_concurrent: max_concurrent.max(1),
            per_recipient_timeout,
        }
    }

    /// 向一个受众派发渲染好的内容
    ///
    /// 只有受众解析失败会返回错误；收件人级别的失败全部折算进计数。
    pub async fn dispatch(
        &self,
        message: &RenderedMessage,
        category: NotificationCategory,
        priority: NotificationPriority,
        audience: AudienceClass,
        link: Option<&str>,
    ) -> NotifierResult<DeliveryReport> {
        let recipients = self.resolver.resolve_profiles(audience).await?;
        let total = recipients.len();

        let outcomes: Vec<RecipientOutcome> = stream::iter(
            recipients
                .into_iter()
                .map(|student| self.deliver_one(student, message, category, priority, link)),
        )
        .buffer_unordered(self.max_concurrent)
        .collect()
        .await;

        let mut report = DeliveryReport::default();
        for outcome in outcomes {
            if outcome.delivered {
                report.sent += 1;
            } else {
                report.failed += 1;
            }
            if outcome.emailed {
                report.emails_sent += 1;
            }
        }

        info!(
            "派发完成: 受众={} 收件人={} 成功={} 失败={} 邮件={}",
            audience.as_str(),
            total,
            report.sent,
            report.failed,
            report.emails_sent
        );
        Ok(report)
    }

    async fn deliver_one(
        &self,
        student: StudentProfile,
        message: &RenderedMessage,
        category: NotificationCategory,
        priority: NotificationPriority,
        link: Option<&str>,
    ) -> RecipientOutcome {
        let fut = self.deliver_channels(&student, message, category, priority, link);
        match tokio::time::timeout(self.per_recipient_timeout, fut).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!("收件人 {} 投递超时，计为失败", student.id);
                RecipientOutcome::default()
            }
        }
    }

    async fn deliver_channels(
        &self,
        student: &StudentProfile,
        message: &RenderedMessage,
        category: NotificationCategory,
        priority: NotificationPriority,
        link: Option<&str>,
    ) -> RecipientOutcome {
        let mut outcome = RecipientOutcome::default();

        match self
            .inbox
            .create_notification(student.id, &message.title, &message.body, category, link)
            .await
        {
            Ok(notification_id) => {
                debug!("收件人 {} 站内信已创建: {}", student.id, notification_id);
                outcome.delivered = true;
            }
            Err(e) => {
                warn!("收件人 {} 站内信写入失败: {}", student.id, e);
            }
        }

        // 邮件渠道独立判定，站内信失败不影响邮件资格评估
        if student.wants_instant_email() {
            let email = EmailMessage {
                to: student.email.clone(),
                subject: message.title.clone(),
                body: message.body.clone(),
                priority,
                action_url: link.map(str::to_string),
                action_text: link.map(|_| "查看详情".to_string()),
            };
            match self.email.send(&email).await {
                Ok(()) => outcome.emailed = true,
                Err(e) => {
                    warn!("收件人 {} 邮件发送失败: {}", student.id, e);
                }
            }
        }

        outcome
    }
}
